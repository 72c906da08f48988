/// Number of leading characters of a department name used in display codes
pub const DISPLAY_PREFIX_LEN: usize = 3;

/// Minimum digit width of the sequence part of a display code (`TRE#007`)
pub const DISPLAY_SEQUENCE_WIDTH: usize = 3;

// =============================================================================
// CACHE KEYS
// =============================================================================

/// Key prefix of the "currently serving" signal per department
pub const CURRENTLY_SERVING_KEY_PREFIX: &str = "currently_serving";

/// Key prefix of the "latest ticket issued" signal per department
pub const LATEST_ISSUED_KEY_PREFIX: &str = "queue_update";
