//! Ephemeral per-department display signals.
//!
//! Two signals live in a short-TTL cache and are polled by display boards:
//! the ticket currently being served, and the latest ticket issued. A missing
//! signal means nothing is on display.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | POST | `/queue/currently-serving` | Set the ticket being served |
//! | GET | `/queue/currently-serving[?department_id]` | Read serving signal(s) |
//! | GET | `/queue/latest-updates` | Latest issued ticket per department |
//! | GET | `/queue/latest-update/{department_id}` | Latest issued ticket of one department |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use services::NowServingPublisher;
