use chrono::{DateTime, FixedOffset, NaiveDate, Utc};

/// Decides which calendar day a moment belongs to.
///
/// All day-scoped queue rules (numbering, queue length, reset) go through one
/// calendar so they agree on where midnight falls.
#[derive(Debug, Clone, Copy)]
pub struct ServiceCalendar {
    offset: FixedOffset,
}

impl ServiceCalendar {
    pub fn new(offset: FixedOffset) -> Self {
        Self { offset }
    }

    pub fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    pub fn today(&self) -> NaiveDate {
        self.date_of(self.now())
    }

    /// Calendar day of `at` in the service offset
    pub fn date_of(&self, at: DateTime<Utc>) -> NaiveDate {
        at.with_timezone(&self.offset).date_naive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn manila() -> ServiceCalendar {
        ServiceCalendar::new(FixedOffset::east_opt(8 * 3600).unwrap())
    }

    #[test]
    fn test_date_of_crosses_midnight_in_offset() {
        let calendar = manila();

        // 15:59 UTC is 23:59 in +08:00, 16:00 UTC is already the next day
        let before = Utc.with_ymd_and_hms(2025, 7, 6, 15, 59, 0).unwrap();
        let after = Utc.with_ymd_and_hms(2025, 7, 6, 16, 0, 0).unwrap();

        assert_eq!(calendar.date_of(before), NaiveDate::from_ymd_opt(2025, 7, 6).unwrap());
        assert_eq!(calendar.date_of(after), NaiveDate::from_ymd_opt(2025, 7, 7).unwrap());
    }
}
