//! Timestamps stamped into state after a successful apply

use chrono::{DateTime, Utc};

/// RFC 850 layout, e.g. `Monday, 02-Jan-06 15:04:05 UTC`
pub const RFC850: &str = "%A, %d-%b-%y %H:%M:%S UTC";

/// Format a timestamp the way `last_updated` is stored
pub fn format_rfc850(at: DateTime<Utc>) -> String {
    at.format(RFC850).to_string()
}

/// Current time formatted for `last_updated`
pub fn last_updated_now() -> String {
    format_rfc850(Utc::now())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_rfc850_layout() {
        let at = Utc.with_ymd_and_hms(2006, 1, 2, 15, 4, 5).unwrap();
        assert_eq!(format_rfc850(at), "Monday, 02-Jan-06 15:04:05 UTC");
    }
}
