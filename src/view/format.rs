//! Date formatting for comment headers

use chrono::{DateTime, Datelike, TimeZone, Timelike, Utc};

use crate::config::Locale;

/// Long date with hours and minutes, e.g. `12 mars 2024 à 14:05`
pub fn format_date_in<Tz: TimeZone>(date: &DateTime<Tz>, locale: Locale) -> String {
    let month = locale.month_name(date.month());
    match locale {
        Locale::Fr => format!(
            "{} {} {} à {:02}:{:02}",
            date.day(),
            month,
            date.year(),
            date.hour(),
            date.minute()
        ),
        Locale::En => format!(
            "{} {}, {} at {:02}:{:02}",
            month,
            date.day(),
            date.year(),
            date.hour(),
            date.minute()
        ),
    }
}

/// Format in the viewer's local time zone (browser time zone on web)
#[cfg(target_arch = "wasm32")]
pub fn format_date(date: &DateTime<Utc>, locale: Locale) -> String {
    format_date_in(&date.with_timezone(&chrono::Local), locale)
}

/// Native: UTC, so output is stable across machines
#[cfg(not(target_arch = "wasm32"))]
pub fn format_date(date: &DateTime<Utc>, locale: Locale) -> String {
    format_date_in(date, locale)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    #[test]
    fn test_format_french() {
        let date = Utc.with_ymd_and_hms(2024, 3, 12, 14, 5, 0).unwrap();
        assert_eq!(format_date(&date, Locale::Fr), "12 mars 2024 à 14:05");
    }

    #[test]
    fn test_format_english() {
        let date = Utc.with_ymd_and_hms(2023, 12, 1, 9, 7, 30).unwrap();
        assert_eq!(format_date(&date, Locale::En), "December 1, 2023 at 09:07");
    }

    #[test]
    fn test_format_uses_given_offset() {
        let utc = Utc.with_ymd_and_hms(2024, 8, 31, 23, 30, 0).unwrap();
        let paris = utc.with_timezone(&FixedOffset::east_opt(2 * 3600).unwrap());
        assert_eq!(format_date_in(&paris, Locale::Fr), "1 septembre 2024 à 01:30");
    }
}
