//! Date helpers shared by the statement parsers and the re-import normalizer.

use chrono::NaiveDate;

/// Map a two-digit statement year onto the 2000s ("25" -> 2025).
pub fn expand_two_digit_year(yy: i32) -> i32 {
    if yy < 100 { 2000 + yy } else { yy }
}

/// Build a date from loosely-typed day/month/year strings as they come out of
/// regex captures. Two-digit years are expanded; anything that is not a real
/// calendar day yields `None`.
pub fn date_from_parts(day: &str, month: &str, year: &str) -> Option<NaiveDate> {
    let d: u32 = day.trim().parse().ok()?;
    let m: u32 = month.trim().parse().ok()?;
    let y_raw = year.trim();
    let y: i32 = y_raw.parse().ok()?;
    let y = if y_raw.len() <= 2 { expand_two_digit_year(y) } else { y };
    NaiveDate::from_ymd_opt(y, m, d)
}

/// Month number for an English month name or abbreviation ("Sep", "sept", "September").
pub fn month_from_name(name: &str) -> Option<u32> {
    let lower = name.trim().to_ascii_lowercase();
    let prefix = lower.get(..3)?;
    let month = match prefix {
        "jan" => 1,
        "feb" => 2,
        "mar" => 3,
        "apr" => 4,
        "may" => 5,
        "jun" => 6,
        "jul" => 7,
        "aug" => 8,
        "sep" => 9,
        "oct" => 10,
        "nov" => 11,
        "dec" => 12,
        _ => return None,
    };
    Some(month)
}

/// Statement-style "DD.MM.YY" (dots may be padded with spaces) to a date.
pub fn parse_dotted_date(s: &str) -> Option<NaiveDate> {
    let parts: Vec<&str> = s.split('.').map(str::trim).collect();
    if parts.len() != 3 {
        return None;
    }
    date_from_parts(parts[0], parts[1], parts[2])
}

/// Accept any of the date shapes seen in statements and exported records:
/// `YYYY-MM-DD`, `DD/MM/YYYY`, `DD-MM-YYYY`, `DD.MM.YY`, `DD/MM/YY`, `DD MMM YYYY`.
pub fn parse_flexible_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    // ISO, optionally with a time suffix ("2025-08-29T00:00:00Z")
    if let Some(head) = s.get(..10) {
        if let Ok(d) = NaiveDate::parse_from_str(head, "%Y-%m-%d") {
            return Some(d);
        }
    }

    if s.contains('.') {
        return parse_dotted_date(s);
    }

    for sep in ['/', '-'] {
        let parts: Vec<&str> = s.split(sep).collect();
        if parts.len() == 3 {
            return date_from_parts(parts[0], parts[1], parts[2]);
        }
    }

    let words: Vec<&str> = s.split_whitespace().collect();
    if words.len() == 3 {
        let month = month_from_name(words[1])?;
        return date_from_parts(words[0], &month.to_string(), words[2]);
    }

    None
}

/// `YYYY-MM-DD`
pub fn to_iso(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dotted_date_maps_to_2000s() {
        let d = parse_dotted_date("29.08.25").unwrap();
        assert_eq!(to_iso(d), "2025-08-29");

        // PDF extraction often pads the dots
        let d = parse_dotted_date("03 . 09 . 25").unwrap();
        assert_eq!(to_iso(d), "2025-09-03");
    }

    #[test]
    fn test_invalid_calendar_day_rejected() {
        assert!(parse_dotted_date("31.02.25").is_none());
        assert!(parse_flexible_date("2025-13-01").is_none());
        assert!(parse_flexible_date("").is_none());
    }

    #[test]
    fn test_flexible_formats() {
        let want = NaiveDate::from_ymd_opt(2025, 9, 3).unwrap();
        assert_eq!(parse_flexible_date("2025-09-03"), Some(want));
        assert_eq!(parse_flexible_date("2025-09-03T10:00:00Z"), Some(want));
        assert_eq!(parse_flexible_date("03/09/2025"), Some(want));
        assert_eq!(parse_flexible_date("03-09-2025"), Some(want));
        assert_eq!(parse_flexible_date("03/09/25"), Some(want));
        assert_eq!(parse_flexible_date("03.09.25"), Some(want));
        assert_eq!(parse_flexible_date("3 Sep 2025"), Some(want));
        assert_eq!(parse_flexible_date("03 September 2025"), Some(want));
    }

    #[test]
    fn test_month_names() {
        assert_eq!(month_from_name("Jan"), Some(1));
        assert_eq!(month_from_name("sept"), Some(9));
        assert_eq!(month_from_name("DECEMBER"), Some(12));
        assert_eq!(month_from_name("xx"), None);
    }
}
