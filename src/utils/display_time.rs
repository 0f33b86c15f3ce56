use chrono::{DateTime, FixedOffset, Offset, Utc};

/// Timezone used only when rendering timestamps. Storage stays in UTC.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayZone {
    offset: FixedOffset,
    name: String,
}

const DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

impl DisplayZone {
    pub fn new(offset: FixedOffset, name: impl Into<String>) -> Self {
        Self {
            offset,
            name: name.into(),
        }
    }

    /// Asia/Kolkata. India has no daylight saving, so a fixed offset is exact.
    pub fn kolkata() -> Self {
        let offset = FixedOffset::east_opt(5 * 3600 + 30 * 60).unwrap_or_else(|| Utc.fix());
        Self::new(offset, "IST")
    }

    pub fn utc() -> Self {
        Self::new(Utc.fix(), "UTC")
    }

    /// Parse an offset written as `+HH:MM`, `-HH:MM`, `+HHMM` or `Z`.
    pub fn parse(offset: &str, name: &str) -> Option<Self> {
        let offset = offset.trim();
        if offset.eq_ignore_ascii_case("z") || offset.eq_ignore_ascii_case("utc") {
            return Some(Self::new(Utc.fix(), name));
        }

        let (sign, rest) = match offset.split_at_checked(1)? {
            ("+", rest) => (1, rest),
            ("-", rest) => (-1, rest),
            _ => return None,
        };

        let digits: String = rest.chars().filter(|c| *c != ':').collect();
        if digits.len() != 4 || !digits.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }

        let hours: i32 = digits[..2].parse().ok()?;
        let minutes: i32 = digits[2..].parse().ok()?;
        if minutes >= 60 {
            return None;
        }

        let fixed = FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))?;
        Some(Self::new(fixed, name))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// `YYYY-MM-DD HH:MM:SS ZONE`
    pub fn format(&self, time: &DateTime<Utc>) -> String {
        format!(
            "{} {}",
            time.with_timezone(&self.offset).format(DISPLAY_FORMAT),
            self.name
        )
    }
}

impl Default for DisplayZone {
    fn default() -> Self {
        Self::kolkata()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn formats_in_kolkata_time() {
        let t = Utc.with_ymd_and_hms(2025, 3, 1, 20, 15, 7).unwrap();
        assert_eq!(DisplayZone::kolkata().format(&t), "2025-03-02 01:45:07 IST");
    }

    #[test]
    fn formats_in_utc() {
        let t = Utc.with_ymd_and_hms(2025, 3, 1, 20, 15, 7).unwrap();
        assert_eq!(DisplayZone::utc().format(&t), "2025-03-01 20:15:07 UTC");
    }

    #[test]
    fn parses_offsets() {
        assert_eq!(DisplayZone::parse("+05:30", "IST"), Some(DisplayZone::kolkata()));
        assert_eq!(DisplayZone::parse("+0530", "IST"), Some(DisplayZone::kolkata()));
        assert_eq!(DisplayZone::parse("Z", "UTC"), Some(DisplayZone::utc()));

        let west = DisplayZone::parse("-03:00", "BRT").unwrap();
        let t = Utc.with_ymd_and_hms(2025, 3, 1, 2, 0, 0).unwrap();
        assert_eq!(west.format(&t), "2025-02-28 23:00:00 BRT");
    }

    #[test]
    fn rejects_malformed_offsets() {
        for bad in ["", "05:30", "+5:30", "+05:75", "+aa:bb", "+99:00"] {
            assert!(DisplayZone::parse(bad, "X").is_none(), "{bad} should not parse");
        }
    }
}
