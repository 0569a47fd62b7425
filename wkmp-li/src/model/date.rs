//! Partial ISO-8601 dates as found in tags
//!
//! Tags carry anything from a bare year to a full timestamp. Only the
//! components actually present are kept, and comparison is component-wise.

use std::fmt;

/// A date with optional precision below the year
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Date {
    year: u16,
    month: Option<u8>,
    day: Option<u8>,
    hour: Option<u8>,
    minute: Option<u8>,
    second: Option<u8>,
}

impl Date {
    pub fn from_year(year: u32) -> Option<Self> {
        Self::from_components(&[year])
    }

    /// Parse `YYYY`, `YYYY-MM`, `YYYY-MM-DD` and `YYYY-MM-DD[T ]HH:MM[:SS]`.
    ///
    /// A trailing `Z` or timezone offset is ignored. Out-of-range components
    /// make the whole value invalid.
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        let value = value.strip_suffix('Z').unwrap_or(value);
        // Drop a "+HH:MM" or "-HH:MM" offset; only look past the time
        // separator, where '-' can no longer be a date separator.
        let value = match value.find('T').or_else(|| value.find(' ')) {
            Some(split) => match value[split..].find(['+', '-']) {
                Some(offset) => &value[..split + offset],
                None => value,
            },
            None => value,
        };

        let mut components = Vec::with_capacity(6);
        for token in value.split(['-', 'T', ' ', ':']) {
            if components.len() == 6 {
                break;
            }
            match token.parse::<u32>() {
                Ok(number) if token.bytes().all(|b| b.is_ascii_digit()) => components.push(number),
                _ => return None,
            }
        }

        Self::from_components(&components)
    }

    fn from_components(components: &[u32]) -> Option<Self> {
        fn bounded(value: Option<&u32>, range: std::ops::RangeInclusive<u32>) -> Option<Option<u8>> {
            match value {
                None => Some(None),
                Some(v) if range.contains(v) => Some(Some(*v as u8)),
                Some(_) => None,
            }
        }

        let year = *components.first()?;
        if !(1..=9999).contains(&year) {
            return None;
        }

        Some(Self {
            year: year as u16,
            month: bounded(components.get(1), 1..=12)?,
            day: bounded(components.get(2), 1..=31)?,
            hour: bounded(components.get(3), 0..=23)?,
            minute: bounded(components.get(4), 0..=59)?,
            second: bounded(components.get(5), 0..=59)?,
        })
    }

    pub fn year(&self) -> u32 {
        self.year as u32
    }

    pub fn month(&self) -> Option<u32> {
        self.month.map(u32::from)
    }

    pub fn day(&self) -> Option<u32> {
        self.day.map(u32::from)
    }
}

impl fmt::Display for Date {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}", self.year)?;
        let Some(month) = self.month else {
            return Ok(());
        };
        write!(f, "-{:02}", month)?;
        let Some(day) = self.day else {
            return Ok(());
        };
        write!(f, "-{:02}", day)?;
        let Some(hour) = self.hour else {
            return Ok(());
        };
        write!(f, "T{:02}", hour)?;
        let Some(minute) = self.minute else {
            return Ok(());
        };
        write!(f, ":{:02}", minute)?;
        if let Some(second) = self.second {
            write!(f, ":{:02}", second)?;
        }
        Ok(())
    }
}

/// Inclusive span of dates, e.g. the release dates across an album's songs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DateRange {
    pub min: Date,
    pub max: Date,
}

impl DateRange {
    /// Smallest range covering every date, `None` when there are none
    pub fn from_dates(dates: impl IntoIterator<Item = Date>) -> Option<Self> {
        let mut dates = dates.into_iter();
        let first = dates.next()?;
        Some(dates.fold(Self { min: first, max: first }, |range, date| Self {
            min: range.min.min(date),
            max: range.max.max(date),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_year_only() {
        let date = Date::parse("1997").unwrap();
        assert_eq!(date.year(), 1997);
        assert_eq!(date.month(), None);
        assert_eq!(date.to_string(), "1997");
    }

    #[test]
    fn test_parse_full_timestamp() {
        let date = Date::parse("2003-07-14T09:30:05Z").unwrap();
        assert_eq!(date.to_string(), "2003-07-14T09:30:05");
    }

    #[test]
    fn test_parse_space_separated_time() {
        let date = Date::parse("2003-07-14 09:30").unwrap();
        assert_eq!(date.to_string(), "2003-07-14T09:30");
    }

    #[test]
    fn test_parse_ignores_positive_offset() {
        let date = Date::parse("2010-01-02T03:04:05+02:00").unwrap();
        assert_eq!(date.to_string(), "2010-01-02T03:04:05");
    }

    #[test]
    fn test_parse_ignores_negative_offset() {
        let date = Date::parse("1999-02-03T10:00-05:00").unwrap();
        assert_eq!(date.to_string(), "1999-02-03T10:00");

        let spaced = Date::parse("1999-02-03 10:00:30-0500").unwrap();
        assert_eq!(spaced.to_string(), "1999-02-03T10:00:30");
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(Date::parse(""), None);
        assert_eq!(Date::parse("unknown"), None);
        assert_eq!(Date::parse("1999-13"), None);
        assert_eq!(Date::parse("0"), None);
        assert_eq!(Date::parse("2001--02"), None);
    }

    #[test]
    fn test_ordering_is_component_wise() {
        let year = Date::parse("2001").unwrap();
        let month = Date::parse("2001-02").unwrap();
        let later = Date::parse("2001-03-01").unwrap();
        assert!(year < month);
        assert!(month < later);
        assert!(Date::parse("2000-12-31").unwrap() < year);
    }

    #[test]
    fn test_range_covers_all_dates() {
        let range = DateRange::from_dates(
            ["2004", "1999-05", "2001"].iter().filter_map(|d| Date::parse(d)),
        )
        .unwrap();
        assert_eq!(range.min.to_string(), "1999-05");
        assert_eq!(range.max.to_string(), "2004");
        assert!(DateRange::from_dates(Vec::new()).is_none());
    }
}
