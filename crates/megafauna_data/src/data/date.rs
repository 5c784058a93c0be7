//! Simulation calendar: julian day + year, and date intervals for output.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Length of each month in a 365-day year.
const MONTH_LENGTH: [u16; 12] = [31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("julian day {julian_day} is out of range [0,365]")]
pub struct InvalidDate {
    pub julian_day: u16,
}

/// One day in the simulation calendar.
///
/// The julian day ranges from 0 (January 1st) to 364, or 365 in a leap
/// year. Years are arbitrary integers; the host model defines year zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Date {
    julian_day: u16,
    year: i32,
}

impl Date {
    /// Construct a date; fails if the julian day is beyond a leap year's end.
    pub fn new(julian_day: u16, year: i32) -> Result<Self, InvalidDate> {
        if julian_day > 365 {
            return Err(InvalidDate { julian_day });
        }
        Ok(Self { julian_day, year })
    }

    #[must_use]
    pub fn julian_day(&self) -> u16 {
        self.julian_day
    }

    #[must_use]
    pub fn year(&self) -> i32 {
        self.year
    }

    /// The day following this one, assuming a 365-day year.
    #[must_use]
    pub fn next(&self) -> Self {
        if self.julian_day >= 364 {
            Self {
                julian_day: 0,
                year: self.year + 1,
            }
        } else {
            Self {
                julian_day: self.julian_day + 1,
                year: self.year,
            }
        }
    }

    /// Whether `other` is the day immediately after this one.
    ///
    /// Both a 365th and a 366th day (leap year) are accepted as the last
    /// day before January 1st of the following year.
    #[must_use]
    pub fn is_successive(&self, other: &Date) -> bool {
        if other.year == self.year && other.julian_day == self.julian_day + 1 {
            return true;
        }
        other.year == self.year + 1
            && other.julian_day == 0
            && (self.julian_day == 364 || self.julian_day == 365)
    }

    /// Month of the year (0 = January).
    #[must_use]
    pub fn month(&self) -> u16 {
        let mut day = self.julian_day.min(364);
        for (month, length) in MONTH_LENGTH.iter().enumerate() {
            if day < *length {
                return month as u16;
            }
            day -= length;
        }
        11 // day 365 in a leap year is December
    }

    /// Day within the current month (0-based).
    #[must_use]
    pub fn day_of_month(&self) -> u16 {
        if self.julian_day == 365 {
            return 30; // Dec 31st of a leap year
        }
        let mut day = self.julian_day;
        for length in MONTH_LENGTH {
            if day < length {
                return day;
            }
            day -= length;
        }
        unreachable!("julian day beyond year end");
    }

    /// Whether this is the first day of a month.
    #[must_use]
    pub fn is_first_of_month(&self) -> bool {
        self.day_of_month() == 0
    }

    /// Whether this is the last day of a month (365-day calendar; the
    /// 366th day of a leap year also counts as the end of December).
    #[must_use]
    pub fn is_last_of_month(&self) -> bool {
        if self.julian_day >= 364 {
            return true;
        }
        self.day_of_month() + 1 == MONTH_LENGTH[self.month() as usize]
    }
}

impl PartialOrd for Date {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Date {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.year
            .cmp(&other.year)
            .then(self.julian_day.cmp(&other.julian_day))
    }
}

/// The temporal resolution of aggregated output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputInterval {
    Daily,
    Monthly,
    Annual,
    Decadal,
}

/// A closed span of simulation days covered by aggregated output data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateInterval {
    first: Date,
    last: Date,
}

impl DateInterval {
    #[must_use]
    pub fn new(first: Date, last: Date) -> Self {
        Self { first, last }
    }

    #[must_use]
    pub fn first(&self) -> Date {
        self.first
    }

    #[must_use]
    pub fn last(&self) -> Date {
        self.last
    }

    /// Extend the interval so that it covers `date`.
    pub fn extend(&mut self, date: Date) {
        if date < self.first {
            self.first = date;
        }
        if date > self.last {
            self.last = date;
        }
    }

    /// Whether this interval lines up with one complete output interval,
    /// i.e. whether the aggregated data are ready to be written.
    #[must_use]
    pub fn matches_output_interval(&self, interval: OutputInterval) -> bool {
        match interval {
            OutputInterval::Daily => self.first == self.last,
            OutputInterval::Monthly => {
                self.first.year() == self.last.year()
                    && self.first.month() == self.last.month()
                    && self.first.is_first_of_month()
                    && self.last.is_last_of_month()
            }
            OutputInterval::Annual => {
                self.first.year() == self.last.year()
                    && self.first.julian_day() == 0
                    && self.last.julian_day() >= 364
            }
            OutputInterval::Decadal => {
                self.last.year() - self.first.year() == 9
                    && self.first.julian_day() == 0
                    && self.last.julian_day() >= 364
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_construction() {
        assert!(Date::new(366, 0).is_err());
        assert!(Date::new(365, 0).is_ok());
        assert!(Date::new(0, 0).is_ok());
    }

    #[test]
    fn test_successive_within_year() {
        for day in 0..364 {
            let d1 = Date::new(day, 2).unwrap();
            let d2 = Date::new(day + 1, 2).unwrap();
            assert!(d1.is_successive(&d2));
            assert!(!d2.is_successive(&d1));
            assert!(!d1.is_successive(&d1));
        }
    }

    #[test]
    fn test_successive_at_year_boundary() {
        let jan1 = Date::new(0, 1).unwrap();
        assert!(Date::new(364, 0).unwrap().is_successive(&jan1));
        // Leap year: the 366th day also precedes January 1st.
        assert!(Date::new(365, 0).unwrap().is_successive(&jan1));
        assert!(!Date::new(363, 0).unwrap().is_successive(&jan1));
        assert!(!Date::new(364, 0).unwrap().is_successive(&Date::new(0, 2).unwrap()));
    }

    #[test]
    fn test_next() {
        assert_eq!(Date::new(0, 0).unwrap().next(), Date::new(1, 0).unwrap());
        assert_eq!(Date::new(364, 3).unwrap().next(), Date::new(0, 4).unwrap());
    }

    #[test]
    fn test_ordering() {
        assert!(Date::new(0, 4).unwrap() > Date::new(0, 3).unwrap());
        assert!(Date::new(1, 4).unwrap() > Date::new(0, 4).unwrap());
        assert!(Date::new(0, 1).unwrap() > Date::new(365, 0).unwrap());
        assert!(Date::new(364, 0).unwrap() < Date::new(0, 1).unwrap());
    }

    #[test]
    fn test_months() {
        assert_eq!(Date::new(0, 0).unwrap().month(), 0);
        assert_eq!(Date::new(30, 0).unwrap().month(), 0);
        assert_eq!(Date::new(31, 0).unwrap().month(), 1);
        assert_eq!(Date::new(364, 0).unwrap().month(), 11);
        assert_eq!(Date::new(365, 0).unwrap().month(), 11);
        assert!(Date::new(0, 0).unwrap().is_first_of_month());
        assert!(Date::new(31, 0).unwrap().is_first_of_month());
        assert!(Date::new(30, 0).unwrap().is_last_of_month());
        assert!(Date::new(364, 0).unwrap().is_last_of_month());
    }

    #[test]
    fn test_interval_matching() {
        let year = DateInterval::new(Date::new(0, 5).unwrap(), Date::new(364, 5).unwrap());
        assert!(year.matches_output_interval(OutputInterval::Annual));
        assert!(!year.matches_output_interval(OutputInterval::Monthly));
        assert!(!year.matches_output_interval(OutputInterval::Decadal));

        let january = DateInterval::new(Date::new(0, 5).unwrap(), Date::new(30, 5).unwrap());
        assert!(january.matches_output_interval(OutputInterval::Monthly));
        assert!(!january.matches_output_interval(OutputInterval::Annual));

        let decade = DateInterval::new(Date::new(0, 0).unwrap(), Date::new(364, 9).unwrap());
        assert!(decade.matches_output_interval(OutputInterval::Decadal));

        let day = DateInterval::new(Date::new(17, 2).unwrap(), Date::new(17, 2).unwrap());
        assert!(day.matches_output_interval(OutputInterval::Daily));
    }

    #[test]
    fn test_extend() {
        let d = |j, y| Date::new(j, y).unwrap();
        let mut interval = DateInterval::new(d(10, 1), d(10, 1));
        interval.extend(d(11, 1));
        interval.extend(d(5, 1));
        assert_eq!(interval.first(), d(5, 1));
        assert_eq!(interval.last(), d(11, 1));
    }
}
