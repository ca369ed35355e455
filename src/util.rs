use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};

/// Calendar position of a game: the season year and the day index within it.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Deserialize, Serialize)]
pub struct Date {
    pub season: u16,
    pub day: u16,
}

impl Date {
    pub fn next_day(self) -> Date {
        Date {
            season: self.season,
            day: self.day + 1,
        }
    }
}

impl Display for Date {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} day {}", self.season, self.day)
    }
}

/// Renders `3` as `3rd`, `12` as `12th`, for seed lines in log output.
pub(crate) struct Ordinal(pub(crate) u8);

impl Display for Ordinal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let n = self.0;
        write!(
            f,
            "{}{}",
            n,
            match n % 100 {
                11 | 12 | 13 => "th",
                _ => match n % 10 {
                    1 => "st",
                    2 => "nd",
                    3 => "rd",
                    _ => "th",
                },
            }
        )
    }
}

/// `made / attempted`, or `None` when nothing was attempted.
pub fn ratio(made: u32, attempted: u32) -> Option<f64> {
    if attempted == 0 {
        None
    } else {
        Some(f64::from(made) / f64::from(attempted))
    }
}
