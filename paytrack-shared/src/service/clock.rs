/// Source of "today" for status derivation
use chrono::{Local, NaiveDate};

/// Supplies the reference date that derived payment fields are computed against
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Clock {
    /// Local calendar date of the host
    #[default]
    System,

    /// Always the given date
    Fixed(NaiveDate),
}

impl Clock {
    pub fn today(&self) -> NaiveDate {
        match self {
            Clock::System => Local::now().date_naive(),
            Clock::Fixed(date) => *date,
        }
    }
}
