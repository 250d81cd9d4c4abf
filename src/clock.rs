use std::fmt::{self, Display};

use serde::Serialize;

pub const HOURS_PER_DAY: u8 = 24;

/// The simulated time of day. Each tick of the city advances the clock by one hour; the day
/// counter increments when the hour wraps from 23 to 0.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Clock {
    hour: u8,
    day: u32,
}

impl Clock {
    #[must_use]
    pub fn new() -> Clock {
        Clock::default()
    }

    /// Advances one hour and returns the new hour.
    pub fn advance(&mut self) -> u8 {
        self.hour += 1;
        if self.hour == HOURS_PER_DAY {
            self.hour = 0;
            self.day += 1;
        }
        self.hour
    }

    #[must_use]
    pub fn current_hour(&self) -> u8 {
        self.hour
    }

    #[must_use]
    pub fn current_day(&self) -> u32 {
        self.day
    }

    /// Hours elapsed since the clock started.
    #[must_use]
    pub fn elapsed_hours(&self) -> u64 {
        u64::from(self.day) * u64::from(HOURS_PER_DAY) + u64::from(self.hour)
    }
}

impl Display for Clock {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "day {} {:02}:00", self.day, self.hour)
    }
}
