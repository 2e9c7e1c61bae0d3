// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Time source.

use chrono::{Local, NaiveDate, NaiveDateTime, NaiveTime};

/// Source of local wall-clock time.
pub trait Clock {
    /// Current local date and time.
    fn now(&self) -> NaiveDateTime;

    /// Current local date.
    fn today(&self) -> NaiveDate {
        self.now().date()
    }
}

/// Clock backed by the system's local time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// Clock frozen at a single instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(NaiveDateTime);

impl FixedClock {
    pub fn new(now: NaiveDateTime) -> Self {
        Self(now)
    }

    /// Freeze clock at midnight of `date`.
    pub fn at_date(date: NaiveDate) -> Self {
        Self(date.and_time(NaiveTime::MIN))
    }
}

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> NaiveDateTime {
        (**self).now()
    }
}
