//! Weekly opening hours attached to a site.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Days of the week in the order the backend lists them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Weekday {
    pub const ALL: [Weekday; 7] = [
        Weekday::Monday,
        Weekday::Tuesday,
        Weekday::Wednesday,
        Weekday::Thursday,
        Weekday::Friday,
        Weekday::Saturday,
        Weekday::Sunday,
    ];

    /// Lowercase key used on the wire.
    pub fn key(self) -> &'static str {
        match self {
            Weekday::Monday => "monday",
            Weekday::Tuesday => "tuesday",
            Weekday::Wednesday => "wednesday",
            Weekday::Thursday => "thursday",
            Weekday::Friday => "friday",
            Weekday::Saturday => "saturday",
            Weekday::Sunday => "sunday",
        }
    }

    pub fn is_weekend(self) -> bool {
        matches!(self, Weekday::Saturday | Weekday::Sunday)
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Weekday::Monday => "Monday",
            Weekday::Tuesday => "Tuesday",
            Weekday::Wednesday => "Wednesday",
            Weekday::Thursday => "Thursday",
            Weekday::Friday => "Friday",
            Weekday::Saturday => "Saturday",
            Weekday::Sunday => "Sunday",
        };
        f.write_str(label)
    }
}

/// Opening window for a single day. Times are `HH:MM` or empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayHours {
    pub is_closed: bool,
    #[serde(default)]
    pub open: String,
    #[serde(default)]
    pub close: String,
}

impl DayHours {
    pub fn open(open: impl Into<String>, close: impl Into<String>) -> Self {
        Self {
            is_closed: false,
            open: open.into(),
            close: close.into(),
        }
    }

    pub fn closed() -> Self {
        Self {
            is_closed: true,
            open: String::new(),
            close: String::new(),
        }
    }
}

/// Opening hours keyed by lowercase weekday name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperatingHours {
    pub monday: DayHours,
    pub tuesday: DayHours,
    pub wednesday: DayHours,
    pub thursday: DayHours,
    pub friday: DayHours,
    pub saturday: DayHours,
    pub sunday: DayHours,
}

impl OperatingHours {
    /// Every day shares the same window.
    pub fn uniform(day: DayHours) -> Self {
        Self {
            monday: day.clone(),
            tuesday: day.clone(),
            wednesday: day.clone(),
            thursday: day.clone(),
            friday: day.clone(),
            saturday: day.clone(),
            sunday: day,
        }
    }

    pub fn day(&self, weekday: Weekday) -> &DayHours {
        match weekday {
            Weekday::Monday => &self.monday,
            Weekday::Tuesday => &self.tuesday,
            Weekday::Wednesday => &self.wednesday,
            Weekday::Thursday => &self.thursday,
            Weekday::Friday => &self.friday,
            Weekday::Saturday => &self.saturday,
            Weekday::Sunday => &self.sunday,
        }
    }

    pub fn day_mut(&mut self, weekday: Weekday) -> &mut DayHours {
        match weekday {
            Weekday::Monday => &mut self.monday,
            Weekday::Tuesday => &mut self.tuesday,
            Weekday::Wednesday => &mut self.wednesday,
            Weekday::Thursday => &mut self.thursday,
            Weekday::Friday => &mut self.friday,
            Weekday::Saturday => &mut self.saturday,
            Weekday::Sunday => &mut self.sunday,
        }
    }

    pub fn set_day(&mut self, weekday: Weekday, hours: DayHours) {
        *self.day_mut(weekday) = hours;
    }

    /// Iterates days from Monday to Sunday.
    pub fn iter(&self) -> impl Iterator<Item = (Weekday, &DayHours)> + '_ {
        Weekday::ALL.into_iter().map(move |day| (day, self.day(day)))
    }

    pub fn open_days(&self) -> usize {
        self.iter().filter(|(_, hours)| !hours.is_closed).count()
    }
}

impl Default for OperatingHours {
    /// Weekdays 09:00-17:00, weekends closed.
    fn default() -> Self {
        let mut hours = Self::uniform(DayHours::open("09:00", "17:00"));
        hours.saturday = DayHours::closed();
        hours.sunday = DayHours::closed();
        hours
    }
}
