//! Weekday, shift, and room catalogs.
//!
//! Shifts and rooms are the resources a practicum gene is assigned to.
//! Only active shifts and active lab rooms take part in a run.

use serde::{Deserialize, Serialize};

/// Teaching day, Monday through Saturday.
///
/// [`Weekday::index`] is the 0-based day position. [`Weekday::name`] and
/// the serde form are the English upper-case names (`MONDAY`..`SATURDAY`).
/// Stores that keep other day labels, such as `SENIN`..`SABTU`, must map
/// them in their [`DomainDataLoader`](crate::loader::DomainDataLoader) and
/// [`ResultMaterializer`](crate::materialize::ResultMaterializer);
/// [`Weekday::parse`] only reads the English names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
}

impl Weekday {
    /// All teaching days in index order.
    pub const ALL: [Weekday; 6] = [
        Weekday::Monday,
        Weekday::Tuesday,
        Weekday::Wednesday,
        Weekday::Thursday,
        Weekday::Friday,
        Weekday::Saturday,
    ];

    /// Number of teaching days.
    pub const COUNT: usize = Self::ALL.len();

    /// 0-based position in [`Weekday::ALL`].
    pub fn index(self) -> usize {
        self as usize
    }

    /// Inverse of [`Weekday::index`]. `None` when out of range.
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Upper-case day name.
    pub fn name(self) -> &'static str {
        match self {
            Weekday::Monday => "MONDAY",
            Weekday::Tuesday => "TUESDAY",
            Weekday::Wednesday => "WEDNESDAY",
            Weekday::Thursday => "THURSDAY",
            Weekday::Friday => "FRIDAY",
            Weekday::Saturday => "SATURDAY",
        }
    }

    /// Parses a day name, ignoring case.
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|d| d.name().eq_ignore_ascii_case(name.trim()))
    }
}

/// A teaching shift (time band within a day).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Shift {
    /// Unique shift identifier.
    pub id: String,
    /// Human-readable label.
    pub name: String,
    /// Start time, minutes after midnight.
    pub start_minute: u32,
    /// End time, minutes after midnight.
    pub end_minute: u32,
    /// Inactive shifts are never assigned.
    pub is_active: bool,
}

impl Shift {
    /// Creates an active shift with no time band.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            start_minute: 0,
            end_minute: 0,
            is_active: true,
        }
    }

    /// Sets the label.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the time band in minutes after midnight.
    pub fn with_time(mut self, start_minute: u32, end_minute: u32) -> Self {
        self.start_minute = start_minute;
        self.end_minute = end_minute;
        self
    }

    /// Sets the active flag.
    pub fn with_active(mut self, is_active: bool) -> Self {
        self.is_active = is_active;
        self
    }
}

/// A teaching room.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Room {
    /// Unique room identifier.
    pub id: String,
    /// Human-readable label.
    pub name: String,
    /// Whether the room is a laboratory.
    pub is_lab: bool,
    /// Inactive rooms are never assigned.
    pub is_active: bool,
}

impl Room {
    /// Creates an active lab room.
    pub fn lab(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            is_lab: true,
            is_active: true,
        }
    }

    /// Creates an active lecture (non-lab) room.
    pub fn lecture(id: impl Into<String>) -> Self {
        Self {
            is_lab: false,
            ..Self::lab(id)
        }
    }

    /// Sets the label.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the active flag.
    pub fn with_active(mut self, is_active: bool) -> Self {
        self.is_active = is_active;
        self
    }

    /// Whether the room can host practicum sessions.
    pub fn is_schedulable(&self) -> bool {
        self.is_active && self.is_lab
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weekday_index_roundtrip() {
        for (i, day) in Weekday::ALL.iter().enumerate() {
            assert_eq!(day.index(), i);
            assert_eq!(Weekday::from_index(i), Some(*day));
        }
        assert_eq!(Weekday::from_index(6), None);
        assert_eq!(Weekday::COUNT, 6);
    }

    #[test]
    fn test_weekday_parse() {
        assert_eq!(Weekday::parse("monday"), Some(Weekday::Monday));
        assert_eq!(Weekday::parse(" SATURDAY "), Some(Weekday::Saturday));
        assert_eq!(Weekday::parse("SUNDAY"), None);
        // Local day labels are mapped by the loader, not parsed here.
        assert_eq!(Weekday::parse("SENIN"), None);
    }

    #[test]
    fn test_weekday_serde_name() {
        let json = serde_json::to_string(&Weekday::Wednesday).unwrap();
        assert_eq!(json, "\"WEDNESDAY\"");
    }

    #[test]
    fn test_shift_builder() {
        let s = Shift::new("S1")
            .with_name("Morning")
            .with_time(480, 600)
            .with_active(false);
        assert_eq!(s.id, "S1");
        assert_eq!(s.name, "Morning");
        assert_eq!((s.start_minute, s.end_minute), (480, 600));
        assert!(!s.is_active);
    }

    #[test]
    fn test_room_schedulable() {
        assert!(Room::lab("L1").is_schedulable());
        assert!(!Room::lecture("A1").is_schedulable());
        assert!(!Room::lab("L2").with_active(false).is_schedulable());
    }
}
