//! Academic period (year + term).

use serde::{Deserialize, Serialize};
use std::fmt;

/// Half of an academic year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Term {
    /// August through December.
    Odd,
    /// January through July.
    Even,
}

/// An academic period, e.g. `2025/2026` odd term.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AcademicPeriod {
    /// Academic year label, `"<start>/<end>"`.
    pub year: String,
    /// Term within the year.
    pub term: Term,
}

impl AcademicPeriod {
    /// Creates a period from a year label and a term.
    pub fn new(year: impl Into<String>, term: Term) -> Self {
        Self {
            year: year.into(),
            term,
        }
    }

    /// Resolves the period containing a calendar month (1-12).
    ///
    /// August-December belongs to the odd term of `year/year+1`;
    /// January-July to the even term of `year-1/year`.
    pub fn for_month(year: i32, month: u32) -> Self {
        if (8..=12).contains(&month) {
            Self::new(format!("{}/{}", year, year + 1), Term::Odd)
        } else {
            Self::new(format!("{}/{}", year - 1, year), Term::Even)
        }
    }
}

impl fmt::Display for AcademicPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let term = match self.term {
            Term::Odd => "odd",
            Term::Even => "even",
        };
        write!(f, "{} ({term})", self.year)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_for_month() {
        assert_eq!(
            AcademicPeriod::for_month(2025, 8),
            AcademicPeriod::new("2025/2026", Term::Odd)
        );
        assert_eq!(
            AcademicPeriod::for_month(2025, 12),
            AcademicPeriod::new("2025/2026", Term::Odd)
        );
        assert_eq!(
            AcademicPeriod::for_month(2026, 1),
            AcademicPeriod::new("2025/2026", Term::Even)
        );
        assert_eq!(
            AcademicPeriod::for_month(2026, 7),
            AcademicPeriod::new("2025/2026", Term::Even)
        );
    }

    #[test]
    fn test_display() {
        let p = AcademicPeriod::new("2025/2026", Term::Even);
        assert_eq!(p.to_string(), "2025/2026 (even)");
    }
}
