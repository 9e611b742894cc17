//! The age window: who may register, relative to a reference instant.

use chrono::{DateTime, Months, NaiveDate, NaiveTime, Utc};
use std::fmt;

/// Youngest accepted age, in whole years.
pub const MIN_AGE_YEARS: u32 = 10;

/// Oldest accepted age, in whole years.
pub const MAX_AGE_YEARS: u32 = 100;

/// Default text for both boundary violations ("only ages 10 through 100 may register").
pub const AGE_WINDOW_MESSAGE: &str = "10세 이상 100세 이하만 가입 가능합니다.";

/// A birth date outside the window.
///
/// The two kinds share [`AGE_WINDOW_MESSAGE`] but are reported under
/// different constraint keys so callers can tell them apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AgeViolation {
    /// Born after `now - 10 years`.
    TooYoung,
    /// Born before `now - 100 years`.
    TooOld,
}

impl AgeViolation {
    /// Constraint key the violation is reported under.
    #[inline]
    pub fn constraint(&self) -> &'static str {
        match self {
            Self::TooYoung => "maxDate",
            Self::TooOld => "minDate",
        }
    }

    #[inline]
    pub fn message(&self) -> &'static str {
        AGE_WINDOW_MESSAGE
    }
}

impl fmt::Display for AgeViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.constraint(), self.message())
    }
}

/// Outcome of an age check. Empty means the birth date is accepted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationResult {
    violations: Vec<AgeViolation>,
}

impl ValidationResult {
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }

    #[inline]
    pub fn violations(&self) -> &[AgeViolation] {
        &self.violations
    }

    pub fn contains(&self, violation: AgeViolation) -> bool {
        self.violations.contains(&violation)
    }

    pub fn into_violations(self) -> Vec<AgeViolation> {
        self.violations
    }
}

/// Inclusive range of accepted birth dates for one reference instant.
///
/// Bounds are computed with calendar arithmetic: `now - N years` lands on the
/// same month and day N years earlier, with Feb 29 clamped to Feb 28 in
/// non-leap years.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AgeWindow {
    /// `None` when `now - 100y` is not representable: no lower bound.
    min_birth_date: Option<DateTime<Utc>>,
    /// `None` when `now - 10y` is not representable: nobody is old enough.
    max_birth_date: Option<DateTime<Utc>>,
}

impl AgeWindow {
    /// The window as seen from `now`.
    pub fn at(now: DateTime<Utc>) -> Self {
        Self {
            min_birth_date: years_before(now, MAX_AGE_YEARS),
            max_birth_date: years_before(now, MIN_AGE_YEARS),
        }
    }

    /// Earliest accepted birth date (`now - 100 years`).
    #[inline]
    pub fn min_birth_date(&self) -> Option<DateTime<Utc>> {
        self.min_birth_date
    }

    /// Latest accepted birth date (`now - 10 years`).
    #[inline]
    pub fn max_birth_date(&self) -> Option<DateTime<Utc>> {
        self.max_birth_date
    }

    /// Check a birth date against both bounds independently.
    pub fn check(&self, birth_date: DateTime<Utc>) -> ValidationResult {
        let mut violations = Vec::new();
        if self.max_birth_date.is_none_or(|max| birth_date > max) {
            violations.push(AgeViolation::TooYoung);
        }
        if self.min_birth_date.is_some_and(|min| birth_date < min) {
            violations.push(AgeViolation::TooOld);
        }
        ValidationResult { violations }
    }
}

fn years_before(now: DateTime<Utc>, years: u32) -> Option<DateTime<Utc>> {
    now.checked_sub_months(Months::new(years.checked_mul(12)?))
}

/// Validate `birth_date` against the window at `now`.
///
/// Pure: the same inputs always give the same result.
pub fn validate(birth_date: DateTime<Utc>, now: DateTime<Utc>) -> ValidationResult {
    AgeWindow::at(now).check(birth_date)
}

/// Parse a birth date: RFC 3339, or a bare `YYYY-MM-DD` taken as midnight UTC.
pub fn parse_birth_date(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .map(|d| d.and_time(NaiveTime::MIN).and_utc())
}

/// Validate a calendar birth date, taken as midnight UTC.
pub fn validate_date(birth_date: NaiveDate, now: DateTime<Utc>) -> ValidationResult {
    validate(birth_date.and_time(NaiveTime::MIN).and_utc(), now)
}
