//! Registration eligibility by age.
//!
//! A subject may register when they are between 10 and 100 years old,
//! inclusive, at the reference instant. The reference instant is always an
//! input: [`validate`] takes it explicitly and [`EligibilityWindowValidator`]
//! reads it from an injected [`Clock`].

mod clock;
mod window;

pub use clock::{Clock, FixedClock, SystemClock};
pub use window::{
    AGE_WINDOW_MESSAGE, AgeViolation, AgeWindow, MAX_AGE_YEARS, MIN_AGE_YEARS, ValidationResult,
    parse_birth_date, validate, validate_date,
};

use chrono::{DateTime, Utc};

/// Age validator bound to a clock.
#[derive(Debug, Clone, Default)]
pub struct EligibilityWindowValidator<C: Clock = SystemClock> {
    clock: C,
}

impl<C: Clock> EligibilityWindowValidator<C> {
    pub fn new(clock: C) -> Self {
        Self { clock }
    }

    /// The window as of the clock's current instant.
    pub fn window(&self) -> AgeWindow {
        AgeWindow::at(self.clock.now())
    }

    pub fn check(&self, birth_date: DateTime<Utc>) -> ValidationResult {
        validate(birth_date, self.clock.now())
    }

    #[inline]
    pub fn clock(&self) -> &C {
        &self.clock
    }
}
