//! Field rules for the registration form.
//!
//! Each rule inspects a raw JSON value and reports the constraint keys it
//! violates. Rules never short-circuit: a missing `name` fails both
//! `isString` and `isNotEmpty`.

use crate::caps::WalletAddress;
use crate::eligibility::{self, AGE_WINDOW_MESSAGE, AgeViolation, AgeWindow};
use chrono::{DateTime, Utc};
use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;

/// Shortest and longest accepted phone numbers, counting digits only.
const PHONE_DIGITS: std::ops::RangeInclusive<usize> = 8..=15;

static EMAIL: OnceLock<Regex> = OnceLock::new();
static PHONE: OnceLock<Regex> = OnceLock::new();

fn email_regex() -> &'static Regex {
    EMAIL.get_or_init(|| {
        Regex::new(
            r"^[A-Za-z0-9.!#$%&'*+/=?^_`{|}~-]+@[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?)*\.[A-Za-z]{2,}$",
        )
        .expect("valid regex")
    })
}

fn phone_regex() -> &'static Regex {
    PHONE.get_or_init(|| Regex::new(r"^\+?[0-9][0-9 ().-]*[0-9]$").expect("valid regex"))
}

/// `isNotEmpty`: anything except missing, `null` or `""`.
pub(super) fn is_not_empty(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(s) => !s.is_empty(),
        _ => true,
    }
}

pub(super) fn as_wallet_address(value: &Value) -> Option<WalletAddress> {
    value.as_str().and_then(|s| WalletAddress::parse(s).ok())
}

pub(super) fn is_email(value: &Value) -> bool {
    value.as_str().is_some_and(|s| email_regex().is_match(s))
}

pub(super) fn is_phone_number(value: &Value) -> bool {
    value.as_str().is_some_and(|s| {
        let digits = s.chars().filter(char::is_ascii_digit).count();
        phone_regex().is_match(s) && PHONE_DIGITS.contains(&digits)
    })
}

pub(super) fn parse_birth_date(value: &Value) -> Option<DateTime<Utc>> {
    value.as_str().and_then(eligibility::parse_birth_date)
}

/// Constraint keys violated by a birth date at `now`.
///
/// A date that cannot be read fails both bounds.
pub(super) fn birth_date_violations(
    birth_date: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> Vec<(&'static str, &'static str)> {
    match birth_date {
        Some(date) => AgeWindow::at(now)
            .check(date)
            .violations()
            .iter()
            .map(|v| (v.constraint(), v.message()))
            .collect(),
        None => vec![
            (AgeViolation::TooYoung.constraint(), AGE_WINDOW_MESSAGE),
            (AgeViolation::TooOld.constraint(), AGE_WINDOW_MESSAGE),
        ],
    }
}
