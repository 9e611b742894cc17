//! Registration form validation.
//!
//! Submissions arrive as loosely typed JSON: any field may be missing or of
//! the wrong type. Every field is checked, and each failing field yields one
//! [`FieldViolation`] listing the constraint keys it broke, in declaration
//! order: `walletAddress`, `name`, `email`, `contact`, `birthDate`.
//!
//! The age rule is the one in [`crate::eligibility`]; its two boundaries are
//! reported as `maxDate` (too young) and `minDate` (too old).

mod rules;

use crate::caps::WalletAddress;
use crate::eligibility::{Clock, SystemClock};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// A raw registration submission.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationForm {
    #[serde(default)]
    pub wallet_address: Value,
    #[serde(default)]
    pub name: Value,
    #[serde(default)]
    pub email: Value,
    #[serde(default)]
    pub contact: Value,
    #[serde(default)]
    pub birth_date: Value,
}

/// A submission that passed every rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    pub wallet_address: WalletAddress,
    pub name: String,
    pub email: String,
    pub contact: String,
    pub birth_date: DateTime<Utc>,
}

/// One failing field and the constraints it violated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldViolation {
    pub property: &'static str,
    /// Constraint key to message.
    pub constraints: BTreeMap<&'static str, String>,
}

impl FieldViolation {
    fn new(property: &'static str) -> Self {
        Self {
            property,
            constraints: BTreeMap::new(),
        }
    }

    fn add(&mut self, constraint: &'static str, message: impl Into<String>) {
        self.constraints.insert(constraint, message.into());
    }

    pub fn has(&self, constraint: &str) -> bool {
        self.constraints.contains_key(constraint)
    }
}

/// Collects violations field by field.
struct Collector {
    violations: Vec<FieldViolation>,
}

impl Collector {
    fn field(&mut self, property: &'static str, check: impl FnOnce(&mut FieldViolation)) {
        let mut violation = FieldViolation::new(property);
        check(&mut violation);
        if !violation.constraints.is_empty() {
            self.violations.push(violation);
        }
    }
}

/// Validate `form` with `now` as the reference instant for the age rule.
pub fn validate_registration(
    form: &RegistrationForm,
    now: DateTime<Utc>,
) -> Result<Registration, Vec<FieldViolation>> {
    let mut out = Collector {
        violations: Vec::new(),
    };

    let wallet_address = rules::as_wallet_address(&form.wallet_address);
    out.field("walletAddress", |v| {
        if wallet_address.is_none() {
            v.add("isEthereumAddress", "walletAddress must be an Ethereum address");
        }
    });

    out.field("name", |v| {
        if !form.name.is_string() {
            v.add("isString", "name must be a string");
        }
        if !rules::is_not_empty(&form.name) {
            v.add("isNotEmpty", "name should not be empty");
        }
    });

    out.field("email", |v| {
        if !rules::is_email(&form.email) {
            v.add("isEmail", "email must be an email");
        }
        if !rules::is_not_empty(&form.email) {
            v.add("isNotEmpty", "email should not be empty");
        }
    });

    out.field("contact", |v| {
        if !rules::is_phone_number(&form.contact) {
            v.add("isPhoneNumber", "contact must be a valid phone number");
        }
        if !rules::is_not_empty(&form.contact) {
            v.add("isNotEmpty", "contact should not be empty");
        }
    });

    let birth_date = rules::parse_birth_date(&form.birth_date);
    out.field("birthDate", |v| {
        for (constraint, message) in rules::birth_date_violations(birth_date, now) {
            v.add(constraint, message);
        }
    });

    // A `None` here always comes with a violation for that field.
    match (
        wallet_address,
        form.name.as_str(),
        form.email.as_str(),
        form.contact.as_str(),
        birth_date,
    ) {
        (Some(wallet_address), Some(name), Some(email), Some(contact), Some(birth_date))
            if out.violations.is_empty() =>
        {
            Ok(Registration {
                wallet_address,
                name: name.to_string(),
                email: email.to_string(),
                contact: contact.to_string(),
                birth_date,
            })
        }
        _ => Err(out.violations),
    }
}

/// Registration validator bound to a clock.
#[derive(Debug, Clone, Default)]
pub struct RegistrationValidator<C: Clock = SystemClock> {
    clock: C,
}

impl<C: Clock> RegistrationValidator<C> {
    pub fn new(clock: C) -> Self {
        Self { clock }
    }

    pub fn validate(&self, form: &RegistrationForm) -> Result<Registration, Vec<FieldViolation>> {
        validate_registration(form, self.clock.now())
    }
}
