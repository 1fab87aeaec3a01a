//! Flat, editable representation of a user record.
//!
//! This module converts between the nested `UserRecord` the server stores and
//! the eleven-field `FormState` an editor works with, and validates a form
//! before anything is sent:
//!
//! - `to_form_state` / `to_wire_payload`: the two directions of the mapping
//! - `validate`: field-level checks producing a `ValidatedForm` or `FieldErrors`
//!
//! Only a `ValidatedForm` can produce a `CreatePayload` or `UpdatePayload`.

pub mod mapper;
pub mod validation;

pub use mapper::{to_form_state, to_wire_payload, FormField, FormState, UnknownField};
pub use validation::{validate, FieldErrors, ValidatedForm};
