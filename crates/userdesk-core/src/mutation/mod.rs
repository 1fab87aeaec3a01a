//! Create, update and delete of user records.
//!
//! `UserMutations` runs each write as one unit: validate the form, call the
//! remote collection, and only after the call succeeds mark the affected
//! cache keys stale. A failed call leaves the cache untouched.

pub mod coordinator;
pub mod error;

pub use coordinator::UserMutations;
pub use error::MutationError;
