//! Data models for user records.
//!
//! - `UserRecord`, `Address`, `Geo`: the nested record as the server stores it
//! - `UserPayload`: a record without its server-assigned id
//! - `CreatePayload`, `UpdatePayload`: per-operation payloads built from a
//!   validated form

pub mod user;

pub use user::{Address, CreatePayload, Geo, UpdatePayload, UserPayload, UserRecord, DEFAULT_COORDINATE};
