//! HTTP client for the easyjob timecard API.
//!
//! Owns the full vendor conversation: bearer-token acquisition and
//! caching, request execution with a single forced-refresh retry on 401,
//! and typed accessors for each REST endpoint. Callers never deal with
//! tokens or raw HTTP themselves.

mod client;
mod error;

pub use client::{Client, Credentials, Payload};
pub use error::ClientError;
