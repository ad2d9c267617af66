//! Handler table. Every endpoint answers the JSON envelope on failure
//! and sits behind its permission gate.

pub mod crons;
pub mod hunts;
pub mod misc;
pub mod sessions;

use crate::errors::ApiError;

/// Permission gate helper.
pub fn require(allowed: bool, text: &str) -> Result<(), ApiError> {
    if allowed {
        Ok(())
    } else {
        Err(ApiError::Auth(text.to_string()))
    }
}
