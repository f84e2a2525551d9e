use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    NotFound,
    Validation,
    Conflict,
    Internal,
}

/// Error body returned by the business API.
///
/// Older endpoints only send `{"message": "..."}`, so `code` is optional on
/// the way in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<ErrorCode>,
    pub message: String,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("assignment flag must be 0 or 1, got {0}")]
pub struct InvalidAssignmentFlag(pub i64);

#[derive(Debug, Error, PartialEq, Eq)]
#[error("score {0} is outside 0..=100")]
pub struct ScoreOutOfRange(pub u32);
