use chrono::{DateTime, Utc};
use regiongate_core::{AppError, AppResult, UserId};
use serde::Serialize;
use ts_rs::TS;

/// Health response payload.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/health-response.ts"
)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Parses a transport user id, naming the offending field on failure.
pub fn parse_user_id(field: &str, value: &str) -> AppResult<UserId> {
    UserId::parse(value.trim())
        .map_err(|_| AppError::Validation(format!("{field} must be a valid user id")))
}

/// Parses an RFC 3339 timestamp into UTC.
pub fn parse_timestamp(field: &str, value: &str) -> AppResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value.trim())
        .map(|timestamp| timestamp.with_timezone(&Utc))
        .map_err(|error| {
            AppError::Validation(format!("{field} must be an RFC 3339 timestamp: {error}"))
        })
}
