//! Shared validation helpers for inbound HTTP adapters.
//!
//! Every helper yields an `invalid_request` error whose `details` name the
//! offending field and a stable machine-readable code.

use chrono::{DateTime, Utc};
use serde_json::json;

use crate::domain::{ConcertId, ConcertIdError, Error, FavoriteError};

/// Field-level validation codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorCode {
    MissingField,
    InvalidTimestamp,
    InvalidLocation,
    InvalidConcertId,
}

impl ErrorCode {
    fn as_str(self) -> &'static str {
        match self {
            Self::MissingField => "missing_field",
            Self::InvalidTimestamp => "invalid_timestamp",
            Self::InvalidLocation => "invalid_location",
            Self::InvalidConcertId => "invalid_concert_id",
        }
    }
}

/// Newtype for HTTP field names as clients spell them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    pub(crate) fn as_str(self) -> &'static str {
        self.0
    }
}

pub(crate) fn field_error(field: FieldName, code: ErrorCode, message: impl Into<String>) -> Error {
    Error::invalid_request(message).with_details(json!({
        "field": field.as_str(),
        "code": code.as_str(),
    }))
}

pub(crate) fn invalid_value_error(
    field: FieldName,
    code: ErrorCode,
    message: impl Into<String>,
    value: &str,
) -> Error {
    Error::invalid_request(message).with_details(json!({
        "field": field.as_str(),
        "value": value,
        "code": code.as_str(),
    }))
}

pub(crate) fn missing_field_error(field: FieldName) -> Error {
    let name = field.as_str();
    field_error(
        field,
        ErrorCode::MissingField,
        format!("missing required field: {name}"),
    )
}

pub(crate) fn parse_optional_rfc3339_timestamp(
    value: Option<String>,
    field: FieldName,
) -> Result<Option<DateTime<Utc>>, Error> {
    value
        .filter(|raw| !raw.trim().is_empty())
        .map(|raw| {
            DateTime::parse_from_rfc3339(raw.trim())
                .map(|timestamp| timestamp.with_timezone(&Utc))
                .map_err(|_| {
                    invalid_value_error(
                        field,
                        ErrorCode::InvalidTimestamp,
                        format!("{} must be an RFC 3339 timestamp", field.as_str()),
                        &raw,
                    )
                })
        })
        .transpose()
}

/// Parse the concert id carried by favorite and unfavorite bodies.
///
/// Absent and blank ids are the same failure.
pub(crate) fn require_concert_id(raw: Option<&str>) -> Result<ConcertId, Error> {
    let raw = raw.ok_or(FavoriteError::MissingConcertIdentifier)?;
    ConcertId::new(raw).map_err(|err| match err {
        ConcertIdError::Empty => FavoriteError::MissingConcertIdentifier.into(),
        ConcertIdError::TooLong => field_error(
            FieldName::new("concert"),
            ErrorCode::InvalidConcertId,
            err.to_string(),
        ),
    })
}
