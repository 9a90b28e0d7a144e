//! REST API module.
//!
//! Success bodies are plain JSON; failures use the `AppError` envelope.

mod announcements;

pub use announcements::*;

use axum::extract::{rejection::QueryRejection, Query};
use serde::Serialize;

use crate::auth::CREDENTIAL_PARAM;
use crate::errors::AppError;

/// Raw query-string pairs.
///
/// Kept untyped so that duplicate or unexpected parameters are reported after
/// the credential check, through the error envelope.
#[derive(Debug, Default)]
pub struct QueryParams(Vec<(String, String)>);

impl QueryParams {
    /// Accept the extractor result, mapping a malformed query string to `BadRequest`.
    pub fn from_extracted(
        query: Result<Query<Vec<(String, String)>>, QueryRejection>,
    ) -> Result<Self, AppError> {
        query
            .map(|Query(pairs)| Self(pairs))
            .map_err(|rejection| AppError::BadRequest(rejection.body_text()))
    }

    /// The teacher credential. A repeated credential is ambiguous and treated as absent.
    pub fn credential(&self) -> Option<&str> {
        self.single(CREDENTIAL_PARAM).ok().flatten()
    }

    /// Value of a parameter that may appear at most once.
    pub fn single(&self, name: &str) -> Result<Option<&str>, AppError> {
        let mut values = self
            .0
            .iter()
            .filter(|(key, _)| key == name)
            .map(|(_, value)| value.as_str());

        let first = values.next();
        if values.next().is_some() {
            return Err(AppError::BadRequest(format!(
                "Query parameter {} given more than once",
                name
            )));
        }
        Ok(first)
    }
}

/// Body returned after a successful create.
#[derive(Debug, Serialize)]
pub struct Created {
    pub id: String,
}

/// Acknowledgement returned after a successful update or delete.
#[derive(Debug, Serialize)]
pub struct Ack {
    pub ok: bool,
}

impl Ack {
    pub fn ok() -> Self {
        Self { ok: true }
    }
}
