//! Announcement API endpoints.

use std::collections::BTreeMap;

use axum::{
    body::Bytes,
    extract::{rejection::QueryRejection, Path, Query, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde_json::Value;

use super::{Ack, Created, QueryParams};
use crate::auth::require_teacher;
use crate::errors::AppError;
use crate::models::{
    parse_timestamp, Announcement, AnnouncementChanges, NewAnnouncement,
    UpdateAnnouncementRequest,
};
use crate::AppState;

type RawQuery = Result<Query<Vec<(String, String)>>, QueryRejection>;

/// GET /announcements - List active announcements keyed by id.
pub async fn list_announcements(
    State(state): State<AppState>,
) -> Result<Json<BTreeMap<String, Announcement>>, AppError> {
    let items = state.store.list_announcements(false).await?;

    Ok(Json(
        items
            .into_iter()
            .map(|announcement| (announcement.id.clone(), announcement))
            .collect(),
    ))
}

/// POST /announcements - Create an announcement from query parameters.
pub async fn create_announcement(
    State(state): State<AppState>,
    query: RawQuery,
) -> Result<Json<Created>, AppError> {
    let params = QueryParams::from_extracted(query)?;
    let teacher = require_teacher(state.teachers.as_ref(), params.credential()).await?;

    let message = params
        .single("message")?
        .filter(|m| !m.trim().is_empty())
        .ok_or_else(|| AppError::BadRequest("Message is required".to_string()))?;

    let expires_at = params
        .single("expires_at")?
        .filter(|raw| !raw.trim().is_empty())
        .ok_or_else(|| AppError::BadRequest("expires_at is required".to_string()))?;
    let expires_at = timestamp_field("expires_at", expires_at)?;

    let start_date = params
        .single("start_date")?
        .filter(|raw| !raw.trim().is_empty())
        .map(|raw| timestamp_field("start_date", raw))
        .transpose()?;

    let id = state
        .store
        .create_announcement(NewAnnouncement {
            message: message.to_string(),
            expires_at,
            start_date,
        })
        .await?;

    tracing::info!("Announcement {} created by {}", id, teacher.username);
    Ok(Json(Created { id }))
}

/// PUT /announcements/{announcement_id} - Partially update an announcement.
///
/// The body is parsed after authentication so that a bad credential is always
/// reported as 401.
pub async fn update_announcement(
    State(state): State<AppState>,
    Path(announcement_id): Path<String>,
    query: RawQuery,
    body: Bytes,
) -> Result<Json<Ack>, AppError> {
    let params = QueryParams::from_extracted(query)?;
    let teacher = require_teacher(state.teachers.as_ref(), params.credential()).await?;

    let changes = validate_changes(parse_update_body(&body)?)?;

    if !state
        .store
        .update_announcement(&announcement_id, &changes)
        .await?
    {
        return Err(AppError::NotFound(
            "Announcement not found or not modified".to_string(),
        ));
    }

    tracing::info!(
        "Announcement {} updated by {}",
        announcement_id,
        teacher.username
    );
    Ok(Json(Ack::ok()))
}

/// DELETE /announcements/{announcement_id} - Delete an announcement.
pub async fn delete_announcement(
    State(state): State<AppState>,
    Path(announcement_id): Path<String>,
    query: RawQuery,
) -> Result<Json<Ack>, AppError> {
    let params = QueryParams::from_extracted(query)?;
    let teacher = require_teacher(state.teachers.as_ref(), params.credential()).await?;

    if !state.store.delete_announcement(&announcement_id).await? {
        return Err(AppError::NotFound("Announcement not found".to_string()));
    }

    tracing::info!(
        "Announcement {} deleted by {}",
        announcement_id,
        teacher.username
    );
    Ok(Json(Ack::ok()))
}

/// The update body must be a JSON object; derived structs would also take arrays.
fn parse_update_body(body: &[u8]) -> Result<UpdateAnnouncementRequest, AppError> {
    let value: Value = serde_json::from_slice(body)?;
    if !value.is_object() {
        return Err(AppError::BadRequest(
            "Request body must be a JSON object".to_string(),
        ));
    }
    Ok(serde_json::from_value(value)?)
}

/// Turn an update body into store-level changes.
///
/// A null never counts as a supplied field. Null `message` and `expires_at`
/// keep the stored value; null `start_date` clears it.
fn validate_changes(request: UpdateAnnouncementRequest) -> Result<AnnouncementChanges, AppError> {
    if !request.has_changes() {
        return Err(AppError::BadRequest("No fields to update".to_string()));
    }

    if request
        .message
        .as_value()
        .is_some_and(|m| m.trim().is_empty())
    {
        return Err(AppError::BadRequest("Message cannot be empty".to_string()));
    }

    Ok(AnnouncementChanges {
        message: request.message.into_option(),
        expires_at: request
            .expires_at
            .try_map(|raw| timestamp_field("expires_at", &raw))?
            .into_option(),
        start_date: request
            .start_date
            .try_map(|raw| timestamp_field("start_date", &raw))?,
    })
}

fn timestamp_field(name: &str, raw: &str) -> Result<DateTime<Utc>, AppError> {
    parse_timestamp(raw)
        .ok_or_else(|| AppError::BadRequest(format!("{} is not a valid timestamp: {}", name, raw)))
}
