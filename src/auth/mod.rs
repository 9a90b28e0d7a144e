//! Teacher-credential authentication.
//!
//! A credential is valid when it exactly matches a username in the teacher
//! directory. The directory sits behind a trait so the lookup can be replaced
//! without touching the endpoints.

use async_trait::async_trait;

use crate::errors::AppError;
use crate::models::Teacher;

/// Query parameter carrying the teacher credential.
pub const CREDENTIAL_PARAM: &str = "teacher_username";

/// Directory of teachers allowed to manage announcements.
#[async_trait]
pub trait TeacherDirectory: Send + Sync {
    /// Exact-match lookup by username.
    async fn find_teacher(&self, username: &str) -> Result<Option<Teacher>, AppError>;

    /// Insert a teacher or refresh the display name of an existing one.
    async fn upsert_teacher(&self, username: &str, display_name: &str) -> Result<(), AppError>;
}

/// Resolve a credential to a teacher or fail with `Unauthorized`.
pub async fn require_teacher(
    directory: &dyn TeacherDirectory,
    credential: Option<&str>,
) -> Result<Teacher, AppError> {
    let Some(username) = credential.filter(|c| !c.is_empty()) else {
        tracing::warn!("Rejected request without {}", CREDENTIAL_PARAM);
        return Err(AppError::Unauthorized("Authentication required".to_string()));
    };

    match directory.find_teacher(username).await? {
        Some(teacher) => Ok(teacher),
        None => {
            tracing::warn!("Rejected request with unknown teacher credential");
            tracing::debug!("Unknown credential: {}", username);
            Err(AppError::Unauthorized(
                "Invalid teacher credentials".to_string(),
            ))
        }
    }
}
