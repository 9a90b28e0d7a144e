//! Database repository for announcements and the teacher directory.
//!
//! Timestamps are stored as fixed-width RFC 3339 text so that SQL comparisons
//! order them chronologically.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};

use super::AnnouncementStore;
use crate::auth::TeacherDirectory;
use crate::errors::AppError;
use crate::models::{
    format_timestamp, Announcement, AnnouncementChanges, NewAnnouncement, Patch, Teacher,
};

const ANNOUNCEMENT_COLUMNS: &str = "id, message, expires_at, start_date, created_at, updated_at";

/// Database repository for all data operations.
#[derive(Clone)]
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AnnouncementStore for Repository {
    async fn list_announcements(
        &self,
        include_expired: bool,
    ) -> Result<Vec<Announcement>, AppError> {
        let now = Utc::now();

        let rows = if include_expired {
            let sql = format!(
                "SELECT {ANNOUNCEMENT_COLUMNS} FROM announcements ORDER BY expires_at, created_at"
            );
            sqlx::query(&sql).fetch_all(&self.pool).await?
        } else {
            // Narrow by expiry in SQL; the start date is checked below.
            let sql = format!(
                "SELECT {ANNOUNCEMENT_COLUMNS} FROM announcements WHERE expires_at > ? ORDER BY expires_at, created_at"
            );
            sqlx::query(&sql)
                .bind(format_timestamp(&now))
                .fetch_all(&self.pool)
                .await?
        };

        let announcements = rows
            .iter()
            .map(announcement_from_row)
            .collect::<Result<Vec<_>, _>>()?;

        if include_expired {
            return Ok(announcements);
        }

        Ok(announcements
            .into_iter()
            .filter(|a| a.is_active_at(now))
            .collect())
    }

    async fn get_announcement(&self, id: &str) -> Result<Option<Announcement>, AppError> {
        let sql = format!("SELECT {ANNOUNCEMENT_COLUMNS} FROM announcements WHERE id = ?");
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(announcement_from_row).transpose()
    }

    async fn create_announcement(&self, new: NewAnnouncement) -> Result<String, AppError> {
        let id = uuid::Uuid::new_v4().to_string();
        let now = format_timestamp(&Utc::now());

        sqlx::query(
            "INSERT INTO announcements (id, message, expires_at, start_date, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(&new.message)
        .bind(format_timestamp(&new.expires_at))
        .bind(new.start_date.as_ref().map(format_timestamp))
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        Ok(id)
    }

    async fn update_announcement(
        &self,
        id: &str,
        changes: &AnnouncementChanges,
    ) -> Result<bool, AppError> {
        let now = format_timestamp(&Utc::now());
        let (set_start, start_date) = match &changes.start_date {
            Patch::Missing => (false, None),
            Patch::Null => (true, None),
            Patch::Value(ts) => (true, Some(format_timestamp(ts))),
        };

        let result = sqlx::query(
            r#"
            UPDATE announcements SET
                message = COALESCE(?, message),
                expires_at = COALESCE(?, expires_at),
                start_date = CASE WHEN ? THEN ? ELSE start_date END,
                updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&changes.message)
        .bind(changes.expires_at.as_ref().map(format_timestamp))
        .bind(set_start)
        .bind(start_date)
        .bind(&now)
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_announcement(&self, id: &str) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM announcements WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl TeacherDirectory for Repository {
    async fn find_teacher(&self, username: &str) -> Result<Option<Teacher>, AppError> {
        let row = sqlx::query(
            "SELECT username, display_name, created_at FROM teachers WHERE username = ?",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(teacher_from_row).transpose()
    }

    async fn upsert_teacher(&self, username: &str, display_name: &str) -> Result<(), AppError> {
        let now = format_timestamp(&Utc::now());

        sqlx::query(
            "INSERT INTO teachers (username, display_name, created_at) VALUES (?, ?, ?) \
             ON CONFLICT(username) DO UPDATE SET display_name = excluded.display_name",
        )
        .bind(username)
        .bind(display_name)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

// Helper functions for row conversion

fn announcement_from_row(row: &SqliteRow) -> Result<Announcement, AppError> {
    let start_date: Option<String> = row.try_get("start_date")?;
    Ok(Announcement {
        id: row.try_get("id")?,
        message: row.try_get("message")?,
        expires_at: parse_stored(&row.try_get::<String, _>("expires_at")?)?,
        start_date: start_date.as_deref().map(parse_stored).transpose()?,
        created_at: parse_stored(&row.try_get::<String, _>("created_at")?)?,
        updated_at: parse_stored(&row.try_get::<String, _>("updated_at")?)?,
    })
}

fn teacher_from_row(row: &SqliteRow) -> Result<Teacher, AppError> {
    Ok(Teacher {
        username: row.try_get("username")?,
        display_name: row.try_get("display_name")?,
        created_at: parse_stored(&row.try_get::<String, _>("created_at")?)?,
    })
}

fn parse_stored(raw: &str) -> Result<DateTime<Utc>, AppError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| AppError::Database(format!("Invalid stored timestamp {:?}: {}", raw, e)))
}
