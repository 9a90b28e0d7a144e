//! Database module for SQLite persistence.
//!
//! SQLite is the source of truth for announcements and the teacher directory.

mod repository;

pub use repository::*;

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use std::str::FromStr;

use crate::auth::TeacherDirectory;
use crate::config::SeedTeacher;
use crate::errors::AppError;
use crate::models::{Announcement, AnnouncementChanges, NewAnnouncement};

/// Persistence contract consumed by the announcement endpoints.
#[async_trait]
pub trait AnnouncementStore: Send + Sync {
    /// List announcements ordered by expiry. Expired and not-yet-started
    /// announcements are dropped unless `include_expired` is set.
    async fn list_announcements(&self, include_expired: bool)
        -> Result<Vec<Announcement>, AppError>;

    async fn get_announcement(&self, id: &str) -> Result<Option<Announcement>, AppError>;

    /// Store a new announcement and return its id.
    async fn create_announcement(&self, new: NewAnnouncement) -> Result<String, AppError>;

    /// Apply a partial update. Returns false when no record matched.
    async fn update_announcement(
        &self,
        id: &str,
        changes: &AnnouncementChanges,
    ) -> Result<bool, AppError>;

    /// Delete permanently. Returns false when no record matched.
    async fn delete_announcement(&self, id: &str) -> Result<bool, AppError>;
}

/// Initialize the database connection pool and run migrations.
pub async fn init_database(db_path: &Path) -> Result<SqlitePool, sqlx::Error> {
    // Ensure the parent directory exists
    if let Some(parent) = db_path.parent() {
        tokio::fs::create_dir_all(parent).await.ok();
    }

    let db_url = format!("sqlite:{}?mode=rwc", db_path.display());

    let options = SqliteConnectOptions::from_str(&db_url)?
        .create_if_missing(true)
        .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
        .synchronous(sqlx::sqlite::SqliteSynchronous::Normal)
        .busy_timeout(std::time::Duration::from_secs(30));

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    run_migrations(&pool).await?;

    Ok(pool)
}

/// Run database migrations.
async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS announcements (
            id TEXT PRIMARY KEY,
            message TEXT NOT NULL,
            expires_at TEXT NOT NULL,
            start_date TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS teachers (
            username TEXT PRIMARY KEY,
            display_name TEXT NOT NULL,
            created_at TEXT NOT NULL
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_announcements_expires_at ON announcements(expires_at);")
        .execute(pool)
        .await?;

    Ok(())
}

/// Upsert the configured teachers into the directory.
pub async fn seed_teachers(
    directory: &dyn TeacherDirectory,
    teachers: &[SeedTeacher],
) -> Result<(), AppError> {
    for teacher in teachers {
        directory
            .upsert_teacher(&teacher.username, &teacher.display_name)
            .await?;
        tracing::info!("Seeded teacher {}", teacher.username);
    }
    Ok(())
}
