//! Data models for the announcements backend.

mod announcement;
mod patch;
mod teacher;

pub use announcement::*;
pub use patch::*;
pub use teacher::*;
