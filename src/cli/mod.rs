//! CLI command implementations

pub mod analytics;
pub mod chat;
pub mod goal;
pub mod init;
pub mod note;
pub mod preset;
pub mod profile;
pub mod rec;
pub mod resolve;
pub mod streaks;
pub mod tag;
