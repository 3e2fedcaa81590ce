//! Turns raw feed rows into canonical records.

mod classes;
mod cleanup;
mod feed;
mod participants;

pub use classes::{class_columns, classes_from_feed};
pub use cleanup::{fix_case, title_case};
pub use feed::FeedTable;
pub use participants::{participant_columns, participants_from_feed, BANQUET_CLASS_NUMBER};

/// Settings the participant cleanup depends on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizeOptions {
    /// Districts are only meaningful inside this council.
    pub home_council: String,
}

impl NormalizeOptions {
    #[must_use]
    pub fn from_config(config: &conference_roster_config::Config) -> Self {
        Self {
            home_council: config.home_council.clone(),
        }
    }
}
