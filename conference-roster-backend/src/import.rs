//! Feed in, reconciled collection out.

use conference_roster_config::Config;
use conference_roster_database::Store;
use tracing::info;

use crate::error::AppError;
use crate::normalize::{classes_from_feed, participants_from_feed, FeedTable, NormalizeOptions};
use crate::reconcile::{sync, SyncOptions, SyncReport};

pub async fn import_participants<S: Store>(
    store: &S,
    table: &FeedTable,
    config: &Config,
) -> Result<SyncReport, AppError> {
    let participants = participants_from_feed(table, &NormalizeOptions::from_config(config))?;
    info!("importing {} participants", participants.len());
    sync(store, participants, &SyncOptions::participants(config)).await
}

pub async fn import_classes<S: Store>(
    store: &S,
    table: &FeedTable,
    config: &Config,
) -> Result<SyncReport, AppError> {
    let classes = classes_from_feed(table)?;
    info!("importing {} classes", classes.len());
    sync(store, classes, &SyncOptions::classes(config)).await
}
