//! Typed reads and writes on top of the document store.

use conference_roster_database::{Document, Store, Transaction};
use tracing::debug;

use crate::error::AppError;
use crate::fields::{import_hash, Record, Stored};
use crate::model::{
    Class, ClassEvaluation, ClassIndex, Conference, ConferenceEvaluation, Participant,
};

/// `Ok(None)` when nothing is stored under `id`.
pub async fn load<R: Stored, T: Transaction>(
    tx: &mut T,
    id: &str,
) -> Result<Option<R>, AppError> {
    match tx.get(R::COLLECTION, id).await? {
        Some(document) => Ok(Some(serde_json::from_str(&document.body)?)),
        None => Ok(None),
    }
}

pub async fn load_all<R: Stored, T: Transaction>(tx: &mut T) -> Result<Vec<R>, AppError> {
    let mut records = Vec::new();
    for id in tx.keys(R::COLLECTION).await? {
        if let Some(record) = load(tx, &id).await? {
            records.push(record);
        }
    }
    Ok(records)
}

pub async fn load_classes<T: Transaction>(tx: &mut T) -> Result<ClassIndex, AppError> {
    let classes: Vec<Class> = load_all(tx).await?;
    Ok(classes
        .into_iter()
        .map(|class| (class.number, class))
        .collect())
}

/// A conference that was never saved has no lunches.
pub async fn load_conference<T: Transaction>(tx: &mut T) -> Result<Conference, AppError> {
    Ok(load(tx, Conference::KEY).await?.unwrap_or_default())
}

/// Stores a record that is not reconciled against a feed.
pub async fn save<R: Stored, T: Transaction>(tx: &mut T, record: &R) -> Result<(), AppError> {
    let document = Document {
        id: record.key(),
        import_hash: String::new(),
        body: serde_json::to_string(record)?,
    };
    tx.put(R::COLLECTION, document).await?;
    Ok(())
}

/// Stores a feed record under `id` with a fresh import hash.
pub async fn save_record<R: Record, T: Transaction>(
    tx: &mut T,
    id: String,
    record: &R,
) -> Result<(), AppError> {
    let document = Document {
        id,
        import_hash: import_hash(record),
        body: serde_json::to_string(record)?,
    };
    tx.put(R::COLLECTION, document).await?;
    Ok(())
}

/// Applies a staff edit to one participant. The participant keeps its key
/// even if the edit touches identity fields, the next import decides what
/// happens to it. Returns `Ok(None)` if there is no such participant.
pub async fn edit_participant<S: Store>(
    store: &S,
    id: &str,
    edit: impl FnOnce(&mut Participant),
) -> Result<Option<Participant>, AppError> {
    let mut tx = store.begin().await?;
    let Some(mut participant) = load::<Participant, _>(&mut tx, id).await? else {
        return Ok(None);
    };
    edit(&mut participant);
    save_record(&mut tx, id.to_owned(), &participant).await?;
    tx.commit().await?;
    debug!(id, "participant edited");
    Ok(Some(participant))
}

/// Applies `edit` to the conference and bumps its version so cached lunch
/// lookups are rebuilt.
pub async fn update_conference<S: Store>(
    store: &S,
    edit: impl FnOnce(&mut Conference),
) -> Result<Conference, AppError> {
    let mut tx = store.begin().await?;
    let mut conference = load_conference(&mut tx).await?;
    edit(&mut conference);
    conference.version += 1;
    save(&mut tx, &conference).await?;
    tx.commit().await?;
    debug!(version = conference.version, "conference updated");
    Ok(conference)
}

pub async fn load_class_evaluation<T: Transaction>(
    tx: &mut T,
    participant_id: &str,
    session: usize,
) -> Result<Option<ClassEvaluation>, AppError> {
    load(tx, &ClassEvaluation::key_for(participant_id, session)).await
}

pub async fn load_conference_evaluation<T: Transaction>(
    tx: &mut T,
    participant_id: &str,
) -> Result<Option<ConferenceEvaluation>, AppError> {
    load(tx, participant_id).await
}
