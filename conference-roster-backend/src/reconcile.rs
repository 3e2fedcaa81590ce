//! Brings a stored collection in line with a complete feed.

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

use conference_roster_config::Config;
use conference_roster_database::{Collection, Document, Store, Transaction};
use tracing::{debug, info, warn};

use crate::error::AppError;
use crate::fields::{import_hash, merge_feed_fields, Record};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncOptions {
    /// Smaller batches are assumed to be truncated exports and rejected.
    pub min_batch: usize,
}

impl SyncOptions {
    #[must_use]
    pub const fn participants(config: &Config) -> Self {
        Self {
            min_batch: config.import.min_participants,
        }
    }

    #[must_use]
    pub const fn classes(config: &Config) -> Self {
        Self {
            min_batch: config.import.min_classes,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub inserted: usize,
    pub updated: usize,
    pub deleted: usize,
    pub unchanged: usize,
}

impl SyncReport {
    #[must_use]
    pub const fn mutations(&self) -> usize {
        self.inserted + self.updated + self.deleted
    }
}

enum Mutation {
    Put(Document),
    Delete(String),
}

fn document<R: Record>(record: &R, id: String) -> Result<Document, AppError> {
    Ok(Document {
        id,
        import_hash: import_hash(record),
        body: serde_json::to_string(record)?,
    })
}

/// Later rows replace earlier ones with the same key.
fn by_key<R: Record>(batch: Vec<R>) -> BTreeMap<String, R> {
    let mut incoming = BTreeMap::new();
    for record in batch {
        match incoming.entry(record.key()) {
            Entry::Vacant(entry) => {
                entry.insert(record);
            }
            Entry::Occupied(mut entry) => {
                warn!(
                    collection = R::COLLECTION.name(),
                    id = entry.key().as_str(),
                    "feed lists the same record twice, keeping the later row"
                );
                entry.insert(record);
            }
        }
    }
    incoming
}

async fn stage<R: Record, T: Transaction>(
    tx: &mut T,
    incoming: BTreeMap<String, R>,
) -> Result<(Vec<Mutation>, SyncReport), AppError> {
    let collection = R::COLLECTION;
    let mut existing: BTreeMap<String, String> = tx
        .keys(collection)
        .await?
        .into_iter()
        .map(|id| (id, String::new()))
        .collect();
    for (id, hash) in tx.import_hashes(collection).await? {
        if let Some(stored) = existing.get_mut(&id) {
            *stored = hash;
        }
    }

    let mut report = SyncReport::default();
    let mut mutations = Vec::new();
    for (id, record) in incoming {
        match existing.remove(&id) {
            None => {
                report.inserted += 1;
                mutations.push(Mutation::Put(document(&record, id)?));
            }
            Some(stored) if stored == import_hash(&record) => report.unchanged += 1,
            Some(_) => {
                let merged = match tx.get(collection, &id).await? {
                    Some(current) => {
                        let mut current: R = serde_json::from_str(&current.body)?;
                        merge_feed_fields(&mut current, &record);
                        current
                    }
                    // listed by the key scan but gone now, treat as first seen
                    None => record,
                };
                report.updated += 1;
                mutations.push(Mutation::Put(document(&merged, id)?));
            }
        }
    }
    report.deleted = existing.len();
    mutations.extend(existing.into_keys().map(Mutation::Delete));
    Ok((mutations, report))
}

async fn apply<T: Transaction>(
    tx: &mut T,
    collection: Collection,
    mutations: Vec<Mutation>,
) -> Result<(), AppError> {
    for mutation in mutations {
        match mutation {
            Mutation::Put(document) => {
                debug!(collection = collection.name(), id = document.id.as_str(), "put");
                tx.put(collection, document).await?;
            }
            Mutation::Delete(id) => {
                debug!(collection = collection.name(), id = id.as_str(), "delete");
                tx.delete(collection, &id).await?;
            }
        }
    }
    Ok(())
}

/// Makes the stored collection match `batch`, which must be the complete
/// feed: new records are inserted, changed ones get their feed-owned fields
/// replaced and records missing from the batch are deleted. Everything
/// happens in one transaction, so either all of it is visible afterwards or
/// none of it is.
pub async fn sync<R: Record, S: Store>(
    store: &S,
    batch: Vec<R>,
    options: &SyncOptions,
) -> Result<SyncReport, AppError> {
    let collection = R::COLLECTION;
    let incoming = by_key(batch);
    if incoming.len() < options.min_batch {
        return Err(AppError::BatchTooSmall {
            collection: collection.name(),
            size: incoming.len(),
            minimum: options.min_batch,
        });
    }

    let mut tx = store.begin().await?;
    let staged = match stage(&mut tx, incoming).await {
        Ok((mutations, report)) => apply(&mut tx, collection, mutations)
            .await
            .map(|()| report),
        Err(err) => Err(err),
    };
    let report = match staged {
        Ok(report) => report,
        Err(err) => {
            if let Err(rollback) = tx.rollback().await {
                warn!("rollback of {} sync failed: {rollback}", collection.name());
            }
            return Err(err);
        }
    };
    tx.commit().await?;

    info!(
        collection = collection.name(),
        inserted = report.inserted,
        updated = report.updated,
        deleted = report.deleted,
        unchanged = report.unchanged,
        "sync committed"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use conference_roster_database::MemoryStore;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::fields::Stored;
    use crate::model::{Class, InstructorClass, Participant};

    const OPTIONS: SyncOptions = SyncOptions { min_batch: 1 };

    fn participant(first_name: &str, classes: &[i32]) -> Participant {
        let mut participant = Participant {
            last_name: "Lee".to_owned(),
            first_name: first_name.to_owned(),
            registration_number: format!("R-{first_name}"),
            unit_type: "Troop".to_owned(),
            ..Participant::default()
        };
        participant.set_classes(classes.iter().copied());
        participant
    }

    async fn stored(store: &MemoryStore) -> Vec<Participant> {
        store
            .documents(Collection::Participants)
            .await
            .iter()
            .map(|document| serde_json::from_str(&document.body).unwrap())
            .collect()
    }

    #[tokio::test]
    async fn second_sync_of_same_batch_changes_nothing() {
        let store = MemoryStore::new();
        let batch = vec![participant("Ann", &[101]), participant("Bob", &[201])];

        let first = sync(&store, batch.clone(), &OPTIONS).await.unwrap();
        assert_eq!(
            first,
            SyncReport {
                inserted: 2,
                ..SyncReport::default()
            }
        );

        let second = sync(&store, batch, &OPTIONS).await.unwrap();
        assert_eq!(second.mutations(), 0);
        assert_eq!(second.unchanged, 2);
    }

    #[tokio::test]
    async fn local_fields_survive_reimport() {
        let store = MemoryStore::new();
        sync(&store, vec![participant("Ann", &[101])], &OPTIONS)
            .await
            .unwrap();

        let mut edited = stored(&store).await.remove(0);
        edited.notes = "needs a ride".to_owned();
        edited.no_show = true;
        edited.instructor_classes = vec![InstructorClass {
            class: 301,
            session: 2,
        }];
        let mut tx = store.begin().await.unwrap();
        tx.put(
            Collection::Participants,
            document(&edited, edited.key()).unwrap(),
        )
        .await
        .unwrap();
        tx.commit().await.unwrap();

        // unchanged feed fields, nothing to do
        let report = sync(&store, vec![participant("Ann", &[101])], &OPTIONS)
            .await
            .unwrap();
        assert_eq!(report.mutations(), 0);
        assert_eq!(stored(&store).await, vec![edited.clone()]);

        // changed feed fields, local fields kept
        let report = sync(&store, vec![participant("Ann", &[101, 401])], &OPTIONS)
            .await
            .unwrap();
        assert_eq!(report.updated, 1);
        let after = stored(&store).await.remove(0);
        assert_eq!(after.classes, vec![101, 401]);
        assert_eq!(after.notes, edited.notes);
        assert!(after.no_show);
        assert_eq!(after.instructor_classes, edited.instructor_classes);
    }

    #[tokio::test]
    async fn missing_records_are_deleted_and_new_ones_inserted() {
        let store = MemoryStore::new();
        sync(
            &store,
            vec![participant("Ann", &[]), participant("Bob", &[])],
            &OPTIONS,
        )
        .await
        .unwrap();

        let report = sync(
            &store,
            vec![participant("Bob", &[]), participant("Cat", &[])],
            &OPTIONS,
        )
        .await
        .unwrap();
        assert_eq!(
            report,
            SyncReport {
                inserted: 1,
                updated: 0,
                deleted: 1,
                unchanged: 1,
            }
        );
        let names: Vec<String> = stored(&store)
            .await
            .into_iter()
            .map(|p| p.first_name)
            .collect();
        assert_eq!(names.len(), 2);
        assert!(names.contains(&"Bob".to_owned()));
        assert!(names.contains(&"Cat".to_owned()));

        let again = sync(
            &store,
            vec![participant("Bob", &[]), participant("Cat", &[])],
            &OPTIONS,
        )
        .await
        .unwrap();
        assert_eq!(again.mutations(), 0);
    }

    #[tokio::test]
    async fn duplicate_rows_keep_the_later_one() {
        let store = MemoryStore::new();
        let report = sync(
            &store,
            vec![participant("Ann", &[101]), participant("Ann", &[201])],
            &OPTIONS,
        )
        .await
        .unwrap();
        assert_eq!(report.inserted, 1);
        assert_eq!(stored(&store).await[0].classes, vec![201]);
    }

    #[tokio::test]
    async fn small_batch_is_rejected_before_touching_the_store() {
        let store = MemoryStore::new();
        sync(&store, vec![participant("Ann", &[])], &OPTIONS)
            .await
            .unwrap();

        let err = sync::<Participant, _>(&store, Vec::new(), &SyncOptions { min_batch: 1 })
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AppError::BatchTooSmall {
                collection: "participants",
                size: 0,
                minimum: 1,
            }
        ));
        assert_eq!(stored(&store).await.len(), 1);
    }

    #[tokio::test]
    async fn repeated_rows_count_once_against_the_threshold() {
        let store = MemoryStore::new();
        let batch = vec![
            participant("Ann", &[]),
            participant("Ann", &[]),
            participant("Ann", &[]),
        ];

        let err = sync(&store, batch, &SyncOptions { min_batch: 2 })
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AppError::BatchTooSmall {
                size: 1,
                minimum: 2,
                ..
            }
        ));
        assert!(stored(&store).await.is_empty());
    }

    #[tokio::test]
    async fn failed_commit_persists_nothing() {
        let store = MemoryStore::new();
        sync(
            &store,
            vec![participant("Ann", &[]), participant("Bob", &[])],
            &OPTIONS,
        )
        .await
        .unwrap();
        let before = store.documents(Collection::Participants).await;

        store.fail_commits(true);
        let err = sync(
            &store,
            vec![participant("Bob", &[101]), participant("Cat", &[])],
            &OPTIONS,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::Database(_)));
        assert_eq!(store.documents(Collection::Participants).await, before);
    }

    #[tokio::test]
    async fn classes_reconcile_the_same_way() {
        let store = MemoryStore::new();
        let class = |number: i32, title: &str| Class {
            number,
            length: 1,
            title: title.to_owned(),
            ..Class::default()
        };
        sync(&store, vec![class(101, "Knots"), class(201, "Fire")], &OPTIONS)
            .await
            .unwrap();
        let report = sync(&store, vec![class(101, "Knots II")], &OPTIONS)
            .await
            .unwrap();
        assert_eq!(
            report,
            SyncReport {
                inserted: 0,
                updated: 1,
                deleted: 1,
                unchanged: 0,
            }
        );
        let documents = store.documents(Collection::Classes).await;
        assert_eq!(documents.len(), 1);
        assert_eq!(documents[0].id, "101");
        assert_eq!(documents[0].import_hash, import_hash(&class(101, "Knots II")));
    }
}
