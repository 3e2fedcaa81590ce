use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::{Mutex, MutexGuard};
use tracing::debug;

use crate::{Collection, DatabaseError, Document, Store, Transaction};

type Documents = BTreeMap<(Collection, String), Document>;

/// Store backed by a map in memory. A transaction holds the lock until it is
/// committed or dropped, so transactions are fully serialized.
#[derive(Clone, Default)]
pub struct MemoryStore {
    documents: Arc<Mutex<Documents>>,
    fail_commits: Arc<AtomicBool>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every following commit fail with [`DatabaseError::CommitRejected`]
    /// until switched off again.
    pub fn fail_commits(&self, fail: bool) {
        self.fail_commits.store(fail, Ordering::SeqCst);
    }

    /// Committed documents of one collection, ordered by id.
    pub async fn documents(&self, collection: Collection) -> Vec<Document> {
        self.documents
            .lock()
            .await
            .iter()
            .filter(|((c, _), _)| *c == collection)
            .map(|(_, document)| document.clone())
            .collect()
    }
}

pub struct MemoryTransaction<'a> {
    guard: MutexGuard<'a, Documents>,
    working: Documents,
    fail_commit: bool,
}

impl Store for MemoryStore {
    type Transaction<'a> = MemoryTransaction<'a>;

    async fn begin(&self) -> Result<MemoryTransaction<'_>, DatabaseError> {
        let guard = self.documents.lock().await;
        let working = guard.clone();
        Ok(MemoryTransaction {
            guard,
            working,
            fail_commit: self.fail_commits.load(Ordering::SeqCst),
        })
    }
}

impl MemoryTransaction<'_> {
    fn scan(&self, collection: Collection) -> impl Iterator<Item = &Document> {
        self.working
            .iter()
            .filter(move |((c, _), _)| *c == collection)
            .map(|(_, document)| document)
    }
}

impl Transaction for MemoryTransaction<'_> {
    async fn keys(&mut self, collection: Collection) -> Result<Vec<String>, DatabaseError> {
        Ok(self.scan(collection).map(|document| document.id.clone()).collect())
    }

    async fn import_hashes(
        &mut self,
        collection: Collection,
    ) -> Result<Vec<(String, String)>, DatabaseError> {
        Ok(self
            .scan(collection)
            .map(|document| (document.id.clone(), document.import_hash.clone()))
            .collect())
    }

    async fn get(
        &mut self,
        collection: Collection,
        id: &str,
    ) -> Result<Option<Document>, DatabaseError> {
        Ok(self.working.get(&(collection, id.to_owned())).cloned())
    }

    async fn put(
        &mut self,
        collection: Collection,
        document: Document,
    ) -> Result<(), DatabaseError> {
        self.working
            .insert((collection, document.id.clone()), document);
        Ok(())
    }

    async fn delete(&mut self, collection: Collection, id: &str) -> Result<(), DatabaseError> {
        self.working.remove(&(collection, id.to_owned()));
        Ok(())
    }

    async fn commit(mut self) -> Result<(), DatabaseError> {
        if self.fail_commit {
            debug!("rejecting commit of memory transaction");
            return Err(DatabaseError::CommitRejected);
        }
        *self.guard = self.working;
        Ok(())
    }

    async fn rollback(self) -> Result<(), DatabaseError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn document(id: &str, hash: &str) -> Document {
        Document {
            id: id.to_owned(),
            import_hash: hash.to_owned(),
            body: format!("{{\"id\":\"{id}\"}}"),
        }
    }

    #[tokio::test]
    async fn committed_writes_are_visible_to_later_transactions() {
        let store = MemoryStore::new();
        let mut tx = store.begin().await.unwrap();
        tx.put(Collection::Classes, document("101", "a")).await.unwrap();
        tx.put(Collection::Participants, document("p1", "b"))
            .await
            .unwrap();
        tx.commit().await.unwrap();

        let mut tx = store.begin().await.unwrap();
        assert_eq!(tx.keys(Collection::Classes).await.unwrap(), vec!["101"]);
        assert_eq!(
            tx.import_hashes(Collection::Participants).await.unwrap(),
            vec![("p1".to_owned(), "b".to_owned())]
        );
        assert_eq!(
            tx.get(Collection::Classes, "101").await.unwrap(),
            Some(document("101", "a"))
        );
    }

    #[tokio::test]
    async fn missing_document_is_none() {
        let store = MemoryStore::new();
        let mut tx = store.begin().await.unwrap();
        assert_eq!(tx.get(Collection::Classes, "404").await.unwrap(), None);
    }

    #[tokio::test]
    async fn dropped_transaction_discards_writes() {
        let store = MemoryStore::new();
        {
            let mut tx = store.begin().await.unwrap();
            tx.put(Collection::Classes, document("101", "a")).await.unwrap();
        }
        assert!(store.documents(Collection::Classes).await.is_empty());
    }

    #[tokio::test]
    async fn rejected_commit_leaves_store_untouched() {
        let store = MemoryStore::new();
        let mut tx = store.begin().await.unwrap();
        tx.put(Collection::Classes, document("101", "a")).await.unwrap();
        tx.commit().await.unwrap();

        store.fail_commits(true);
        let mut tx = store.begin().await.unwrap();
        tx.delete(Collection::Classes, "101").await.unwrap();
        tx.put(Collection::Classes, document("201", "b")).await.unwrap();
        assert!(matches!(
            tx.commit().await,
            Err(DatabaseError::CommitRejected)
        ));

        assert_eq!(
            store.documents(Collection::Classes).await,
            vec![document("101", "a")]
        );
    }
}
