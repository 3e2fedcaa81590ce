pub mod error;
pub mod memory;
pub mod postgres;
pub mod schema;

use diesel_async::pooled_connection::deadpool::Pool;
use diesel_async::pooled_connection::AsyncDieselConnectionManager;
use diesel_async::AsyncPgConnection;
pub use error::DatabaseError;
pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Record kinds kept in the document store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Collection {
    Participants,
    Classes,
    Conference,
    ClassEvaluations,
    ConferenceEvaluations,
}

impl Collection {
    /// Stable name used as the `collection` column. Never rename these.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Participants => "participants",
            Self::Classes => "classes",
            Self::Conference => "conference",
            Self::ClassEvaluations => "class_evaluations",
            Self::ConferenceEvaluations => "conference_evaluations",
        }
    }
}

/// One stored record. `body` is the serialized record, `import_hash` the
/// digest of its feed-owned fields (empty for locally created records).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub id: String,
    pub import_hash: String,
    pub body: String,
}

/// The capabilities the roster engine needs from a store. Everything happens
/// inside a [`Transaction`]; nothing is visible to other readers until
/// [`Transaction::commit`] succeeds.
#[allow(async_fn_in_trait)]
pub trait Store {
    type Transaction<'a>: Transaction
    where
        Self: 'a;

    async fn begin(&self) -> Result<Self::Transaction<'_>, DatabaseError>;
}

/// Dropping a transaction without committing discards its mutations.
#[allow(async_fn_in_trait)]
pub trait Transaction {
    /// Key-only scan.
    async fn keys(&mut self, collection: Collection) -> Result<Vec<String>, DatabaseError>;

    /// Projected scan returning `(id, import_hash)` pairs.
    async fn import_hashes(
        &mut self,
        collection: Collection,
    ) -> Result<Vec<(String, String)>, DatabaseError>;

    /// `Ok(None)` when no document is stored under `id`.
    async fn get(
        &mut self,
        collection: Collection,
        id: &str,
    ) -> Result<Option<Document>, DatabaseError>;

    /// Inserts or replaces.
    async fn put(&mut self, collection: Collection, document: Document)
        -> Result<(), DatabaseError>;

    async fn delete(&mut self, collection: Collection, id: &str) -> Result<(), DatabaseError>;

    async fn commit(self) -> Result<(), DatabaseError>;

    async fn rollback(self) -> Result<(), DatabaseError>;
}

// https://github.com/tokio-rs/axum/tree/main/examples/diesel-async-postgres

pub fn get_database_connection(
    database_url: &str,
) -> Result<Pool<AsyncPgConnection>, DatabaseError> {
    let config = AsyncDieselConnectionManager::<diesel_async::AsyncPgConnection>::new(database_url);
    Ok(Pool::builder(config).build()?)
}
