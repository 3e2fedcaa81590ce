use diesel::prelude::*;
use diesel::upsert::excluded;
use diesel_async::pooled_connection::deadpool::{Object, Pool};
use diesel_async::{AnsiTransactionManager, AsyncPgConnection, RunQueryDsl, TransactionManager};
use tracing::debug;

use crate::schema::documents;
use crate::{get_database_connection, Collection, DatabaseError, Document, Store, Transaction};

/// Store backed by the `documents` table in postgres.
#[derive(Clone)]
pub struct PgStore {
    pool: Pool<AsyncPgConnection>,
}

impl PgStore {
    #[must_use]
    pub const fn new(pool: Pool<AsyncPgConnection>) -> Self {
        Self { pool }
    }

    pub fn connect(database_url: &str) -> Result<Self, DatabaseError> {
        Ok(Self::new(get_database_connection(database_url)?))
    }
}

/// Holds a pooled connection with an open transaction. If this is dropped
/// without commit the pool sees a connection stuck inside a transaction and
/// discards it, which rolls the transaction back server side.
pub struct PgTransaction {
    connection: Object<AsyncPgConnection>,
}

/// A sync reads the stored keys and hashes before writing, so a concurrent
/// sync must fail with a serialization error instead of interleaving.
const BEGIN_SQL: &str = "BEGIN ISOLATION LEVEL SERIALIZABLE";

impl Store for PgStore {
    type Transaction<'a> = PgTransaction;

    async fn begin(&self) -> Result<PgTransaction, DatabaseError> {
        let mut connection = self.pool.get().await?;
        AnsiTransactionManager::begin_transaction_sql(&mut *connection, BEGIN_SQL).await?;
        debug!("began postgres transaction");
        Ok(PgTransaction { connection })
    }
}

impl Transaction for PgTransaction {
    async fn keys(&mut self, collection: Collection) -> Result<Vec<String>, DatabaseError> {
        Ok(documents::table
            .filter(documents::collection.eq(collection.name()))
            .select(documents::id)
            .order(documents::id)
            .load::<String>(&mut *self.connection)
            .await?)
    }

    async fn import_hashes(
        &mut self,
        collection: Collection,
    ) -> Result<Vec<(String, String)>, DatabaseError> {
        Ok(documents::table
            .filter(documents::collection.eq(collection.name()))
            .select((documents::id, documents::import_hash))
            .order(documents::id)
            .load::<(String, String)>(&mut *self.connection)
            .await?)
    }

    async fn get(
        &mut self,
        collection: Collection,
        id: &str,
    ) -> Result<Option<Document>, DatabaseError> {
        let row = documents::table
            .filter(documents::collection.eq(collection.name()))
            .filter(documents::id.eq(id))
            .select((documents::id, documents::import_hash, documents::body))
            .first::<(String, String, String)>(&mut *self.connection)
            .await
            .optional()?;
        Ok(row.map(|(id, import_hash, body)| Document {
            id,
            import_hash,
            body,
        }))
    }

    async fn put(
        &mut self,
        collection: Collection,
        document: Document,
    ) -> Result<(), DatabaseError> {
        diesel::insert_into(documents::table)
            .values((
                documents::collection.eq(collection.name()),
                documents::id.eq(&document.id),
                documents::import_hash.eq(&document.import_hash),
                documents::body.eq(&document.body),
            ))
            .on_conflict((documents::collection, documents::id))
            .do_update()
            .set((
                documents::import_hash.eq(excluded(documents::import_hash)),
                documents::body.eq(excluded(documents::body)),
            ))
            .execute(&mut *self.connection)
            .await?;
        Ok(())
    }

    async fn delete(&mut self, collection: Collection, id: &str) -> Result<(), DatabaseError> {
        diesel::delete(
            documents::table
                .filter(documents::collection.eq(collection.name()))
                .filter(documents::id.eq(id)),
        )
        .execute(&mut *self.connection)
        .await?;
        Ok(())
    }

    async fn commit(mut self) -> Result<(), DatabaseError> {
        AnsiTransactionManager::commit_transaction(&mut *self.connection).await?;
        debug!("committed postgres transaction");
        Ok(())
    }

    async fn rollback(mut self) -> Result<(), DatabaseError> {
        AnsiTransactionManager::rollback_transaction(&mut *self.connection).await?;
        debug!("rolled back postgres transaction");
        Ok(())
    }
}
