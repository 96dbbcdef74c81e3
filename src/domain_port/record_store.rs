use crate::domain_port::StorageTx;

/// Storage-layer failure. Not-found is never an error; reads return
/// `Option` / empty collections instead.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A uniqueness constraint rejected the write (duplicate username,
    /// email or `usuario_id`).
    #[error("constraint violation: {0}")]
    Constraint(String),
    /// Any other backend failure, wrapped with operation context. The
    /// underlying cause stays on the chain for diagnostics.
    #[error("{context}")]
    Backend {
        context: String,
        #[source]
        source: anyhow::Error,
    },
}

impl StoreError {
    pub fn backend(context: impl Into<String>, source: impl Into<anyhow::Error>) -> Self {
        StoreError::Backend {
            context: context.into(),
            source: source.into(),
        }
    }
}

/// Generic CRUD contract for a single entity type.
///
/// Every operation exists in two invocation shapes:
/// - *standalone*: checks a connection out of the pool, runs the statement
///   and returns the connection — for operations that are not part of a
///   larger transaction.
/// - *`_in_tx`*: borrows a caller-owned [`StorageTx`] and runs on it
///   without acquiring or releasing anything, so several stores can share
///   one transaction.
///
/// Reads exclude soft-deleted rows and order by primary key. `create`
/// returns the generated id and writes it back onto the record. `update`
/// rewrites every mutable column keyed by primary key; there is no
/// partial-field patching.
#[async_trait::async_trait]
pub trait RecordStore<T: Send>: Send + Sync {
    async fn create(&self, record: &mut T) -> Result<i64, StoreError>;

    async fn create_in_tx<'t>(
        &self,
        tx: &mut dyn StorageTx<'t>,
        record: &mut T,
    ) -> Result<i64, StoreError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<T>, StoreError>;

    async fn find_by_id_in_tx<'t>(
        &self,
        tx: &mut dyn StorageTx<'t>,
        id: i64,
    ) -> Result<Option<T>, StoreError>;

    async fn find_all(&self) -> Result<Vec<T>, StoreError>;

    async fn find_all_in_tx<'t>(&self, tx: &mut dyn StorageTx<'t>) -> Result<Vec<T>, StoreError>;

    async fn update(&self, record: &T) -> Result<(), StoreError>;

    async fn update_in_tx<'t>(
        &self,
        tx: &mut dyn StorageTx<'t>,
        record: &T,
    ) -> Result<(), StoreError>;

    /// Flips the soft-delete flag; the row is retained and disappears from
    /// every read.
    async fn soft_delete_by_id(&self, id: i64) -> Result<(), StoreError>;

    async fn soft_delete_by_id_in_tx<'t>(
        &self,
        tx: &mut dyn StorageTx<'t>,
        id: i64,
    ) -> Result<(), StoreError>;

    /// Removes the row physically.
    async fn delete_by_id(&self, id: i64) -> Result<(), StoreError>;

    async fn delete_by_id_in_tx<'t>(
        &self,
        tx: &mut dyn StorageTx<'t>,
        id: i64,
    ) -> Result<(), StoreError>;
}
