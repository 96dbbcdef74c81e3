use super::store::{MemoryStore, StoreState};
use crate::domain_port::{StorageTx, TxManager};
use std::sync::Arc;

pub struct MemoryTxManager {
    store: Arc<MemoryStore>,
}

impl MemoryTxManager {
    pub fn new(store: Arc<MemoryStore>) -> Self {
        MemoryTxManager { store }
    }
}

#[async_trait::async_trait]
impl TxManager for MemoryTxManager {
    async fn begin<'t>(&'t self) -> anyhow::Result<Box<dyn StorageTx<'t> + 't>> {
        Ok(Box::new(MemoryTx {
            working: self.store.snapshot(),
            store: self.store.clone(),
        }))
    }
}

/// Snapshot transaction: all in-tx work mutates a private copy of the
/// state; commit publishes the copy, rollback (or drop) discards it.
pub struct MemoryTx {
    store: Arc<MemoryStore>,
    working: StoreState,
}

impl MemoryTx {
    pub fn state(&mut self) -> &mut StoreState {
        &mut self.working
    }
}

#[async_trait::async_trait]
impl<'t> StorageTx<'t> for MemoryTx {
    async fn commit(self: Box<Self>) -> anyhow::Result<()> {
        self.store.publish(self.working);
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> anyhow::Result<()> {
        Ok(())
    }
}
