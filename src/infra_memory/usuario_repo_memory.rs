use super::store::MemoryStore;
use super::util::downcast;
use crate::domain_model::Usuario;
use crate::domain_port::*;
use std::sync::Arc;

pub struct MemoryUsuarioRepo {
    store: Arc<MemoryStore>,
}

impl MemoryUsuarioRepo {
    pub fn new(store: Arc<MemoryStore>) -> Self {
        MemoryUsuarioRepo { store }
    }
}

#[async_trait::async_trait]
impl RecordStore<Usuario> for MemoryUsuarioRepo {
    async fn create(&self, record: &mut Usuario) -> Result<i64, StoreError> {
        self.store.with_state(|s| s.insert_usuario(record))
    }

    async fn create_in_tx<'t>(
        &self,
        tx: &mut dyn StorageTx<'t>,
        record: &mut Usuario,
    ) -> Result<i64, StoreError> {
        downcast(tx).state().insert_usuario(record)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Usuario>, StoreError> {
        Ok(self.store.with_state(|s| s.find_usuario(id)))
    }

    async fn find_by_id_in_tx<'t>(
        &self,
        tx: &mut dyn StorageTx<'t>,
        id: i64,
    ) -> Result<Option<Usuario>, StoreError> {
        Ok(downcast(tx).state().find_usuario(id))
    }

    async fn find_all(&self) -> Result<Vec<Usuario>, StoreError> {
        Ok(self.store.with_state(|s| s.all_usuarios()))
    }

    async fn find_all_in_tx<'t>(
        &self,
        tx: &mut dyn StorageTx<'t>,
    ) -> Result<Vec<Usuario>, StoreError> {
        Ok(downcast(tx).state().all_usuarios())
    }

    async fn update(&self, record: &Usuario) -> Result<(), StoreError> {
        self.store.with_state(|s| s.update_usuario(record))
    }

    async fn update_in_tx<'t>(
        &self,
        tx: &mut dyn StorageTx<'t>,
        record: &Usuario,
    ) -> Result<(), StoreError> {
        downcast(tx).state().update_usuario(record)
    }

    async fn soft_delete_by_id(&self, id: i64) -> Result<(), StoreError> {
        self.store.with_state(|s| s.soft_delete_usuario(id));
        Ok(())
    }

    async fn soft_delete_by_id_in_tx<'t>(
        &self,
        tx: &mut dyn StorageTx<'t>,
        id: i64,
    ) -> Result<(), StoreError> {
        downcast(tx).state().soft_delete_usuario(id);
        Ok(())
    }

    async fn delete_by_id(&self, id: i64) -> Result<(), StoreError> {
        self.store.with_state(|s| s.delete_usuario(id));
        Ok(())
    }

    async fn delete_by_id_in_tx<'t>(
        &self,
        tx: &mut dyn StorageTx<'t>,
        id: i64,
    ) -> Result<(), StoreError> {
        downcast(tx).state().delete_usuario(id);
        Ok(())
    }
}

#[async_trait::async_trait]
impl UsuarioRepo for MemoryUsuarioRepo {
    async fn find_by_username(&self, username: &str) -> Result<Option<Usuario>, StoreError> {
        Ok(self.store.with_state(|s| s.find_usuario_by_username(username)))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Usuario>, StoreError> {
        Ok(self.store.with_state(|s| s.find_usuario_by_email(email)))
    }
}
