use super::store::MemoryStore;
use super::util::downcast;
use crate::domain_model::CredencialAcceso;
use crate::domain_port::*;
use std::sync::Arc;

pub struct MemoryCredencialRepo {
    store: Arc<MemoryStore>,
}

impl MemoryCredencialRepo {
    pub fn new(store: Arc<MemoryStore>) -> Self {
        MemoryCredencialRepo { store }
    }
}

#[async_trait::async_trait]
impl RecordStore<CredencialAcceso> for MemoryCredencialRepo {
    async fn create(&self, record: &mut CredencialAcceso) -> Result<i64, StoreError> {
        self.store.with_state(|s| s.insert_credencial(record))
    }

    async fn create_in_tx<'t>(
        &self,
        tx: &mut dyn StorageTx<'t>,
        record: &mut CredencialAcceso,
    ) -> Result<i64, StoreError> {
        downcast(tx).state().insert_credencial(record)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<CredencialAcceso>, StoreError> {
        Ok(self.store.with_state(|s| s.find_credencial(id)))
    }

    async fn find_by_id_in_tx<'t>(
        &self,
        tx: &mut dyn StorageTx<'t>,
        id: i64,
    ) -> Result<Option<CredencialAcceso>, StoreError> {
        Ok(downcast(tx).state().find_credencial(id))
    }

    async fn find_all(&self) -> Result<Vec<CredencialAcceso>, StoreError> {
        Ok(self.store.with_state(|s| s.all_credenciales()))
    }

    async fn find_all_in_tx<'t>(
        &self,
        tx: &mut dyn StorageTx<'t>,
    ) -> Result<Vec<CredencialAcceso>, StoreError> {
        Ok(downcast(tx).state().all_credenciales())
    }

    async fn update(&self, record: &CredencialAcceso) -> Result<(), StoreError> {
        self.store.with_state(|s| s.update_credencial(record))
    }

    async fn update_in_tx<'t>(
        &self,
        tx: &mut dyn StorageTx<'t>,
        record: &CredencialAcceso,
    ) -> Result<(), StoreError> {
        downcast(tx).state().update_credencial(record)
    }

    async fn soft_delete_by_id(&self, id: i64) -> Result<(), StoreError> {
        self.store.with_state(|s| s.soft_delete_credencial(id));
        Ok(())
    }

    async fn soft_delete_by_id_in_tx<'t>(
        &self,
        tx: &mut dyn StorageTx<'t>,
        id: i64,
    ) -> Result<(), StoreError> {
        downcast(tx).state().soft_delete_credencial(id);
        Ok(())
    }

    async fn delete_by_id(&self, id: i64) -> Result<(), StoreError> {
        self.store.with_state(|s| s.delete_credencial(id));
        Ok(())
    }

    async fn delete_by_id_in_tx<'t>(
        &self,
        tx: &mut dyn StorageTx<'t>,
        id: i64,
    ) -> Result<(), StoreError> {
        downcast(tx).state().delete_credencial(id);
        Ok(())
    }
}

#[async_trait::async_trait]
impl CredencialRepo for MemoryCredencialRepo {
    async fn find_by_usuario_id(
        &self,
        usuario_id: i64,
    ) -> Result<Option<CredencialAcceso>, StoreError> {
        Ok(self
            .store
            .with_state(|s| s.find_credencial_by_usuario_id(usuario_id)))
    }

    async fn find_by_usuario_id_in_tx<'t>(
        &self,
        tx: &mut dyn StorageTx<'t>,
        usuario_id: i64,
    ) -> Result<Option<CredencialAcceso>, StoreError> {
        Ok(downcast(tx).state().find_credencial_by_usuario_id(usuario_id))
    }

    async fn update_password_secure(
        &self,
        usuario_id: i64,
        new_hash: &str,
        new_salt: &str,
    ) -> Result<(), StoreError> {
        self.store
            .with_state(|s| s.update_password(usuario_id, new_hash, new_salt));
        Ok(())
    }

    async fn update_password_secure_in_tx<'t>(
        &self,
        tx: &mut dyn StorageTx<'t>,
        usuario_id: i64,
        new_hash: &str,
        new_salt: &str,
    ) -> Result<(), StoreError> {
        downcast(tx)
            .state()
            .update_password(usuario_id, new_hash, new_salt);
        Ok(())
    }
}
