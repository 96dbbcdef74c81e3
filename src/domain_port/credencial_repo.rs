use crate::domain_model::CredencialAcceso;
use crate::domain_port::record_store::{RecordStore, StoreError};
use crate::domain_port::repo_tx::StorageTx;

#[async_trait::async_trait]
pub trait CredencialRepo: RecordStore<CredencialAcceso> {
    /// At most one non-deleted credential exists per user (1:1 invariant).
    async fn find_by_usuario_id(
        &self,
        usuario_id: i64,
    ) -> Result<Option<CredencialAcceso>, StoreError>;

    async fn find_by_usuario_id_in_tx<'t>(
        &self,
        tx: &mut dyn StorageTx<'t>,
        usuario_id: i64,
    ) -> Result<Option<CredencialAcceso>, StoreError>;

    /// Privileged password rotation. Routed through the
    /// `update_password_secure` stored procedure instead of the generic
    /// `update` path, so password changes stay auditable and isolated from
    /// full-row overwrites of unrelated fields.
    async fn update_password_secure(
        &self,
        usuario_id: i64,
        new_hash: &str,
        new_salt: &str,
    ) -> Result<(), StoreError>;

    async fn update_password_secure_in_tx<'t>(
        &self,
        tx: &mut dyn StorageTx<'t>,
        usuario_id: i64,
        new_hash: &str,
        new_salt: &str,
    ) -> Result<(), StoreError>;
}
