use crate::domain_model::Usuario;
use crate::domain_port::record_store::{RecordStore, StoreError};

#[async_trait::async_trait]
pub trait UsuarioRepo: RecordStore<Usuario> {
    /// Exact-match lookup, excludes soft-deleted rows.
    async fn find_by_username(&self, username: &str) -> Result<Option<Usuario>, StoreError>;

    /// Exact-match lookup, excludes soft-deleted rows.
    async fn find_by_email(&self, email: &str) -> Result<Option<Usuario>, StoreError>;
}
