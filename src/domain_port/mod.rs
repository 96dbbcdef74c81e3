mod credencial_repo;
mod record_store;
mod repo_tx;
mod usuario_repo;

pub use credencial_repo::*;
pub use record_store::*;
pub use repo_tx::*;
pub use usuario_repo::*;
