mod credencial_repo_mysql;
mod usuario_repo_mysql;

pub use credencial_repo_mysql::*;
pub use usuario_repo_mysql::*;

mod repo_tx_mysql;

pub use repo_tx_mysql::*;

mod util;
