use cuentas::application_impl::RealCuentaService;
use cuentas::application_port::CuentaService;
use cuentas::domain_port::{CredencialRepo, TxManager, UsuarioRepo};
use cuentas::infra_memory::{
    MemoryCredencialRepo, MemoryStore, MemoryTxManager, MemoryUsuarioRepo,
};
use cuentas::infra_mysql::{MySqlCredencialRepo, MySqlTxManager, MySqlUsuarioRepo};
use cuentas::logger::*;
use cuentas::settings::*;
use sqlx::mysql::MySqlPoolOptions;
use std::sync::Arc;

/// Composition root. Wires settings, the selected store backend and the
/// account service; the interactive front end consuming the service is a
/// separate concern and lives outside this crate.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let logger = Logger::new_bootstrap();

    let project_settings = parse_settings(cli.settings.as_deref())?;
    let logger_config = LogConfig {
        filter: project_settings.log.filter.clone(),
    };
    logger.reload_from_config(&logger_config)?;

    let (usuario_repo, credencial_repo, tx_manager): (
        Arc<dyn UsuarioRepo>,
        Arc<dyn CredencialRepo>,
        Arc<dyn TxManager>,
    ) = match project_settings.store.backend.as_str() {
        "memory" => {
            let store = Arc::new(MemoryStore::default());
            (
                Arc::new(MemoryUsuarioRepo::new(store.clone())),
                Arc::new(MemoryCredencialRepo::new(store.clone())),
                Arc::new(MemoryTxManager::new(store)),
            )
        }
        "mysql" => {
            let pool = MySqlPoolOptions::new()
                .max_connections(project_settings.database.max_connections)
                .connect(&project_settings.database.url)
                .await?;
            sqlx::query("SELECT 1").execute(&pool).await?;
            (
                Arc::new(MySqlUsuarioRepo::new(pool.clone())),
                Arc::new(MySqlCredencialRepo::new(pool.clone())),
                Arc::new(MySqlTxManager::new(pool)),
            )
        }
        other => return Err(anyhow::anyhow!("Unknown store backend: {}", other)),
    };

    let _service: Arc<dyn CuentaService> = Arc::new(RealCuentaService::new(
        usuario_repo,
        credencial_repo,
        tx_manager,
    ));

    info!(
        backend = %project_settings.store.backend,
        "cuentas service wired"
    );

    Ok(())
}
