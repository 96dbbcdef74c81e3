use crate::domain_model::Usuario;
use crate::domain_port::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum CuentaError {
    /// Caller supplied invalid or missing required data. Raised before any
    /// connection is opened, never retried.
    #[error("validation: {0}")]
    Validation(String),
    /// A non-deleted user already holds the username or email.
    #[error("already exists: {0}")]
    AlreadyExists(String),
    /// Storage-layer failure, cause chain preserved.
    #[error("store: {0}")]
    Store(#[from] StoreError),
}

/// Plaintext credential material supplied at account creation. Consumed by
/// the security transform before any I/O; the persisted credential never
/// carries the plaintext.
#[derive(Debug, Clone)]
pub struct CredencialInput {
    pub password: String,
    pub requiere_reset: bool,
}

impl CredencialInput {
    pub fn new(password: impl Into<String>) -> Self {
        CredencialInput {
            password: password.into(),
            requiere_reset: false,
        }
    }
}

/// Login is fail-closed: each missing link in the lookup chain is a
/// distinct outcome, none of them an error.
#[derive(Debug, Clone)]
pub enum LoginOutcome {
    Success { usuario: Usuario },
    UserNotFound,
    NoCredential,
    BadPassword,
}

impl LoginOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, LoginOutcome::Success { .. })
    }
}

/// The four public account operations consumed by the surrounding
/// application.
#[async_trait::async_trait]
pub trait CuentaService: Send + Sync {
    /// Creates a user without credentials. Applies defaults (registration
    /// timestamp, ACTIVO state) and enforces username/email uniqueness.
    async fn create_usuario(&self, usuario: Usuario) -> Result<i64, CuentaError>;

    /// Creates the user and its credential as one atomic unit: on success
    /// both rows exist, on failure neither does. Returns the generated
    /// user id.
    async fn create_usuario_con_credencial(
        &self,
        usuario: Usuario,
        credencial: CredencialInput,
    ) -> Result<i64, CuentaError>;

    /// Verifies a plaintext password for `username`. On success the
    /// credential's last-session timestamp is advanced; on any failure
    /// nothing is written.
    async fn login(&self, username: &str, password: &str) -> Result<LoginOutcome, CuentaError>;

    /// Rotates the password for `usuario_id` through the secure stored
    /// procedure path: fresh salt, fresh hash, old pair discarded.
    async fn update_password(&self, usuario_id: i64, new_password: &str)
    -> Result<(), CuentaError>;
}
