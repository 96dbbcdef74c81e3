use super::Estado;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Authentication record, joined 1:1 to `Usuario` via `usuario_id`.
/// Holds only the derived hash/salt pair; the plaintext password never
/// enters this type. Both fields are produced together by the security
/// transform, so one is never persisted without the other.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CredencialAcceso {
    pub id: Option<i64>,
    pub eliminado: bool,
    pub usuario_id: i64,
    pub estado: Estado,
    pub ultima_sesion: Option<DateTime<Utc>>,
    pub hash_password: String,
    pub salt: String,
    pub ultimo_cambio: Option<DateTime<Utc>>,
    pub requiere_reset: bool,
}
