use super::Estado;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identity record. `id` is `None` until the row has been persisted;
/// `create` writes the generated key back onto the record.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Usuario {
    pub id: Option<i64>,
    pub eliminado: bool,
    pub username: String,
    pub nombre: String,
    pub apellido: String,
    pub email: String,
    /// Set once; the store assigns `now` when absent at create time.
    pub fecha_registro: Option<DateTime<Utc>>,
    pub activo: bool,
    pub estado: Estado,
}

impl Usuario {
    pub fn new(username: impl Into<String>, email: impl Into<String>) -> Self {
        Usuario {
            username: username.into(),
            email: email.into(),
            activo: true,
            ..Default::default()
        }
    }
}
