use serde::{Deserialize, Serialize};
use std::fmt;

/// Functional state shared by `Usuario` and `CredencialAcceso`.
/// Persisted as the text values `ACTIVO` / `INACTIVO`.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum Estado {
    #[default]
    Activo,
    Inactivo,
}

#[derive(Debug, thiserror::Error)]
#[error("unknown estado value '{0}'")]
pub struct UnknownEstado(String);

impl Estado {
    pub fn db_value(self) -> &'static str {
        match self {
            Estado::Activo => "ACTIVO",
            Estado::Inactivo => "INACTIVO",
        }
    }

    /// Anything but the two known values is a corrupt row and fails the
    /// decode, like any other bad column.
    pub fn from_db(value: &str) -> Result<Self, UnknownEstado> {
        match value {
            "ACTIVO" => Ok(Estado::Activo),
            "INACTIVO" => Ok(Estado::Inactivo),
            other => Err(UnknownEstado(other.to_string())),
        }
    }
}

impl fmt::Display for Estado {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.db_value())
    }
}
