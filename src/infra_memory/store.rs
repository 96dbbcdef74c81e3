use crate::domain_model::*;
use crate::domain_port::StoreError;
use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::{Mutex, PoisonError};

/// Backing state for the in-memory backend. Keyed by surrogate id, so
/// iteration order matches the primary-key ordering the MySQL backend gets
/// from `ORDER BY id`.
#[derive(Debug, Clone)]
pub struct StoreState {
    usuarios: BTreeMap<i64, Usuario>,
    credenciales: BTreeMap<i64, CredencialAcceso>,
    next_usuario_id: i64,
    next_credencial_id: i64,
}

impl Default for StoreState {
    fn default() -> Self {
        StoreState {
            usuarios: BTreeMap::new(),
            credenciales: BTreeMap::new(),
            next_usuario_id: 1,
            next_credencial_id: 1,
        }
    }
}

impl StoreState {
    // usuario -----------------------------------------------------------

    /// Mirrors the UNIQUE(username) / UNIQUE(email) columns: soft-deleted
    /// rows still occupy their values, only a hard delete frees them.
    pub fn insert_usuario(&mut self, usuario: &mut Usuario) -> Result<i64, StoreError> {
        if self.usuarios.values().any(|u| u.username == usuario.username) {
            return Err(StoreError::Constraint(format!(
                "duplicate username '{}'",
                usuario.username
            )));
        }
        if self.usuarios.values().any(|u| u.email == usuario.email) {
            return Err(StoreError::Constraint(format!(
                "duplicate email '{}'",
                usuario.email
            )));
        }

        if usuario.fecha_registro.is_none() {
            usuario.fecha_registro = Some(Utc::now());
        }

        let id = self.next_usuario_id;
        self.next_usuario_id += 1;
        usuario.id = Some(id);
        self.usuarios.insert(id, usuario.clone());
        Ok(id)
    }

    pub fn find_usuario(&self, id: i64) -> Option<Usuario> {
        self.usuarios.get(&id).filter(|u| !u.eliminado).cloned()
    }

    pub fn all_usuarios(&self) -> Vec<Usuario> {
        self.usuarios
            .values()
            .filter(|u| !u.eliminado)
            .cloned()
            .collect()
    }

    pub fn update_usuario(&mut self, usuario: &Usuario) -> Result<(), StoreError> {
        let id = usuario
            .id
            .ok_or_else(|| StoreError::backend("update usuario", anyhow::anyhow!("missing id")))?;
        if let Some(slot) = self.usuarios.get_mut(&id) {
            *slot = usuario.clone();
        }
        Ok(())
    }

    pub fn soft_delete_usuario(&mut self, id: i64) {
        if let Some(u) = self.usuarios.get_mut(&id) {
            u.eliminado = true;
        }
    }

    pub fn delete_usuario(&mut self, id: i64) {
        self.usuarios.remove(&id);
    }

    pub fn find_usuario_by_username(&self, username: &str) -> Option<Usuario> {
        self.usuarios
            .values()
            .find(|u| !u.eliminado && u.username == username)
            .cloned()
    }

    pub fn find_usuario_by_email(&self, email: &str) -> Option<Usuario> {
        self.usuarios
            .values()
            .find(|u| !u.eliminado && u.email == email)
            .cloned()
    }

    // credencial --------------------------------------------------------

    pub fn insert_credencial(
        &mut self,
        credencial: &mut CredencialAcceso,
    ) -> Result<i64, StoreError> {
        if self
            .credenciales
            .values()
            .any(|c| !c.eliminado && c.usuario_id == credencial.usuario_id)
        {
            return Err(StoreError::Constraint(format!(
                "duplicate credencial for usuario_id={}",
                credencial.usuario_id
            )));
        }

        let id = self.next_credencial_id;
        self.next_credencial_id += 1;
        credencial.id = Some(id);
        self.credenciales.insert(id, credencial.clone());
        Ok(id)
    }

    pub fn find_credencial(&self, id: i64) -> Option<CredencialAcceso> {
        self.credenciales.get(&id).filter(|c| !c.eliminado).cloned()
    }

    pub fn all_credenciales(&self) -> Vec<CredencialAcceso> {
        self.credenciales
            .values()
            .filter(|c| !c.eliminado)
            .cloned()
            .collect()
    }

    pub fn update_credencial(&mut self, credencial: &CredencialAcceso) -> Result<(), StoreError> {
        let id = credencial.id.ok_or_else(|| {
            StoreError::backend("update credencial", anyhow::anyhow!("missing id"))
        })?;
        if let Some(slot) = self.credenciales.get_mut(&id) {
            *slot = credencial.clone();
        }
        Ok(())
    }

    pub fn soft_delete_credencial(&mut self, id: i64) {
        if let Some(c) = self.credenciales.get_mut(&id) {
            c.eliminado = true;
        }
    }

    pub fn delete_credencial(&mut self, id: i64) {
        self.credenciales.remove(&id);
    }

    pub fn find_credencial_by_usuario_id(&self, usuario_id: i64) -> Option<CredencialAcceso> {
        self.credenciales
            .values()
            .find(|c| !c.eliminado && c.usuario_id == usuario_id)
            .cloned()
    }

    /// In-memory counterpart of the `update_password_secure` stored
    /// procedure: swaps the hash/salt pair, stamps the change time and
    /// clears the reset flag.
    pub fn update_password(&mut self, usuario_id: i64, new_hash: &str, new_salt: &str) {
        if let Some(c) = self
            .credenciales
            .values_mut()
            .find(|c| !c.eliminado && c.usuario_id == usuario_id)
        {
            c.hash_password = new_hash.to_string();
            c.salt = new_salt.to_string();
            c.ultimo_cambio = Some(Utc::now());
            c.requiere_reset = false;
        }
    }

    /// Raw row count, soft-deleted included. Lets tests tell a soft delete
    /// (row retained) apart from a hard delete (row gone).
    pub fn raw_usuario_count(&self) -> usize {
        self.usuarios.len()
    }

    pub fn raw_credencial_count(&self) -> usize {
        self.credenciales.len()
    }
}

/// Shared in-memory backend. Standalone operations lock the live state;
/// transactions clone it and publish the clone on commit, so an aborted
/// transaction leaves no trace.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<StoreState>,
}

impl MemoryStore {
    pub fn with_state<R>(&self, f: impl FnOnce(&mut StoreState) -> R) -> R {
        let mut guard = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard)
    }

    pub fn snapshot(&self) -> StoreState {
        self.with_state(|s| s.clone())
    }

    pub fn publish(&self, state: StoreState) {
        self.with_state(|s| *s = state);
    }
}
