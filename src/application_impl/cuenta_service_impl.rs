use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::*;
use crate::security;
use chrono::Utc;
use std::sync::Arc;
use tracing::warn;

const SALT_BYTES: usize = 16;

pub struct RealCuentaService {
    usuario_repo: Arc<dyn UsuarioRepo>,
    credencial_repo: Arc<dyn CredencialRepo>,
    tx_manager: Arc<dyn TxManager>,
}

impl RealCuentaService {
    pub fn new(
        usuario_repo: Arc<dyn UsuarioRepo>,
        credencial_repo: Arc<dyn CredencialRepo>,
        tx_manager: Arc<dyn TxManager>,
    ) -> Self {
        Self {
            usuario_repo,
            credencial_repo,
            tx_manager,
        }
    }

    /// Runs before any connection is opened.
    fn validate_usuario(usuario: &Usuario) -> Result<(), CuentaError> {
        if usuario.username.trim().is_empty() {
            return Err(CuentaError::Validation("username is required".into()));
        }
        if usuario.email.trim().is_empty() {
            return Err(CuentaError::Validation("email is required".into()));
        }
        Ok(())
    }

    fn apply_defaults(usuario: &mut Usuario) {
        if usuario.fecha_registro.is_none() {
            usuario.fecha_registro = Some(Utc::now());
        }
    }

    /// Business-rule uniqueness check. Races between the check and the
    /// insert are closed by the storage-layer unique constraints.
    async fn check_uniqueness(&self, usuario: &Usuario) -> Result<(), CuentaError> {
        if self
            .usuario_repo
            .find_by_username(&usuario.username)
            .await?
            .is_some()
        {
            return Err(CuentaError::AlreadyExists(format!(
                "username '{}'",
                usuario.username
            )));
        }
        if self
            .usuario_repo
            .find_by_email(&usuario.email)
            .await?
            .is_some()
        {
            return Err(CuentaError::AlreadyExists(format!(
                "email '{}'",
                usuario.email
            )));
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl CuentaService for RealCuentaService {
    async fn create_usuario(&self, mut usuario: Usuario) -> Result<i64, CuentaError> {
        Self::validate_usuario(&usuario)?;
        self.check_uniqueness(&usuario).await?;
        Self::apply_defaults(&mut usuario);

        let id = self.usuario_repo.create(&mut usuario).await?;
        Ok(id)
    }

    async fn create_usuario_con_credencial(
        &self,
        mut usuario: Usuario,
        credencial: CredencialInput,
    ) -> Result<i64, CuentaError> {
        Self::validate_usuario(&usuario)?;
        if credencial.password.trim().is_empty() {
            return Err(CuentaError::Validation("password is required".into()));
        }
        self.check_uniqueness(&usuario).await?;
        Self::apply_defaults(&mut usuario);

        // Security transform: the plaintext is consumed here and never
        // reaches the storage layer.
        let salt = security::generate_salt(SALT_BYTES);
        let hash = security::hash_password(&credencial.password, &salt);
        let mut cred = CredencialAcceso {
            hash_password: hash,
            salt,
            ultimo_cambio: Some(Utc::now()),
            requiere_reset: credencial.requiere_reset,
            ..Default::default()
        };
        drop(credencial);

        let mut tx = self
            .tx_manager
            .begin()
            .await
            .map_err(|e| StoreError::backend("begin user+credential transaction", e))?;

        // The user insert is strictly ordered before the credential insert:
        // the credential's FK needs the generated id.
        let outcome = match self.usuario_repo.create_in_tx(tx.as_mut(), &mut usuario).await {
            Ok(user_id) => {
                cred.usuario_id = user_id;
                self.credencial_repo
                    .create_in_tx(tx.as_mut(), &mut cred)
                    .await
                    .map(|_| user_id)
            }
            Err(e) => Err(e),
        };

        match outcome {
            Ok(user_id) => {
                // A commit failure is a storage failure: the caller may not
                // assume persistence even though both inserts succeeded.
                tx.commit()
                    .await
                    .map_err(|e| StoreError::backend("commit user+credential transaction", e))?;
                Ok(user_id)
            }
            Err(err) => {
                // The original error wins; a failing rollback is logged,
                // never propagated in its place.
                if let Err(rb_err) = tx.rollback().await {
                    warn!(error = %rb_err, "rollback failed after aborted user+credential create");
                }
                Err(err.into())
            }
        }
    }

    async fn login(&self, username: &str, password: &str) -> Result<LoginOutcome, CuentaError> {
        let Some(usuario) = self.usuario_repo.find_by_username(username).await? else {
            return Ok(LoginOutcome::UserNotFound);
        };
        let Some(user_id) = usuario.id else {
            return Ok(LoginOutcome::UserNotFound);
        };

        let Some(mut cred) = self.credencial_repo.find_by_usuario_id(user_id).await? else {
            return Ok(LoginOutcome::NoCredential);
        };

        if !security::validate_password(password, &cred.salt, &cred.hash_password) {
            return Ok(LoginOutcome::BadPassword);
        }

        // Written only on success; the asymmetry reveals nothing about
        // which check failed.
        cred.ultima_sesion = Some(Utc::now());
        self.credencial_repo.update(&cred).await?;

        Ok(LoginOutcome::Success { usuario })
    }

    async fn update_password(
        &self,
        usuario_id: i64,
        new_password: &str,
    ) -> Result<(), CuentaError> {
        if new_password.trim().is_empty() {
            return Err(CuentaError::Validation("password is required".into()));
        }
        if self
            .credencial_repo
            .find_by_usuario_id(usuario_id)
            .await?
            .is_none()
        {
            return Err(CuentaError::Validation(format!(
                "usuario {usuario_id} has no credential"
            )));
        }

        let salt = security::generate_salt(SALT_BYTES);
        let hash = security::hash_password(new_password, &salt);
        self.credencial_repo
            .update_password_secure(usuario_id, &hash, &salt)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra_memory::*;

    struct Harness {
        store: Arc<MemoryStore>,
        usuario_repo: Arc<dyn UsuarioRepo>,
        credencial_repo: Arc<dyn CredencialRepo>,
        service: RealCuentaService,
    }

    fn harness() -> Harness {
        let store = Arc::new(MemoryStore::default());
        let usuario_repo: Arc<dyn UsuarioRepo> = Arc::new(MemoryUsuarioRepo::new(store.clone()));
        let credencial_repo: Arc<dyn CredencialRepo> =
            Arc::new(MemoryCredencialRepo::new(store.clone()));
        let tx_manager: Arc<dyn TxManager> = Arc::new(MemoryTxManager::new(store.clone()));
        let service = RealCuentaService::new(
            usuario_repo.clone(),
            credencial_repo.clone(),
            tx_manager,
        );
        Harness {
            store,
            usuario_repo,
            credencial_repo,
            service,
        }
    }

    fn alice() -> Usuario {
        Usuario::new("alice", "alice@x.com")
    }

    #[tokio::test]
    async fn create_usuario_applies_defaults() {
        let h = harness();
        let id = h.service.create_usuario(alice()).await.unwrap();
        assert!(id > 0);

        let stored = h.usuario_repo.find_by_id(id).await.unwrap().unwrap();
        assert!(stored.fecha_registro.is_some());
        assert_eq!(stored.estado, Estado::Activo);
    }

    #[tokio::test]
    async fn create_usuario_rejects_blank_fields_before_io() {
        let h = harness();

        let err = h
            .service
            .create_usuario(Usuario::new("  ", "a@x.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, CuentaError::Validation(_)));

        let err = h
            .service
            .create_usuario(Usuario::new("alice", ""))
            .await
            .unwrap_err();
        assert!(matches!(err, CuentaError::Validation(_)));

        assert!(h.store.with_state(|s| s.raw_usuario_count()) == 0);
    }

    #[tokio::test]
    async fn create_usuario_rejects_duplicates() {
        let h = harness();
        h.service.create_usuario(alice()).await.unwrap();

        let err = h
            .service
            .create_usuario(Usuario::new("alice", "other@x.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, CuentaError::AlreadyExists(_)));

        let err = h
            .service
            .create_usuario(Usuario::new("other", "alice@x.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, CuentaError::AlreadyExists(_)));
    }

    #[tokio::test]
    async fn atomic_create_persists_user_and_credential() {
        let h = harness();
        let id = h
            .service
            .create_usuario_con_credencial(alice(), CredencialInput::new("hunter2"))
            .await
            .unwrap();
        assert!(id > 0);

        let usuario = h.usuario_repo.find_by_id(id).await.unwrap().unwrap();
        assert_eq!(usuario.username, "alice");

        let cred = h
            .credencial_repo
            .find_by_usuario_id(id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(cred.usuario_id, id);
        assert_ne!(cred.hash_password, "hunter2");
        assert!(!cred.salt.is_empty());
        assert!(security::validate_password(
            "hunter2",
            &cred.salt,
            &cred.hash_password
        ));
        assert!(cred.ultimo_cambio.is_some());
        assert_eq!(cred.estado, Estado::Activo);
    }

    #[tokio::test]
    async fn atomic_create_requires_password() {
        let h = harness();
        let err = h
            .service
            .create_usuario_con_credencial(alice(), CredencialInput::new("   "))
            .await
            .unwrap_err();
        assert!(matches!(err, CuentaError::Validation(_)));
        assert_eq!(h.store.with_state(|s| s.raw_usuario_count()), 0);
    }

    #[tokio::test]
    async fn atomic_create_rolls_back_when_credential_insert_fails() {
        let h = harness();

        // alice takes user id 1; the memory backend hands out ids
        // sequentially, so the next user gets id 2.
        h.service
            .create_usuario_con_credencial(alice(), CredencialInput::new("hunter2"))
            .await
            .unwrap();

        // Seed a conflicting credential for the id the next user will get,
        // forcing the second insert of the pair to hit the uniqueness
        // constraint mid-transaction.
        let mut squatter = CredencialAcceso {
            usuario_id: 2,
            hash_password: "h".into(),
            salt: "s".into(),
            ..Default::default()
        };
        h.credencial_repo.create(&mut squatter).await.unwrap();

        let err = h
            .service
            .create_usuario_con_credencial(
                Usuario::new("bob", "bob@x.com"),
                CredencialInput::new("secret"),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, CuentaError::Store(StoreError::Constraint(_))));

        // The user insert of step 1 must not have survived the rollback.
        assert!(
            h.usuario_repo
                .find_by_username("bob")
                .await
                .unwrap()
                .is_none()
        );
        assert_eq!(h.store.with_state(|s| s.raw_usuario_count()), 1);
    }

    #[tokio::test]
    async fn login_unknown_user_fails_closed() {
        let h = harness();
        let outcome = h.service.login("ghost", "whatever").await.unwrap();
        assert!(matches!(outcome, LoginOutcome::UserNotFound));
    }

    #[tokio::test]
    async fn login_without_credential_is_distinct_from_bad_password() {
        let h = harness();
        h.service.create_usuario(alice()).await.unwrap();

        let outcome = h.service.login("alice", "whatever").await.unwrap();
        assert!(matches!(outcome, LoginOutcome::NoCredential));
    }

    #[tokio::test]
    async fn login_wrong_password_leaves_session_timestamp_untouched() {
        let h = harness();
        let id = h
            .service
            .create_usuario_con_credencial(alice(), CredencialInput::new("hunter2"))
            .await
            .unwrap();

        let outcome = h.service.login("alice", "hunter3").await.unwrap();
        assert!(matches!(outcome, LoginOutcome::BadPassword));

        let cred = h
            .credencial_repo
            .find_by_usuario_id(id)
            .await
            .unwrap()
            .unwrap();
        assert!(cred.ultima_sesion.is_none());
    }

    #[tokio::test]
    async fn login_success_advances_session_timestamp() {
        let h = harness();
        let id = h
            .service
            .create_usuario_con_credencial(alice(), CredencialInput::new("hunter2"))
            .await
            .unwrap();

        let before = Utc::now();
        let outcome = h.service.login("alice", "hunter2").await.unwrap();
        assert!(outcome.is_success());

        let cred = h
            .credencial_repo
            .find_by_usuario_id(id)
            .await
            .unwrap()
            .unwrap();
        assert!(cred.ultima_sesion.unwrap() >= before);
    }

    #[tokio::test]
    async fn update_password_rotates_salt_and_hash() {
        let h = harness();
        let id = h
            .service
            .create_usuario_con_credencial(alice(), CredencialInput::new("hunter2"))
            .await
            .unwrap();
        let old = h
            .credencial_repo
            .find_by_usuario_id(id)
            .await
            .unwrap()
            .unwrap();

        h.service.update_password(id, "correct horse").await.unwrap();

        let rotated = h
            .credencial_repo
            .find_by_usuario_id(id)
            .await
            .unwrap()
            .unwrap();
        assert_ne!(rotated.salt, old.salt);
        assert_ne!(rotated.hash_password, old.hash_password);
        assert!(security::validate_password(
            "correct horse",
            &rotated.salt,
            &rotated.hash_password
        ));
        assert!(!security::validate_password(
            "hunter2",
            &rotated.salt,
            &rotated.hash_password
        ));

        assert!(!h.service.login("alice", "hunter2").await.unwrap().is_success());
        assert!(h.service.login("alice", "correct horse").await.unwrap().is_success());
    }

    #[tokio::test]
    async fn update_password_requires_existing_credential() {
        let h = harness();
        let id = h.service.create_usuario(alice()).await.unwrap();

        let err = h.service.update_password(id, "pw").await.unwrap_err();
        assert!(matches!(err, CuentaError::Validation(_)));

        let err = h.service.update_password(id, "  ").await.unwrap_err();
        assert!(matches!(err, CuentaError::Validation(_)));
    }
}
