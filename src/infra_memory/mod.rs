mod credencial_repo_memory;
mod usuario_repo_memory;

pub use credencial_repo_memory::*;
pub use usuario_repo_memory::*;

mod repo_tx_memory;
mod store;

pub use repo_tx_memory::*;
pub use store::*;

mod util;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain_model::*;
    use crate::domain_port::*;
    use std::sync::Arc;

    fn harness() -> (Arc<MemoryStore>, MemoryUsuarioRepo, MemoryCredencialRepo, MemoryTxManager) {
        let store = Arc::new(MemoryStore::default());
        (
            store.clone(),
            MemoryUsuarioRepo::new(store.clone()),
            MemoryCredencialRepo::new(store.clone()),
            MemoryTxManager::new(store),
        )
    }

    fn usuario(username: &str, email: &str) -> Usuario {
        Usuario::new(username, email)
    }

    #[tokio::test]
    async fn create_writes_generated_id_back() {
        let (_, repo, _, _) = harness();
        let mut ana = usuario("ana", "ana@x.com");
        let id = repo.create(&mut ana).await.unwrap();
        assert!(id > 0);
        assert_eq!(ana.id, Some(id));
        assert!(ana.fecha_registro.is_some());
    }

    #[tokio::test]
    async fn find_all_orders_by_id_and_skips_soft_deleted() {
        let (_, repo, _, _) = harness();
        let mut a = usuario("ana", "ana@x.com");
        let mut b = usuario("bruno", "bruno@x.com");
        let mut c = usuario("carla", "carla@x.com");
        let id_a = repo.create(&mut a).await.unwrap();
        let id_b = repo.create(&mut b).await.unwrap();
        let id_c = repo.create(&mut c).await.unwrap();

        repo.soft_delete_by_id(id_b).await.unwrap();

        let all = repo.find_all().await.unwrap();
        let ids: Vec<i64> = all.iter().filter_map(|u| u.id).collect();
        assert_eq!(ids, vec![id_a, id_c]);
    }

    #[tokio::test]
    async fn soft_delete_hides_row_but_keeps_it() {
        let (store, repo, _, _) = harness();
        let mut ana = usuario("ana", "ana@x.com");
        let id = repo.create(&mut ana).await.unwrap();

        repo.soft_delete_by_id(id).await.unwrap();

        assert!(repo.find_by_id(id).await.unwrap().is_none());
        assert!(repo.find_by_username("ana").await.unwrap().is_none());
        assert_eq!(store.with_state(|s| s.raw_usuario_count()), 1);

        // The unique username stays occupied while the row is retained.
        let mut again = usuario("ana", "ana2@x.com");
        assert!(matches!(
            repo.create(&mut again).await,
            Err(StoreError::Constraint(_))
        ));
    }

    #[tokio::test]
    async fn hard_delete_frees_the_username() {
        let (store, repo, _, _) = harness();
        let mut ana = usuario("ana", "ana@x.com");
        let id = repo.create(&mut ana).await.unwrap();

        repo.delete_by_id(id).await.unwrap();
        assert_eq!(store.with_state(|s| s.raw_usuario_count()), 0);

        let mut again = usuario("ana", "ana@x.com");
        assert!(repo.create(&mut again).await.is_ok());
    }

    #[tokio::test]
    async fn update_rewrites_the_full_row() {
        let (_, repo, _, _) = harness();
        let mut ana = usuario("ana", "ana@x.com");
        let id = repo.create(&mut ana).await.unwrap();

        ana.nombre = "Ana".into();
        ana.apellido = "García".into();
        ana.estado = Estado::Inactivo;
        repo.update(&ana).await.unwrap();

        let stored = repo.find_by_id(id).await.unwrap().unwrap();
        assert_eq!(stored.nombre, "Ana");
        assert_eq!(stored.apellido, "García");
        assert_eq!(stored.estado, Estado::Inactivo);
    }

    #[tokio::test]
    async fn duplicate_credencial_per_user_is_rejected() {
        let (_, urepo, crepo, _) = harness();
        let mut ana = usuario("ana", "ana@x.com");
        let user_id = urepo.create(&mut ana).await.unwrap();

        let mut first = CredencialAcceso {
            usuario_id: user_id,
            hash_password: "h1".into(),
            salt: "s1".into(),
            ..Default::default()
        };
        crepo.create(&mut first).await.unwrap();

        let mut second = CredencialAcceso {
            usuario_id: user_id,
            hash_password: "h2".into(),
            salt: "s2".into(),
            ..Default::default()
        };
        assert!(matches!(
            crepo.create(&mut second).await,
            Err(StoreError::Constraint(_))
        ));

        // Soft-deleting the first frees the slot: the invariant is one
        // non-deleted credential per user.
        crepo.soft_delete_by_id(first.id.unwrap()).await.unwrap();
        assert!(crepo.create(&mut second).await.is_ok());
    }

    #[tokio::test]
    async fn tx_writes_are_visible_inside_and_gone_after_rollback() {
        let (_, urepo, _, txm) = harness();

        let mut tx = txm.begin().await.unwrap();
        let mut ana = usuario("ana", "ana@x.com");
        let id = urepo.create_in_tx(tx.as_mut(), &mut ana).await.unwrap();

        // Read-your-writes inside the transaction.
        let seen = urepo.find_by_id_in_tx(tx.as_mut(), id).await.unwrap();
        assert!(seen.is_some());
        assert_eq!(urepo.find_all_in_tx(tx.as_mut()).await.unwrap().len(), 1);

        // Not visible outside before commit.
        assert!(urepo.find_by_id(id).await.unwrap().is_none());

        tx.rollback().await.unwrap();
        assert!(urepo.find_by_id(id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn tx_commit_publishes_writes() {
        let (_, urepo, _, txm) = harness();

        let mut tx = txm.begin().await.unwrap();
        let mut ana = usuario("ana", "ana@x.com");
        let id = urepo.create_in_tx(tx.as_mut(), &mut ana).await.unwrap();
        tx.commit().await.unwrap();

        assert!(urepo.find_by_id(id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn update_password_secure_swaps_hash_and_salt() {
        let (_, urepo, crepo, _) = harness();
        let mut ana = usuario("ana", "ana@x.com");
        let user_id = urepo.create(&mut ana).await.unwrap();

        let mut cred = CredencialAcceso {
            usuario_id: user_id,
            hash_password: "old-hash".into(),
            salt: "old-salt".into(),
            requiere_reset: true,
            ..Default::default()
        };
        crepo.create(&mut cred).await.unwrap();

        crepo
            .update_password_secure(user_id, "new-hash", "new-salt")
            .await
            .unwrap();

        let stored = crepo.find_by_usuario_id(user_id).await.unwrap().unwrap();
        assert_eq!(stored.hash_password, "new-hash");
        assert_eq!(stored.salt, "new-salt");
        assert!(!stored.requiere_reset);
        assert!(stored.ultimo_cambio.is_some());
    }
}
