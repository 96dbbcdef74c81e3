use super::util::{downcast, store_err};
use crate::domain_model::*;
use crate::domain_port::*;
use chrono::{DateTime, Utc};
use sqlx::mysql::MySqlRow;
use sqlx::{Executor, MySql, MySqlPool, Row};

pub struct MySqlCredencialRepo {
    pool: MySqlPool,
}

impl MySqlCredencialRepo {
    pub fn new(pool: MySqlPool) -> Self {
        MySqlCredencialRepo { pool }
    }

    fn row_to_credencial(row: &MySqlRow) -> Result<CredencialAcceso, sqlx::Error> {
        let estado: String = row.try_get("estado")?;
        let estado = Estado::from_db(&estado).map_err(|e| sqlx::Error::ColumnDecode {
            index: "estado".into(),
            source: Box::new(e),
        })?;
        Ok(CredencialAcceso {
            id: Some(row.try_get::<i64, _>("id")?),
            eliminado: row.try_get("eliminado")?,
            usuario_id: row.try_get("usuario_id")?,
            estado,
            ultima_sesion: row.try_get::<Option<DateTime<Utc>>, _>("ultima_sesion")?,
            hash_password: row.try_get("hash_password")?,
            salt: row.try_get("salt")?,
            ultimo_cambio: row.try_get::<Option<DateTime<Utc>>, _>("ultimo_cambio")?,
            requiere_reset: row.try_get("requiere_reset")?,
        })
    }

    async fn insert_on<'e, E>(
        &self,
        ex: E,
        credencial: &mut CredencialAcceso,
    ) -> Result<i64, sqlx::Error>
    where
        E: Executor<'e, Database = MySql>,
    {
        let result = sqlx::query(
            r#"
INSERT INTO credencial_acceso
    (eliminado, usuario_id, estado, ultima_sesion, hash_password, salt, ultimo_cambio, requiere_reset)
VALUES (?, ?, ?, ?, ?, ?, ?, ?)
"#,
        )
        .bind(credencial.eliminado)
        .bind(credencial.usuario_id)
        .bind(credencial.estado.db_value())
        .bind(credencial.ultima_sesion)
        .bind(&credencial.hash_password)
        .bind(&credencial.salt)
        .bind(credencial.ultimo_cambio)
        .bind(credencial.requiere_reset)
        .execute(ex)
        .await?;

        let id = result.last_insert_id() as i64;
        credencial.id = Some(id);
        Ok(id)
    }

    async fn select_by_id_on<'e, E>(
        &self,
        ex: E,
        id: i64,
    ) -> Result<Option<CredencialAcceso>, sqlx::Error>
    where
        E: Executor<'e, Database = MySql>,
    {
        sqlx::query("SELECT * FROM credencial_acceso WHERE id = ? AND eliminado = FALSE")
            .bind(id)
            .fetch_optional(ex)
            .await?
            .map(|row| Self::row_to_credencial(&row))
            .transpose()
    }

    async fn select_by_usuario_id_on<'e, E>(
        &self,
        ex: E,
        usuario_id: i64,
    ) -> Result<Option<CredencialAcceso>, sqlx::Error>
    where
        E: Executor<'e, Database = MySql>,
    {
        sqlx::query("SELECT * FROM credencial_acceso WHERE usuario_id = ? AND eliminado = FALSE")
            .bind(usuario_id)
            .fetch_optional(ex)
            .await?
            .map(|row| Self::row_to_credencial(&row))
            .transpose()
    }

    async fn update_on<'e, E>(&self, ex: E, credencial: &CredencialAcceso) -> Result<(), sqlx::Error>
    where
        E: Executor<'e, Database = MySql>,
    {
        let id = credencial.id.ok_or(sqlx::Error::RowNotFound)?;

        sqlx::query(
            r#"
UPDATE credencial_acceso
SET eliminado = ?, usuario_id = ?, estado = ?, ultima_sesion = ?,
    hash_password = ?, salt = ?, ultimo_cambio = ?, requiere_reset = ?
WHERE id = ?
"#,
        )
        .bind(credencial.eliminado)
        .bind(credencial.usuario_id)
        .bind(credencial.estado.db_value())
        .bind(credencial.ultima_sesion)
        .bind(&credencial.hash_password)
        .bind(&credencial.salt)
        .bind(credencial.ultimo_cambio)
        .bind(credencial.requiere_reset)
        .bind(id)
        .execute(ex)
        .await?;

        Ok(())
    }

    async fn soft_delete_on<'e, E>(&self, ex: E, id: i64) -> Result<(), sqlx::Error>
    where
        E: Executor<'e, Database = MySql>,
    {
        sqlx::query("UPDATE credencial_acceso SET eliminado = TRUE WHERE id = ?")
            .bind(id)
            .execute(ex)
            .await?;
        Ok(())
    }

    async fn delete_on<'e, E>(&self, ex: E, id: i64) -> Result<(), sqlx::Error>
    where
        E: Executor<'e, Database = MySql>,
    {
        sqlx::query("DELETE FROM credencial_acceso WHERE id = ?")
            .bind(id)
            .execute(ex)
            .await?;
        Ok(())
    }

    async fn call_update_password_on<'e, E>(
        &self,
        ex: E,
        usuario_id: i64,
        new_hash: &str,
        new_salt: &str,
    ) -> Result<(), sqlx::Error>
    where
        E: Executor<'e, Database = MySql>,
    {
        sqlx::query("CALL update_password_secure(?, ?, ?)")
            .bind(usuario_id)
            .bind(new_hash)
            .bind(new_salt)
            .execute(ex)
            .await?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl RecordStore<CredencialAcceso> for MySqlCredencialRepo {
    async fn create(&self, record: &mut CredencialAcceso) -> Result<i64, StoreError> {
        let usuario_id = record.usuario_id;
        self.insert_on(&self.pool, record)
            .await
            .map_err(|e| store_err(format!("create credencial for usuario_id={usuario_id}"), e))
    }

    async fn create_in_tx<'t>(
        &self,
        tx: &mut dyn StorageTx<'t>,
        record: &mut CredencialAcceso,
    ) -> Result<i64, StoreError> {
        let tx = downcast(tx);
        self.insert_on(tx.conn(), record)
            .await
            .map_err(|e| store_err("create credencial", e))
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<CredencialAcceso>, StoreError> {
        self.select_by_id_on(&self.pool, id)
            .await
            .map_err(|e| store_err(format!("find credencial by id={id}"), e))
    }

    async fn find_by_id_in_tx<'t>(
        &self,
        tx: &mut dyn StorageTx<'t>,
        id: i64,
    ) -> Result<Option<CredencialAcceso>, StoreError> {
        let tx = downcast(tx);
        self.select_by_id_on(tx.conn(), id)
            .await
            .map_err(|e| store_err("find credencial by id", e))
    }

    async fn find_all(&self) -> Result<Vec<CredencialAcceso>, StoreError> {
        let rows = sqlx::query("SELECT * FROM credencial_acceso WHERE eliminado = FALSE ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| store_err("list credenciales", e))?;
        rows.iter()
            .map(Self::row_to_credencial)
            .collect::<Result<_, _>>()
            .map_err(|e| store_err("decode credencial row", e))
    }

    async fn find_all_in_tx<'t>(
        &self,
        tx: &mut dyn StorageTx<'t>,
    ) -> Result<Vec<CredencialAcceso>, StoreError> {
        let tx = downcast(tx);
        let rows = sqlx::query("SELECT * FROM credencial_acceso WHERE eliminado = FALSE ORDER BY id")
            .fetch_all(tx.conn())
            .await
            .map_err(|e| store_err("list credenciales", e))?;
        rows.iter()
            .map(Self::row_to_credencial)
            .collect::<Result<_, _>>()
            .map_err(|e| store_err("decode credencial row", e))
    }

    async fn update(&self, record: &CredencialAcceso) -> Result<(), StoreError> {
        self.update_on(&self.pool, record)
            .await
            .map_err(|e| store_err(format!("update credencial id={:?}", record.id), e))
    }

    async fn update_in_tx<'t>(
        &self,
        tx: &mut dyn StorageTx<'t>,
        record: &CredencialAcceso,
    ) -> Result<(), StoreError> {
        let tx = downcast(tx);
        self.update_on(tx.conn(), record)
            .await
            .map_err(|e| store_err("update credencial", e))
    }

    async fn soft_delete_by_id(&self, id: i64) -> Result<(), StoreError> {
        self.soft_delete_on(&self.pool, id)
            .await
            .map_err(|e| store_err(format!("soft-delete credencial id={id}"), e))
    }

    async fn soft_delete_by_id_in_tx<'t>(
        &self,
        tx: &mut dyn StorageTx<'t>,
        id: i64,
    ) -> Result<(), StoreError> {
        let tx = downcast(tx);
        self.soft_delete_on(tx.conn(), id)
            .await
            .map_err(|e| store_err("soft-delete credencial", e))
    }

    async fn delete_by_id(&self, id: i64) -> Result<(), StoreError> {
        self.delete_on(&self.pool, id)
            .await
            .map_err(|e| store_err(format!("delete credencial id={id}"), e))
    }

    async fn delete_by_id_in_tx<'t>(
        &self,
        tx: &mut dyn StorageTx<'t>,
        id: i64,
    ) -> Result<(), StoreError> {
        let tx = downcast(tx);
        self.delete_on(tx.conn(), id)
            .await
            .map_err(|e| store_err("delete credencial", e))
    }
}

#[async_trait::async_trait]
impl CredencialRepo for MySqlCredencialRepo {
    async fn find_by_usuario_id(
        &self,
        usuario_id: i64,
    ) -> Result<Option<CredencialAcceso>, StoreError> {
        self.select_by_usuario_id_on(&self.pool, usuario_id)
            .await
            .map_err(|e| store_err(format!("find credencial by usuario_id={usuario_id}"), e))
    }

    async fn find_by_usuario_id_in_tx<'t>(
        &self,
        tx: &mut dyn StorageTx<'t>,
        usuario_id: i64,
    ) -> Result<Option<CredencialAcceso>, StoreError> {
        let tx = downcast(tx);
        self.select_by_usuario_id_on(tx.conn(), usuario_id)
            .await
            .map_err(|e| store_err("find credencial by usuario_id", e))
    }

    async fn update_password_secure(
        &self,
        usuario_id: i64,
        new_hash: &str,
        new_salt: &str,
    ) -> Result<(), StoreError> {
        self.call_update_password_on(&self.pool, usuario_id, new_hash, new_salt)
            .await
            .map_err(|e| store_err(format!("update password for usuario_id={usuario_id}"), e))
    }

    async fn update_password_secure_in_tx<'t>(
        &self,
        tx: &mut dyn StorageTx<'t>,
        usuario_id: i64,
        new_hash: &str,
        new_salt: &str,
    ) -> Result<(), StoreError> {
        let tx = downcast(tx);
        self.call_update_password_on(tx.conn(), usuario_id, new_hash, new_salt)
            .await
            .map_err(|e| store_err("update password", e))
    }
}
