use super::util::{downcast, store_err};
use crate::domain_model::*;
use crate::domain_port::*;
use chrono::{DateTime, Utc};
use sqlx::mysql::MySqlRow;
use sqlx::{Executor, MySql, MySqlPool, Row};

pub struct MySqlUsuarioRepo {
    pool: MySqlPool,
}

impl MySqlUsuarioRepo {
    pub fn new(pool: MySqlPool) -> Self {
        MySqlUsuarioRepo { pool }
    }

    fn row_to_usuario(row: &MySqlRow) -> Result<Usuario, sqlx::Error> {
        let estado: String = row.try_get("estado")?;
        let estado = Estado::from_db(&estado).map_err(|e| sqlx::Error::ColumnDecode {
            index: "estado".into(),
            source: Box::new(e),
        })?;
        Ok(Usuario {
            id: Some(row.try_get::<i64, _>("id")?),
            eliminado: row.try_get("eliminado")?,
            username: row.try_get("username")?,
            nombre: row.try_get("nombre")?,
            apellido: row.try_get("apellido")?,
            email: row.try_get("email")?,
            fecha_registro: row.try_get::<Option<DateTime<Utc>>, _>("fecha_registro")?,
            activo: row.try_get("activo")?,
            estado,
        })
    }

    async fn insert_on<'e, E>(&self, ex: E, usuario: &mut Usuario) -> Result<i64, sqlx::Error>
    where
        E: Executor<'e, Database = MySql>,
    {
        // The registration timestamp is set once; absent means server-assigned.
        if usuario.fecha_registro.is_none() {
            usuario.fecha_registro = Some(Utc::now());
        }

        let result = sqlx::query(
            r#"
INSERT INTO usuario (eliminado, username, nombre, apellido, email, fecha_registro, activo, estado)
VALUES (?, ?, ?, ?, ?, ?, ?, ?)
"#,
        )
        .bind(usuario.eliminado)
        .bind(&usuario.username)
        .bind(&usuario.nombre)
        .bind(&usuario.apellido)
        .bind(&usuario.email)
        .bind(usuario.fecha_registro)
        .bind(usuario.activo)
        .bind(usuario.estado.db_value())
        .execute(ex)
        .await?;

        let id = result.last_insert_id() as i64;
        usuario.id = Some(id);
        Ok(id)
    }

    async fn select_by_id_on<'e, E>(&self, ex: E, id: i64) -> Result<Option<Usuario>, sqlx::Error>
    where
        E: Executor<'e, Database = MySql>,
    {
        sqlx::query("SELECT * FROM usuario WHERE id = ? AND eliminado = FALSE")
            .bind(id)
            .fetch_optional(ex)
            .await?
            .map(|row| Self::row_to_usuario(&row))
            .transpose()
    }

    async fn select_all_on<'e, E>(&self, ex: E) -> Result<Vec<Usuario>, sqlx::Error>
    where
        E: Executor<'e, Database = MySql>,
    {
        let rows = sqlx::query("SELECT * FROM usuario WHERE eliminado = FALSE ORDER BY id")
            .fetch_all(ex)
            .await?;
        rows.iter().map(Self::row_to_usuario).collect()
    }

    async fn update_on<'e, E>(&self, ex: E, usuario: &Usuario) -> Result<(), sqlx::Error>
    where
        E: Executor<'e, Database = MySql>,
    {
        let id = usuario.id.ok_or_else(|| sqlx::Error::RowNotFound)?;

        sqlx::query(
            r#"
UPDATE usuario
SET eliminado = ?, username = ?, nombre = ?, apellido = ?, email = ?, activo = ?, estado = ?
WHERE id = ?
"#,
        )
        .bind(usuario.eliminado)
        .bind(&usuario.username)
        .bind(&usuario.nombre)
        .bind(&usuario.apellido)
        .bind(&usuario.email)
        .bind(usuario.activo)
        .bind(usuario.estado.db_value())
        .bind(id)
        .execute(ex)
        .await?;

        Ok(())
    }

    async fn soft_delete_on<'e, E>(&self, ex: E, id: i64) -> Result<(), sqlx::Error>
    where
        E: Executor<'e, Database = MySql>,
    {
        sqlx::query("UPDATE usuario SET eliminado = TRUE WHERE id = ?")
            .bind(id)
            .execute(ex)
            .await?;
        Ok(())
    }

    async fn delete_on<'e, E>(&self, ex: E, id: i64) -> Result<(), sqlx::Error>
    where
        E: Executor<'e, Database = MySql>,
    {
        sqlx::query("DELETE FROM usuario WHERE id = ?")
            .bind(id)
            .execute(ex)
            .await?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl RecordStore<Usuario> for MySqlUsuarioRepo {
    async fn create(&self, record: &mut Usuario) -> Result<i64, StoreError> {
        let username = record.username.clone();
        self.insert_on(&self.pool, record)
            .await
            .map_err(|e| store_err(format!("create usuario '{username}'"), e))
    }

    async fn create_in_tx<'t>(
        &self,
        tx: &mut dyn StorageTx<'t>,
        record: &mut Usuario,
    ) -> Result<i64, StoreError> {
        let tx = downcast(tx);
        self.insert_on(tx.conn(), record)
            .await
            .map_err(|e| store_err("create usuario", e))
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Usuario>, StoreError> {
        self.select_by_id_on(&self.pool, id)
            .await
            .map_err(|e| store_err(format!("find usuario by id={id}"), e))
    }

    async fn find_by_id_in_tx<'t>(
        &self,
        tx: &mut dyn StorageTx<'t>,
        id: i64,
    ) -> Result<Option<Usuario>, StoreError> {
        let tx = downcast(tx);
        self.select_by_id_on(tx.conn(), id)
            .await
            .map_err(|e| store_err("find usuario by id", e))
    }

    async fn find_all(&self) -> Result<Vec<Usuario>, StoreError> {
        self.select_all_on(&self.pool)
            .await
            .map_err(|e| store_err("list usuarios", e))
    }

    async fn find_all_in_tx<'t>(
        &self,
        tx: &mut dyn StorageTx<'t>,
    ) -> Result<Vec<Usuario>, StoreError> {
        let tx = downcast(tx);
        self.select_all_on(tx.conn())
            .await
            .map_err(|e| store_err("list usuarios", e))
    }

    async fn update(&self, record: &Usuario) -> Result<(), StoreError> {
        self.update_on(&self.pool, record)
            .await
            .map_err(|e| store_err(format!("update usuario id={:?}", record.id), e))
    }

    async fn update_in_tx<'t>(
        &self,
        tx: &mut dyn StorageTx<'t>,
        record: &Usuario,
    ) -> Result<(), StoreError> {
        let tx = downcast(tx);
        self.update_on(tx.conn(), record)
            .await
            .map_err(|e| store_err("update usuario", e))
    }

    async fn soft_delete_by_id(&self, id: i64) -> Result<(), StoreError> {
        self.soft_delete_on(&self.pool, id)
            .await
            .map_err(|e| store_err(format!("soft-delete usuario id={id}"), e))
    }

    async fn soft_delete_by_id_in_tx<'t>(
        &self,
        tx: &mut dyn StorageTx<'t>,
        id: i64,
    ) -> Result<(), StoreError> {
        let tx = downcast(tx);
        self.soft_delete_on(tx.conn(), id)
            .await
            .map_err(|e| store_err("soft-delete usuario", e))
    }

    async fn delete_by_id(&self, id: i64) -> Result<(), StoreError> {
        self.delete_on(&self.pool, id)
            .await
            .map_err(|e| store_err(format!("delete usuario id={id}"), e))
    }

    async fn delete_by_id_in_tx<'t>(
        &self,
        tx: &mut dyn StorageTx<'t>,
        id: i64,
    ) -> Result<(), StoreError> {
        let tx = downcast(tx);
        self.delete_on(tx.conn(), id)
            .await
            .map_err(|e| store_err("delete usuario", e))
    }
}

#[async_trait::async_trait]
impl UsuarioRepo for MySqlUsuarioRepo {
    async fn find_by_username(&self, username: &str) -> Result<Option<Usuario>, StoreError> {
        sqlx::query("SELECT * FROM usuario WHERE username = ? AND eliminado = FALSE")
            .bind(username)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| store_err(format!("find usuario by username='{username}'"), e))?
            .map(|row| Self::row_to_usuario(&row))
            .transpose()
            .map_err(|e| store_err("decode usuario row", e))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Usuario>, StoreError> {
        sqlx::query("SELECT * FROM usuario WHERE email = ? AND eliminado = FALSE")
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| store_err(format!("find usuario by email='{email}'"), e))?
            .map(|row| Self::row_to_usuario(&row))
            .transpose()
            .map_err(|e| store_err("decode usuario row", e))
    }
}
