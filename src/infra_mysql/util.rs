use super::repo_tx_mysql::MySqlTx;
use crate::domain_port::*;
use sqlx::mysql::MySqlDatabaseError;

/// Repos in this module only ever receive transactions opened by
/// [`super::MySqlTxManager`], so the concrete type is known.
pub fn downcast<'a, 't>(tx: &'a mut dyn StorageTx<'t>) -> &'a mut MySqlTx<'t> {
    unsafe {
        let p = tx as *mut dyn StorageTx<'t>;
        let p = p as *mut MySqlTx<'t>;
        &mut *p
    }
}

pub fn is_dup_key(err: &sqlx::Error) -> bool {
    if let sqlx::Error::Database(db) = err {
        if let Some(mysql_err) = db.try_downcast_ref::<MySqlDatabaseError>() {
            return mysql_err.number() == 1062; // ER_DUP_ENTRY
        }
    }

    false
}

/// Wraps a sqlx failure with operation context, keeping the cause on the
/// chain. Duplicate-key violations surface as `Constraint` so callers can
/// tell a uniqueness race from a connectivity failure.
pub fn store_err(context: impl Into<String>, err: sqlx::Error) -> StoreError {
    let context = context.into();
    if is_dup_key(&err) {
        StoreError::Constraint(format!("{context}: {err}"))
    } else {
        StoreError::backend(context, err)
    }
}
