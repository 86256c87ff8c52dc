//! Explicit transactions.
use crate::{error::check, Database, Result};

/// Rolls back on drop unless disarmed.
struct RollbackGuard<'db> {
    db: &'db Database,
    armed: bool,
}

impl RollbackGuard<'_> {
    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for RollbackGuard<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        if let Err(e) = self.db.rollback() {
            tracing::warn!(error = %e, "rollback after failed transaction also failed");
        }
    }
}

impl Database {
    pub fn begin_transaction(&self) -> Result<()> {
        let db = self.ptr()?;
        check(self.api, unsafe { (self.api.quiver_database_begin_transaction)(db) })
    }

    pub fn commit(&self) -> Result<()> {
        let db = self.ptr()?;
        check(self.api, unsafe { (self.api.quiver_database_commit)(db) })
    }

    pub fn rollback(&self) -> Result<()> {
        let db = self.ptr()?;
        check(self.api, unsafe { (self.api.quiver_database_rollback)(db) })
    }

    /// Whether the engine has a transaction open on this handle.
    pub fn in_transaction(&self) -> Result<bool> {
        let db = self.ptr()?;
        let mut out = false;
        check(self.api, unsafe { (self.api.quiver_database_in_transaction)(db, &mut out) })?;
        Ok(out)
    }

    /// Run `f` inside a transaction.
    ///
    /// Commits when `f` returns `Ok`. When `f` fails, when the commit fails, or when `f` panics,
    /// a rollback is attempted; a failing rollback is logged and the original error (or panic)
    /// is what the caller sees.
    ///
    /// ```no_run
    /// # fn demo(db: &quiverdb::Database) -> quiverdb::Result<()> {
    /// let total = db.transaction(|db| {
    ///     db.update_scalar_integer("Items", "count", 1, 10)?;
    ///     db.update_scalar_integer("Items", "count", 2, 20)?;
    ///     Ok(30)
    /// })?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn transaction<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Self) -> Result<T>,
    {
        self.begin_transaction()?;
        let guard = RollbackGuard {
            db: self,
            armed: true,
        };
        let value = f(self)?;
        self.commit()?;
        guard.disarm();
        Ok(value)
    }
}
