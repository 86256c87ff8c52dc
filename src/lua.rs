//! Lua script runner bound to an open database.
use std::{
    marker::PhantomData,
    os::raw::c_char,
    ptr::{self, NonNull},
    rc::Rc,
};

use crate::{
    api::Api,
    error::{check, last_error, non_empty},
    keepalive::Keepalive,
    sys, Database, Error, Result,
};

/// Runs Lua scripts against a [`Database`].
///
/// The runner borrows the database, so the database cannot be closed or dropped while the runner
/// is alive.
pub struct LuaRunner<'db> {
    runner: Option<NonNull<sys::quiver_lua_runner>>,
    api: &'static Api,
    _db: PhantomData<&'db Database>,
    _nosend: PhantomData<Rc<()>>,
}

impl<'db> LuaRunner<'db> {
    pub fn new(db: &'db Database) -> Result<Self> {
        let raw_db = db.ptr()?;
        let api = db.api;
        let mut out: *mut sys::quiver_lua_runner_t = ptr::null_mut();
        check(api, unsafe { (api.quiver_lua_runner_new)(raw_db, &mut out) })?;
        let runner = NonNull::new(out)
            .ok_or_else(|| Error::protocol("quiver_lua_runner_new returned a null runner"))?;
        Ok(Self {
            runner: Some(runner),
            api,
            _db: PhantomData,
            _nosend: PhantomData,
        })
    }

    fn ptr(&self) -> Result<*mut sys::quiver_lua_runner_t> {
        self.runner
            .map(NonNull::as_ptr)
            .ok_or(Error::Closed {
                resource: "LuaRunner",
            })
    }

    pub fn is_closed(&self) -> bool {
        self.runner.is_none()
    }

    /// Execute `script`.
    ///
    /// On failure the message is taken from the runner's own error (Lua syntax and runtime
    /// errors), then from the engine's last error, then a generic message.
    pub fn run(&self, script: &str) -> Result<()> {
        let runner = self.ptr()?;
        let ka = Keepalive::new();
        let s = ka.str(script, "script")?;
        let rc = unsafe { (self.api.quiver_lua_runner_run)(runner, s.as_ptr()) };
        if rc == sys::QUIVER_OK {
            return Ok(());
        }
        let message = self
            .runner_error(runner)
            .or_else(|| last_error(self.api))
            .unwrap_or_else(|| "Lua script execution failed".to_owned());
        tracing::debug!(code = rc, %message, "lua script failed");
        Err(Error::Engine { code: rc, message })
    }

    fn runner_error(&self, runner: *mut sys::quiver_lua_runner_t) -> Option<String> {
        let mut out: *const c_char = ptr::null();
        let rc = unsafe { (self.api.quiver_lua_runner_get_error)(runner, &mut out) };
        if rc != sys::QUIVER_OK {
            return None;
        }
        unsafe { non_empty(out) }
    }

    /// Release the runner. A second call is a no-op.
    pub fn close(&mut self) -> Result<()> {
        match self.runner.take() {
            Some(r) => check(self.api, unsafe { (self.api.quiver_lua_runner_free)(r.as_ptr()) }),
            None => Ok(()),
        }
    }
}

impl Drop for LuaRunner<'_> {
    fn drop(&mut self) {
        if let Some(r) = self.runner.take() {
            let rc = unsafe { (self.api.quiver_lua_runner_free)(r.as_ptr()) };
            tracing::debug!(rc, "released lua runner on drop");
        }
    }
}
