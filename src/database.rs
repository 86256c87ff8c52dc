//! Database handle: lifecycle, element writes and attribute updates.
use std::{
    fmt,
    marker::PhantomData,
    os::raw::{c_char, c_int},
    ptr::{self, NonNull},
    rc::Rc,
};

use chrono::{DateTime, Utc};

use crate::{
    api::Api,
    codec::{decode_str, StringArray},
    datetime::format_date_time,
    error::{self, check},
    keepalive::{Keepalive, Pinned},
    runtime::runtime,
    sys, Element, Error, Result,
};

/// Engine console log level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogLevel {
    Debug,
    #[default]
    Info,
    Warn,
    Error,
    Off,
}

impl LogLevel {
    fn to_raw(self) -> sys::quiver_log_level_t {
        match self {
            LogLevel::Debug => sys::QUIVER_LOG_DEBUG,
            LogLevel::Info => sys::QUIVER_LOG_INFO,
            LogLevel::Warn => sys::QUIVER_LOG_WARN,
            LogLevel::Error => sys::QUIVER_LOG_ERROR,
            LogLevel::Off => sys::QUIVER_LOG_OFF,
        }
    }

    fn from_raw(raw: sys::quiver_log_level_t) -> Result<Self> {
        Ok(match raw {
            sys::QUIVER_LOG_DEBUG => LogLevel::Debug,
            sys::QUIVER_LOG_INFO => LogLevel::Info,
            sys::QUIVER_LOG_WARN => LogLevel::Warn,
            sys::QUIVER_LOG_ERROR => LogLevel::Error,
            sys::QUIVER_LOG_OFF => LogLevel::Off,
            other => return Err(Error::protocol(format!("unknown log level {other}"))),
        })
    }
}

/// Options used when opening or creating a database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DatabaseOptions {
    pub read_only: bool,
    pub console_level: LogLevel,
}

impl DatabaseOptions {
    /// The engine's own defaults.
    pub fn engine_default() -> Result<Self> {
        let api = &runtime()?.api;
        let raw = unsafe { (api.quiver_database_options_default)() };
        Ok(Self {
            read_only: raw.read_only != 0,
            console_level: LogLevel::from_raw(raw.console_level)?,
        })
    }

    fn to_raw(self) -> sys::quiver_database_options_t {
        sys::quiver_database_options_t {
            read_only: c_int::from(self.read_only),
            console_level: self.console_level.to_raw(),
        }
    }
}

/// An open Quiver database.
///
/// Not `Send`: the engine handle is used from the thread that opened it. Dropping an open handle
/// closes it; [`close`](Self::close) does the same but reports the engine status.
pub struct Database {
    db: Option<NonNull<sys::quiver_database>>,
    pub(crate) api: &'static Api,
    _nosend: PhantomData<Rc<()>>,
}

impl Database {
    /// Open an existing database with the engine's default options.
    pub fn open(path: &str) -> Result<Self> {
        Self::connect(None, |api, ka, opts, out| {
            let p = ka.str(path, "database path")?;
            Ok(unsafe { (api.quiver_database_open)(p.as_ptr(), opts, out) })
        })
    }

    pub fn open_with(path: &str, options: &DatabaseOptions) -> Result<Self> {
        Self::connect(Some(options), |api, ka, opts, out| {
            let p = ka.str(path, "database path")?;
            Ok(unsafe { (api.quiver_database_open)(p.as_ptr(), opts, out) })
        })
    }

    /// Create (or open) a database and apply a SQL schema file.
    pub fn from_schema(db_path: &str, schema_path: &str) -> Result<Self> {
        Self::from_schema_with(db_path, schema_path, None)
    }

    pub fn from_schema_with(
        db_path: &str,
        schema_path: &str,
        options: Option<&DatabaseOptions>,
    ) -> Result<Self> {
        Self::connect(options, |api, ka, opts, out| {
            let d = ka.str(db_path, "database path")?;
            let s = ka.str(schema_path, "schema path")?;
            Ok(unsafe { (api.quiver_database_from_schema)(d.as_ptr(), s.as_ptr(), opts, out) })
        })
    }

    /// Create (or open) a database and apply a migrations directory.
    pub fn from_migrations(db_path: &str, migrations_path: &str) -> Result<Self> {
        Self::from_migrations_with(db_path, migrations_path, None)
    }

    pub fn from_migrations_with(
        db_path: &str,
        migrations_path: &str,
        options: Option<&DatabaseOptions>,
    ) -> Result<Self> {
        Self::connect(options, |api, ka, opts, out| {
            let d = ka.str(db_path, "database path")?;
            let m = ka.str(migrations_path, "migrations path")?;
            Ok(unsafe {
                (api.quiver_database_from_migrations)(d.as_ptr(), m.as_ptr(), opts, out)
            })
        })
    }

    fn connect<F>(options: Option<&DatabaseOptions>, call: F) -> Result<Self>
    where
        F: FnOnce(
            &Api,
            &Keepalive,
            *const sys::quiver_database_options_t,
            *mut *mut sys::quiver_database_t,
        ) -> Result<sys::quiver_error_t>,
    {
        let api = &runtime()?.api;
        let raw = match options {
            Some(o) => o.to_raw(),
            None => unsafe { (api.quiver_database_options_default)() },
        };
        let ka = Keepalive::new();
        let mut out: *mut sys::quiver_database_t = ptr::null_mut();
        let rc = call(api, &ka, &raw, &mut out)?;
        check(api, rc)?;
        let db = NonNull::new(out)
            .ok_or_else(|| Error::protocol("database constructor returned a null handle"))?;
        Ok(Self {
            db: Some(db),
            api,
            _nosend: PhantomData,
        })
    }

    pub(crate) fn ptr(&self) -> Result<*mut sys::quiver_database_t> {
        self.db
            .map(NonNull::as_ptr)
            .ok_or(Error::Closed {
                resource: "Database",
            })
    }

    pub fn is_closed(&self) -> bool {
        self.db.is_none()
    }

    /// Close the database. A second call is a no-op.
    ///
    /// The handle is released even when the engine reports a failure.
    pub fn close(&mut self) -> Result<()> {
        match self.db.take() {
            Some(db) => check(self.api, unsafe { (self.api.quiver_database_close)(db.as_ptr()) }),
            None => Ok(()),
        }
    }

    pub fn path(&self) -> Result<String> {
        let db = self.ptr()?;
        let mut out: *const c_char = ptr::null();
        check(self.api, unsafe { (self.api.quiver_database_path)(db, &mut out) })?;
        if out.is_null() {
            return Err(Error::protocol("quiver_database_path returned null"));
        }
        unsafe { decode_str(out, "database path") }
    }

    pub fn current_version(&self) -> Result<i64> {
        let db = self.ptr()?;
        let mut out = 0i64;
        check(self.api, unsafe { (self.api.quiver_database_current_version)(db, &mut out) })?;
        Ok(out)
    }

    /// Run the engine's integrity checks.
    pub fn is_healthy(&self) -> Result<bool> {
        let db = self.ptr()?;
        let mut out: c_int = 0;
        check(self.api, unsafe { (self.api.quiver_database_is_healthy)(db, &mut out) })?;
        Ok(out != 0)
    }

    /// Print the engine's schema description to stdout.
    pub fn describe(&self) -> Result<()> {
        let db = self.ptr()?;
        check(self.api, unsafe { (self.api.quiver_database_describe)(db) })
    }

    /// Last error message recorded by the engine on this thread, if any.
    pub fn last_error(&self) -> Option<String> {
        error::last_error(self.api)
    }

    pub fn clear_last_error(&self) {
        unsafe { (self.api.quiver_clear_last_error)() }
    }

    // -- element writes --

    /// Create an element and return its id. The element can be reused afterwards.
    pub fn create_element(&self, collection: &str, element: &Element) -> Result<i64> {
        let db = self.ptr()?;
        let el = element.ptr()?;
        let ka = Keepalive::new();
        let c = ka.str(collection, "collection")?;
        let mut id = 0i64;
        check(self.api, unsafe {
            (self.api.quiver_database_create_element)(db, c.as_ptr(), el, &mut id)
        })?;
        Ok(id)
    }

    pub fn update_element(&self, collection: &str, id: i64, element: &Element) -> Result<()> {
        let db = self.ptr()?;
        let el = element.ptr()?;
        let ka = Keepalive::new();
        let c = ka.str(collection, "collection")?;
        check(self.api, unsafe {
            (self.api.quiver_database_update_element)(db, c.as_ptr(), id, el)
        })
    }

    pub fn delete_element(&self, collection: &str, id: i64) -> Result<()> {
        let db = self.ptr()?;
        let ka = Keepalive::new();
        let c = ka.str(collection, "collection")?;
        check(self.api, unsafe {
            (self.api.quiver_database_delete_element)(db, c.as_ptr(), id)
        })
    }

    // -- scalar updates --

    pub fn update_scalar_integer(
        &self,
        collection: &str,
        attribute: &str,
        id: i64,
        value: i64,
    ) -> Result<()> {
        let db = self.ptr()?;
        let ka = Keepalive::new();
        let (c, a) = names(&ka, collection, attribute)?;
        check(self.api, unsafe {
            (self.api.quiver_database_update_scalar_integer)(db, c.as_ptr(), a.as_ptr(), id, value)
        })
    }

    pub fn update_scalar_float(
        &self,
        collection: &str,
        attribute: &str,
        id: i64,
        value: f64,
    ) -> Result<()> {
        let db = self.ptr()?;
        let ka = Keepalive::new();
        let (c, a) = names(&ka, collection, attribute)?;
        check(self.api, unsafe {
            (self.api.quiver_database_update_scalar_float)(db, c.as_ptr(), a.as_ptr(), id, value)
        })
    }

    pub fn update_scalar_string(
        &self,
        collection: &str,
        attribute: &str,
        id: i64,
        value: &str,
    ) -> Result<()> {
        let db = self.ptr()?;
        let ka = Keepalive::new();
        let (c, a) = names(&ka, collection, attribute)?;
        let v = ka.str(value, attribute)?;
        check(self.api, unsafe {
            (self.api.quiver_database_update_scalar_string)(
                db,
                c.as_ptr(),
                a.as_ptr(),
                id,
                v.as_ptr(),
            )
        })
    }

    pub fn update_scalar_date_time(
        &self,
        collection: &str,
        attribute: &str,
        id: i64,
        value: &DateTime<Utc>,
    ) -> Result<()> {
        self.update_scalar_string(collection, attribute, id, &format_date_time(value))
    }

    // -- vector and set updates; an empty slice clears the attribute --

    pub fn update_vector_integers(
        &self,
        collection: &str,
        attribute: &str,
        id: i64,
        values: &[i64],
    ) -> Result<()> {
        let db = self.ptr()?;
        let ka = Keepalive::new();
        let (c, a) = names(&ka, collection, attribute)?;
        let v = ka.array(values);
        check(self.api, unsafe {
            (self.api.quiver_database_update_vector_integers)(
                db,
                c.as_ptr(),
                a.as_ptr(),
                id,
                v.as_ptr(),
                values.len(),
            )
        })
    }

    pub fn update_vector_floats(
        &self,
        collection: &str,
        attribute: &str,
        id: i64,
        values: &[f64],
    ) -> Result<()> {
        let db = self.ptr()?;
        let ka = Keepalive::new();
        let (c, a) = names(&ka, collection, attribute)?;
        let v = ka.array(values);
        check(self.api, unsafe {
            (self.api.quiver_database_update_vector_floats)(
                db,
                c.as_ptr(),
                a.as_ptr(),
                id,
                v.as_ptr(),
                values.len(),
            )
        })
    }

    pub fn update_vector_strings<S: AsRef<str>>(
        &self,
        collection: &str,
        attribute: &str,
        id: i64,
        values: &[S],
    ) -> Result<()> {
        let db = self.ptr()?;
        let ka = Keepalive::new();
        let (c, a) = names(&ka, collection, attribute)?;
        let v = ka.strs(values, attribute)?;
        check(self.api, unsafe {
            (self.api.quiver_database_update_vector_strings)(
                db,
                c.as_ptr(),
                a.as_ptr(),
                id,
                v.as_ptr(),
                values.len(),
            )
        })
    }

    pub fn update_set_integers(
        &self,
        collection: &str,
        attribute: &str,
        id: i64,
        values: &[i64],
    ) -> Result<()> {
        let db = self.ptr()?;
        let ka = Keepalive::new();
        let (c, a) = names(&ka, collection, attribute)?;
        let v = ka.array(values);
        check(self.api, unsafe {
            (self.api.quiver_database_update_set_integers)(
                db,
                c.as_ptr(),
                a.as_ptr(),
                id,
                v.as_ptr(),
                values.len(),
            )
        })
    }

    pub fn update_set_floats(
        &self,
        collection: &str,
        attribute: &str,
        id: i64,
        values: &[f64],
    ) -> Result<()> {
        let db = self.ptr()?;
        let ka = Keepalive::new();
        let (c, a) = names(&ka, collection, attribute)?;
        let v = ka.array(values);
        check(self.api, unsafe {
            (self.api.quiver_database_update_set_floats)(
                db,
                c.as_ptr(),
                a.as_ptr(),
                id,
                v.as_ptr(),
                values.len(),
            )
        })
    }

    pub fn update_set_strings<S: AsRef<str>>(
        &self,
        collection: &str,
        attribute: &str,
        id: i64,
        values: &[S],
    ) -> Result<()> {
        let db = self.ptr()?;
        let ka = Keepalive::new();
        let (c, a) = names(&ka, collection, attribute)?;
        let v = ka.strs(values, attribute)?;
        check(self.api, unsafe {
            (self.api.quiver_database_update_set_strings)(
                db,
                c.as_ptr(),
                a.as_ptr(),
                id,
                v.as_ptr(),
                values.len(),
            )
        })
    }

    // -- relations --

    /// Point the element labelled `from_label` at the element labelled `to_label`.
    pub fn update_scalar_relation(
        &self,
        collection: &str,
        attribute: &str,
        from_label: &str,
        to_label: &str,
    ) -> Result<()> {
        let db = self.ptr()?;
        let ka = Keepalive::new();
        let (c, a) = names(&ka, collection, attribute)?;
        let from = ka.str(from_label, "label")?;
        let to = ka.str(to_label, "label")?;
        check(self.api, unsafe {
            (self.api.quiver_database_update_scalar_relation)(
                db,
                c.as_ptr(),
                a.as_ptr(),
                from.as_ptr(),
                to.as_ptr(),
            )
        })
    }

    /// Label of the related element for every element; `None` where unset.
    pub fn read_scalar_relation(
        &self,
        collection: &str,
        attribute: &str,
    ) -> Result<Vec<Option<String>>> {
        let db = self.ptr()?;
        let ka = Keepalive::new();
        let (c, a) = names(&ka, collection, attribute)?;
        let mut out = StringArray::new(self.api);
        check(self.api, unsafe {
            (self.api.quiver_database_read_scalar_relation)(
                db,
                c.as_ptr(),
                a.as_ptr(),
                &mut out.ptr,
                &mut out.len,
            )
        })?;
        out.to_opt_vec(attribute)
    }
}

/// Collection and attribute names, the leading arguments of most calls.
pub(crate) fn names<'k>(
    ka: &'k Keepalive,
    collection: &str,
    attribute: &str,
) -> Result<(Pinned<'k, c_char>, Pinned<'k, c_char>)> {
    Ok((
        ka.str(collection, "collection")?,
        ka.str(attribute, "attribute")?,
    ))
}

impl fmt::Debug for Database {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.path() {
            Ok(p) => write!(f, "Database(path={p:?})"),
            Err(_) => f.write_str("Database(closed)"),
        }
    }
}

impl Drop for Database {
    fn drop(&mut self) {
        if let Some(db) = self.db.take() {
            let rc = unsafe { (self.api.quiver_database_close)(db.as_ptr()) };
            tracing::debug!(rc, "closed database on drop");
        }
    }
}
