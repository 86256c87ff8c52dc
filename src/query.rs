//! Single-value SQL queries.
//!
//! Each query returns the first column of the first row, or `None` when there is no row or the
//! value is NULL. With an empty parameter slice the plain entry point is used; otherwise
//! parameters are sent as parallel type-tag and `void*` arrays.
use std::os::raw::{c_int, c_void};

use chrono::{DateTime, Utc};

use crate::{
    codec::{present, EngineString},
    datetime::parse_opt,
    error::check,
    keepalive::{Keepalive, Pinned},
    sys, Database, Error, Result, Value,
};

/// Marshaled query parameters, borrowed from the call's keepalive.
pub(crate) struct Params<'k> {
    pub(crate) types: Pinned<'k, c_int>,
    pub(crate) values: Pinned<'k, *const c_void>,
    pub(crate) len: usize,
}

/// Encode parameters as type tags plus pointers to typed cells.
///
/// Booleans travel as integers. Arrays have no parameter encoding and are rejected before any
/// buffer is handed to the engine.
pub(crate) fn marshal_params<'k>(ka: &'k Keepalive, params: &[Value]) -> Result<Params<'k>> {
    let mut types = Vec::with_capacity(params.len());
    let mut values = Vec::with_capacity(params.len());
    for (index, p) in params.iter().enumerate() {
        let (tag, cell) = match p {
            Value::Null => (sys::QUIVER_DATA_TYPE_NULL, std::ptr::null()),
            Value::Bool(b) => (sys::QUIVER_DATA_TYPE_INTEGER, ka.cell(i64::from(*b)).erase()),
            Value::Integer(v) => (sys::QUIVER_DATA_TYPE_INTEGER, ka.cell(*v).erase()),
            Value::Float(v) => (sys::QUIVER_DATA_TYPE_FLOAT, ka.cell(*v).erase()),
            Value::Text(s) => (sys::QUIVER_DATA_TYPE_STRING, ka.str(s, "query parameter")?.erase()),
            Value::Array(_) => {
                return Err(Error::UnsupportedParameter {
                    index,
                    type_name: p.type_name(),
                })
            }
        };
        types.push(tag);
        values.push(cell);
    }
    Ok(Params {
        types: ka.array(&types),
        values: ka.array(&values),
        len: params.len(),
    })
}

impl Database {
    pub fn query_string(&self, sql: &str, params: &[Value]) -> Result<Option<String>> {
        let db = self.ptr()?;
        let ka = Keepalive::new();
        let q = ka.str(sql, "sql")?;
        let mut out = EngineString::new(self.api);
        let mut has: c_int = 0;
        let rc = if params.is_empty() {
            unsafe {
                (self.api.quiver_database_query_string)(db, q.as_ptr(), &mut out.ptr, &mut has)
            }
        } else {
            let p = marshal_params(&ka, params)?;
            unsafe {
                (self.api.quiver_database_query_string_params)(
                    db,
                    q.as_ptr(),
                    p.types.as_ptr(),
                    p.values.as_ptr(),
                    p.len,
                    &mut out.ptr,
                    &mut has,
                )
            }
        };
        check(self.api, rc)?;
        if has == 0 {
            return Ok(None);
        }
        out.decode("query result")
    }

    pub fn query_integer(&self, sql: &str, params: &[Value]) -> Result<Option<i64>> {
        let db = self.ptr()?;
        let ka = Keepalive::new();
        let q = ka.str(sql, "sql")?;
        let mut out = 0i64;
        let mut has: c_int = 0;
        let rc = if params.is_empty() {
            unsafe { (self.api.quiver_database_query_integer)(db, q.as_ptr(), &mut out, &mut has) }
        } else {
            let p = marshal_params(&ka, params)?;
            unsafe {
                (self.api.quiver_database_query_integer_params)(
                    db,
                    q.as_ptr(),
                    p.types.as_ptr(),
                    p.values.as_ptr(),
                    p.len,
                    &mut out,
                    &mut has,
                )
            }
        };
        check(self.api, rc)?;
        Ok(present(out, has))
    }

    pub fn query_float(&self, sql: &str, params: &[Value]) -> Result<Option<f64>> {
        let db = self.ptr()?;
        let ka = Keepalive::new();
        let q = ka.str(sql, "sql")?;
        let mut out = 0f64;
        let mut has: c_int = 0;
        let rc = if params.is_empty() {
            unsafe { (self.api.quiver_database_query_float)(db, q.as_ptr(), &mut out, &mut has) }
        } else {
            let p = marshal_params(&ka, params)?;
            unsafe {
                (self.api.quiver_database_query_float_params)(
                    db,
                    q.as_ptr(),
                    p.types.as_ptr(),
                    p.values.as_ptr(),
                    p.len,
                    &mut out,
                    &mut has,
                )
            }
        };
        check(self.api, rc)?;
        Ok(present(out, has))
    }

    /// String query parsed as a date-time.
    pub fn query_date_time(&self, sql: &str, params: &[Value]) -> Result<Option<DateTime<Utc>>> {
        parse_opt(self.query_string(sql, params)?)
    }
}
