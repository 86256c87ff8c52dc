//! Scalar, vector and set reads.
//!
//! Bulk reads return one entry per element *that has a value*: elements whose attribute was never
//! populated are skipped by the engine, so positions do not line up with
//! [`read_element_ids`](Database::read_element_ids). Use the `_by_id` forms when a dense result is
//! needed. An element whose vector or set was set to empty reads back as an empty row.
use std::os::raw::{c_char, c_int};

use chrono::{DateTime, Utc};

use crate::{
    codec::{
        present, EngineString, FloatArray, FloatVectors, IntArray, IntVectors, StringArray,
        StringVectors,
    },
    database::names,
    datetime::{parse_date_time, parse_opt},
    error::check,
    keepalive::Keepalive,
    sys::{quiver_database_t, quiver_error_t},
    Database, Result,
};

type JaggedFn<T> = unsafe extern "C" fn(
    *mut quiver_database_t,
    *const c_char,
    *const c_char,
    *mut *mut T,
    *mut *mut usize,
    *mut usize,
) -> quiver_error_t;

type ByIdFn<T> = unsafe extern "C" fn(
    *mut quiver_database_t,
    *const c_char,
    *const c_char,
    i64,
    *mut T,
    *mut usize,
) -> quiver_error_t;

impl Database {
    // -- scalars --

    pub fn read_scalar_integers(&self, collection: &str, attribute: &str) -> Result<Vec<i64>> {
        let db = self.ptr()?;
        let ka = Keepalive::new();
        let (c, a) = names(&ka, collection, attribute)?;
        let mut out = IntArray::new(self.api);
        check(self.api, unsafe {
            (self.api.quiver_database_read_scalar_integers)(
                db,
                c.as_ptr(),
                a.as_ptr(),
                &mut out.ptr,
                &mut out.len,
            )
        })?;
        Ok(out.as_slice().to_vec())
    }

    pub fn read_scalar_floats(&self, collection: &str, attribute: &str) -> Result<Vec<f64>> {
        let db = self.ptr()?;
        let ka = Keepalive::new();
        let (c, a) = names(&ka, collection, attribute)?;
        let mut out = FloatArray::new(self.api);
        check(self.api, unsafe {
            (self.api.quiver_database_read_scalar_floats)(
                db,
                c.as_ptr(),
                a.as_ptr(),
                &mut out.ptr,
                &mut out.len,
            )
        })?;
        Ok(out.as_slice().to_vec())
    }

    /// Null values come back as `None`.
    pub fn read_scalar_strings(
        &self,
        collection: &str,
        attribute: &str,
    ) -> Result<Vec<Option<String>>> {
        let db = self.ptr()?;
        let ka = Keepalive::new();
        let (c, a) = names(&ka, collection, attribute)?;
        let mut out = StringArray::new(self.api);
        check(self.api, unsafe {
            (self.api.quiver_database_read_scalar_strings)(
                db,
                c.as_ptr(),
                a.as_ptr(),
                &mut out.ptr,
                &mut out.len,
            )
        })?;
        out.to_opt_vec(attribute)
    }

    pub fn read_scalar_integer_by_id(
        &self,
        collection: &str,
        attribute: &str,
        id: i64,
    ) -> Result<Option<i64>> {
        let db = self.ptr()?;
        let ka = Keepalive::new();
        let (c, a) = names(&ka, collection, attribute)?;
        let mut value = 0i64;
        let mut has: c_int = 0;
        check(self.api, unsafe {
            (self.api.quiver_database_read_scalar_integer_by_id)(
                db,
                c.as_ptr(),
                a.as_ptr(),
                id,
                &mut value,
                &mut has,
            )
        })?;
        Ok(present(value, has))
    }

    pub fn read_scalar_float_by_id(
        &self,
        collection: &str,
        attribute: &str,
        id: i64,
    ) -> Result<Option<f64>> {
        let db = self.ptr()?;
        let ka = Keepalive::new();
        let (c, a) = names(&ka, collection, attribute)?;
        let mut value = 0f64;
        let mut has: c_int = 0;
        check(self.api, unsafe {
            (self.api.quiver_database_read_scalar_float_by_id)(
                db,
                c.as_ptr(),
                a.as_ptr(),
                id,
                &mut value,
                &mut has,
            )
        })?;
        Ok(present(value, has))
    }

    pub fn read_scalar_string_by_id(
        &self,
        collection: &str,
        attribute: &str,
        id: i64,
    ) -> Result<Option<String>> {
        let db = self.ptr()?;
        let ka = Keepalive::new();
        let (c, a) = names(&ka, collection, attribute)?;
        let mut value = EngineString::new(self.api);
        let mut has: c_int = 0;
        check(self.api, unsafe {
            (self.api.quiver_database_read_scalar_string_by_id)(
                db,
                c.as_ptr(),
                a.as_ptr(),
                id,
                &mut value.ptr,
                &mut has,
            )
        })?;
        if has == 0 {
            return Ok(None);
        }
        value.decode(attribute)
    }

    pub fn read_element_ids(&self, collection: &str) -> Result<Vec<i64>> {
        let db = self.ptr()?;
        let ka = Keepalive::new();
        let c = ka.str(collection, "collection")?;
        let mut out = IntArray::new(self.api);
        check(self.api, unsafe {
            (self.api.quiver_database_read_element_ids)(db, c.as_ptr(), &mut out.ptr, &mut out.len)
        })?;
        Ok(out.as_slice().to_vec())
    }

    // -- vectors --

    pub fn read_vector_integers(&self, collection: &str, attribute: &str) -> Result<Vec<Vec<i64>>> {
        self.jagged_integers(self.api.quiver_database_read_vector_integers, collection, attribute)
    }

    pub fn read_vector_floats(&self, collection: &str, attribute: &str) -> Result<Vec<Vec<f64>>> {
        self.jagged_floats(self.api.quiver_database_read_vector_floats, collection, attribute)
    }

    pub fn read_vector_strings(
        &self,
        collection: &str,
        attribute: &str,
    ) -> Result<Vec<Vec<String>>> {
        self.jagged_strings(self.api.quiver_database_read_vector_strings, collection, attribute)
    }

    pub fn read_vector_integers_by_id(
        &self,
        collection: &str,
        attribute: &str,
        id: i64,
    ) -> Result<Vec<i64>> {
        let f = self.api.quiver_database_read_vector_integers_by_id;
        self.integers_by_id(f, collection, attribute, id)
    }

    pub fn read_vector_floats_by_id(
        &self,
        collection: &str,
        attribute: &str,
        id: i64,
    ) -> Result<Vec<f64>> {
        let f = self.api.quiver_database_read_vector_floats_by_id;
        self.floats_by_id(f, collection, attribute, id)
    }

    pub fn read_vector_strings_by_id(
        &self,
        collection: &str,
        attribute: &str,
        id: i64,
    ) -> Result<Vec<String>> {
        let f = self.api.quiver_database_read_vector_strings_by_id;
        self.strings_by_id(f, collection, attribute, id)
    }

    // -- sets --

    pub fn read_set_integers(&self, collection: &str, attribute: &str) -> Result<Vec<Vec<i64>>> {
        self.jagged_integers(self.api.quiver_database_read_set_integers, collection, attribute)
    }

    pub fn read_set_floats(&self, collection: &str, attribute: &str) -> Result<Vec<Vec<f64>>> {
        self.jagged_floats(self.api.quiver_database_read_set_floats, collection, attribute)
    }

    pub fn read_set_strings(&self, collection: &str, attribute: &str) -> Result<Vec<Vec<String>>> {
        self.jagged_strings(self.api.quiver_database_read_set_strings, collection, attribute)
    }

    pub fn read_set_integers_by_id(
        &self,
        collection: &str,
        attribute: &str,
        id: i64,
    ) -> Result<Vec<i64>> {
        let f = self.api.quiver_database_read_set_integers_by_id;
        self.integers_by_id(f, collection, attribute, id)
    }

    pub fn read_set_floats_by_id(
        &self,
        collection: &str,
        attribute: &str,
        id: i64,
    ) -> Result<Vec<f64>> {
        let f = self.api.quiver_database_read_set_floats_by_id;
        self.floats_by_id(f, collection, attribute, id)
    }

    pub fn read_set_strings_by_id(
        &self,
        collection: &str,
        attribute: &str,
        id: i64,
    ) -> Result<Vec<String>> {
        let f = self.api.quiver_database_read_set_strings_by_id;
        self.strings_by_id(f, collection, attribute, id)
    }

    // -- date-times, stored as text --

    pub fn read_scalar_date_time_by_id(
        &self,
        collection: &str,
        attribute: &str,
        id: i64,
    ) -> Result<Option<DateTime<Utc>>> {
        parse_opt(self.read_scalar_string_by_id(collection, attribute, id)?)
    }

    pub fn read_vector_date_time_by_id(
        &self,
        collection: &str,
        attribute: &str,
        id: i64,
    ) -> Result<Vec<DateTime<Utc>>> {
        self.read_vector_strings_by_id(collection, attribute, id)?
            .iter()
            .map(|s| parse_date_time(s))
            .collect()
    }

    pub fn read_set_date_time_by_id(
        &self,
        collection: &str,
        attribute: &str,
        id: i64,
    ) -> Result<Vec<DateTime<Utc>>> {
        self.read_set_strings_by_id(collection, attribute, id)?
            .iter()
            .map(|s| parse_date_time(s))
            .collect()
    }

    // -- shared shapes --

    fn jagged_integers(
        &self,
        f: JaggedFn<*mut i64>,
        collection: &str,
        attribute: &str,
    ) -> Result<Vec<Vec<i64>>> {
        let db = self.ptr()?;
        let ka = Keepalive::new();
        let (c, a) = names(&ka, collection, attribute)?;
        let mut out = IntVectors::new(self.api);
        check(self.api, unsafe {
            f(
                db,
                c.as_ptr(),
                a.as_ptr(),
                &mut out.vectors,
                &mut out.sizes,
                &mut out.count,
            )
        })?;
        out.to_vec()
    }

    fn jagged_floats(
        &self,
        f: JaggedFn<*mut f64>,
        collection: &str,
        attribute: &str,
    ) -> Result<Vec<Vec<f64>>> {
        let db = self.ptr()?;
        let ka = Keepalive::new();
        let (c, a) = names(&ka, collection, attribute)?;
        let mut out = FloatVectors::new(self.api);
        check(self.api, unsafe {
            f(
                db,
                c.as_ptr(),
                a.as_ptr(),
                &mut out.vectors,
                &mut out.sizes,
                &mut out.count,
            )
        })?;
        out.to_vec()
    }

    fn jagged_strings(
        &self,
        f: JaggedFn<*mut *mut c_char>,
        collection: &str,
        attribute: &str,
    ) -> Result<Vec<Vec<String>>> {
        let db = self.ptr()?;
        let ka = Keepalive::new();
        let (c, a) = names(&ka, collection, attribute)?;
        let mut out = StringVectors::new(self.api);
        check(self.api, unsafe {
            f(
                db,
                c.as_ptr(),
                a.as_ptr(),
                &mut out.vectors,
                &mut out.sizes,
                &mut out.count,
            )
        })?;
        out.to_vec(attribute)
    }

    fn integers_by_id(
        &self,
        f: ByIdFn<*mut i64>,
        collection: &str,
        attribute: &str,
        id: i64,
    ) -> Result<Vec<i64>> {
        let db = self.ptr()?;
        let ka = Keepalive::new();
        let (c, a) = names(&ka, collection, attribute)?;
        let mut out = IntArray::new(self.api);
        check(self.api, unsafe {
            f(db, c.as_ptr(), a.as_ptr(), id, &mut out.ptr, &mut out.len)
        })?;
        Ok(out.as_slice().to_vec())
    }

    fn floats_by_id(
        &self,
        f: ByIdFn<*mut f64>,
        collection: &str,
        attribute: &str,
        id: i64,
    ) -> Result<Vec<f64>> {
        let db = self.ptr()?;
        let ka = Keepalive::new();
        let (c, a) = names(&ka, collection, attribute)?;
        let mut out = FloatArray::new(self.api);
        check(self.api, unsafe {
            f(db, c.as_ptr(), a.as_ptr(), id, &mut out.ptr, &mut out.len)
        })?;
        Ok(out.as_slice().to_vec())
    }

    fn strings_by_id(
        &self,
        f: ByIdFn<*mut *mut c_char>,
        collection: &str,
        attribute: &str,
        id: i64,
    ) -> Result<Vec<String>> {
        let db = self.ptr()?;
        let ka = Keepalive::new();
        let (c, a) = names(&ka, collection, attribute)?;
        let mut out = StringArray::new(self.api);
        check(self.api, unsafe {
            f(db, c.as_ptr(), a.as_ptr(), id, &mut out.ptr, &mut out.len)
        })?;
        out.to_vec(attribute)
    }
}
