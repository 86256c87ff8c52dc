//! Schema metadata for attributes and groups.
use std::{os::raw::c_char, slice};

use crate::{
    api::Api,
    codec::decode_str,
    error::check,
    keepalive::Keepalive,
    sys::{self, quiver_database_t, quiver_error_t, quiver_group_metadata_t},
    Database, DataType, Error, Result,
};

/// Description of one scalar attribute (or one column of a group).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScalarMetadata {
    pub name: String,
    pub data_type: DataType,
    pub not_null: bool,
    pub primary_key: bool,
    pub default_value: Option<String>,
    pub is_foreign_key: bool,
    pub references_collection: Option<String>,
    pub references_column: Option<String>,
}

/// Description of a vector, set or time-series group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupMetadata {
    pub group_name: String,
    /// Only time-series groups have a dimension column.
    pub dimension_column: Option<String>,
    pub value_columns: Vec<ScalarMetadata>,
}

unsafe fn required(p: *const c_char, what: &str) -> Result<String> {
    if p.is_null() {
        return Err(Error::protocol(format!("metadata {what} is null")));
    }
    decode_str(p, what)
}

unsafe fn optional(p: *const c_char, what: &str) -> Result<Option<String>> {
    if p.is_null() {
        Ok(None)
    } else {
        decode_str(p, what).map(Some)
    }
}

impl ScalarMetadata {
    unsafe fn from_raw(raw: &sys::quiver_scalar_metadata_t) -> Result<Self> {
        Ok(Self {
            name: required(raw.name, "name")?,
            data_type: DataType::from_raw(raw.data_type)?,
            not_null: raw.not_null != 0,
            primary_key: raw.primary_key != 0,
            default_value: optional(raw.default_value, "default value")?,
            is_foreign_key: raw.is_foreign_key != 0,
            references_collection: optional(raw.references_collection, "referenced collection")?,
            references_column: optional(raw.references_column, "referenced column")?,
        })
    }
}

impl GroupMetadata {
    unsafe fn from_raw(raw: &quiver_group_metadata_t) -> Result<Self> {
        let columns = if raw.value_column_count == 0 || raw.value_columns.is_null() {
            &[][..]
        } else {
            slice::from_raw_parts(raw.value_columns, raw.value_column_count)
        };
        Ok(Self {
            group_name: required(raw.group_name, "group name")?,
            dimension_column: optional(raw.dimension_column, "dimension column")?,
            value_columns: columns
                .iter()
                .map(|c| ScalarMetadata::from_raw(c))
                .collect::<Result<_>>()?,
        })
    }
}

/// Filled metadata structs, released when dropped.
struct ScalarGuard<'a> {
    api: &'a Api,
    raw: sys::quiver_scalar_metadata_t,
}

impl Drop for ScalarGuard<'_> {
    fn drop(&mut self) {
        unsafe { (self.api.quiver_database_free_scalar_metadata)(&mut self.raw) };
    }
}

struct GroupGuard<'a> {
    api: &'a Api,
    raw: quiver_group_metadata_t,
}

impl Drop for GroupGuard<'_> {
    fn drop(&mut self) {
        unsafe { (self.api.quiver_database_free_group_metadata)(&mut self.raw) };
    }
}

struct ScalarList<'a> {
    api: &'a Api,
    ptr: *mut sys::quiver_scalar_metadata_t,
    len: usize,
}

impl Drop for ScalarList<'_> {
    fn drop(&mut self) {
        if !self.ptr.is_null() {
            unsafe { (self.api.quiver_database_free_scalar_metadata_array)(self.ptr, self.len) };
        }
    }
}

struct GroupList<'a> {
    api: &'a Api,
    ptr: *mut quiver_group_metadata_t,
    len: usize,
}

impl Drop for GroupList<'_> {
    fn drop(&mut self) {
        if !self.ptr.is_null() {
            unsafe { (self.api.quiver_database_free_group_metadata_array)(self.ptr, self.len) };
        }
    }
}

type GetGroupFn = unsafe extern "C" fn(
    *mut quiver_database_t,
    *const c_char,
    *const c_char,
    *mut quiver_group_metadata_t,
) -> quiver_error_t;

type ListGroupsFn = unsafe extern "C" fn(
    *mut quiver_database_t,
    *const c_char,
    *mut *mut quiver_group_metadata_t,
    *mut usize,
) -> quiver_error_t;

impl Database {
    pub fn get_scalar_metadata(&self, collection: &str, attribute: &str) -> Result<ScalarMetadata> {
        let db = self.ptr()?;
        let ka = Keepalive::new();
        let c = ka.str(collection, "collection")?;
        let a = ka.str(attribute, "attribute")?;
        let mut raw = sys::quiver_scalar_metadata_t::empty();
        check(self.api, unsafe {
            (self.api.quiver_database_get_scalar_metadata)(db, c.as_ptr(), a.as_ptr(), &mut raw)
        })?;
        let guard = ScalarGuard { api: self.api, raw };
        unsafe { ScalarMetadata::from_raw(&guard.raw) }
    }

    pub fn get_vector_metadata(&self, collection: &str, group: &str) -> Result<GroupMetadata> {
        self.group_metadata(self.api.quiver_database_get_vector_metadata, collection, group)
    }

    pub fn get_set_metadata(&self, collection: &str, group: &str) -> Result<GroupMetadata> {
        self.group_metadata(self.api.quiver_database_get_set_metadata, collection, group)
    }

    pub fn get_time_series_metadata(&self, collection: &str, group: &str) -> Result<GroupMetadata> {
        self.group_metadata(self.api.quiver_database_get_time_series_metadata, collection, group)
    }

    pub fn list_scalar_attributes(&self, collection: &str) -> Result<Vec<ScalarMetadata>> {
        let db = self.ptr()?;
        let ka = Keepalive::new();
        let c = ka.str(collection, "collection")?;
        let mut out = ScalarList {
            api: self.api,
            ptr: std::ptr::null_mut(),
            len: 0,
        };
        check(self.api, unsafe {
            (self.api.quiver_database_list_scalar_attributes)(
                db,
                c.as_ptr(),
                &mut out.ptr,
                &mut out.len,
            )
        })?;
        if out.ptr.is_null() || out.len == 0 {
            return Ok(Vec::new());
        }
        unsafe { slice::from_raw_parts(out.ptr, out.len) }
            .iter()
            .map(|m| unsafe { ScalarMetadata::from_raw(m) })
            .collect()
    }

    pub fn list_vector_groups(&self, collection: &str) -> Result<Vec<GroupMetadata>> {
        self.list_groups(self.api.quiver_database_list_vector_groups, collection)
    }

    pub fn list_set_groups(&self, collection: &str) -> Result<Vec<GroupMetadata>> {
        self.list_groups(self.api.quiver_database_list_set_groups, collection)
    }

    pub fn list_time_series_groups(&self, collection: &str) -> Result<Vec<GroupMetadata>> {
        self.list_groups(self.api.quiver_database_list_time_series_groups, collection)
    }

    fn group_metadata(
        &self,
        f: GetGroupFn,
        collection: &str,
        group: &str,
    ) -> Result<GroupMetadata> {
        let db = self.ptr()?;
        let ka = Keepalive::new();
        let c = ka.str(collection, "collection")?;
        let g = ka.str(group, "group")?;
        let mut raw = quiver_group_metadata_t::empty();
        check(self.api, unsafe { f(db, c.as_ptr(), g.as_ptr(), &mut raw) })?;
        let guard = GroupGuard { api: self.api, raw };
        unsafe { GroupMetadata::from_raw(&guard.raw) }
    }

    fn list_groups(&self, f: ListGroupsFn, collection: &str) -> Result<Vec<GroupMetadata>> {
        let db = self.ptr()?;
        let ka = Keepalive::new();
        let c = ka.str(collection, "collection")?;
        let mut out = GroupList {
            api: self.api,
            ptr: std::ptr::null_mut(),
            len: 0,
        };
        check(self.api, unsafe { f(db, c.as_ptr(), &mut out.ptr, &mut out.len) })?;
        if out.ptr.is_null() || out.len == 0 {
            return Ok(Vec::new());
        }
        unsafe { slice::from_raw_parts(out.ptr, out.len) }
            .iter()
            .map(|m| unsafe { GroupMetadata::from_raw(m) })
            .collect()
    }
}
