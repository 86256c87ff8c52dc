#![allow(non_camel_case_types)]
#![allow(non_snake_case)]
#![allow(dead_code)]
use std::{
    os::raw::{c_char, c_int},
    ptr,
};

/// Status code returned by most ABI functions.
///
/// Kept as a plain `int` rather than a Rust enum: the engine may return codes this crate does not
/// know about, and an unknown discriminant in a `#[repr(C)]` enum is undefined behaviour.
pub type quiver_error_t = c_int;

pub const QUIVER_OK: quiver_error_t = 0;
pub const QUIVER_ERROR: quiver_error_t = 1;

/// Type tag used by metadata, time-series columns and query parameters.
pub type quiver_data_type_t = c_int;

pub const QUIVER_DATA_TYPE_INTEGER: quiver_data_type_t = 0;
pub const QUIVER_DATA_TYPE_FLOAT: quiver_data_type_t = 1;
pub const QUIVER_DATA_TYPE_STRING: quiver_data_type_t = 2;
pub const QUIVER_DATA_TYPE_DATE_TIME: quiver_data_type_t = 3;
pub const QUIVER_DATA_TYPE_NULL: quiver_data_type_t = 4;

pub type quiver_log_level_t = c_int;

pub const QUIVER_LOG_DEBUG: quiver_log_level_t = 0;
pub const QUIVER_LOG_INFO: quiver_log_level_t = 1;
pub const QUIVER_LOG_WARN: quiver_log_level_t = 2;
pub const QUIVER_LOG_ERROR: quiver_log_level_t = 3;
pub const QUIVER_LOG_OFF: quiver_log_level_t = 4;

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct quiver_database_options_t {
    pub read_only: c_int,
    pub console_level: quiver_log_level_t,
}

/// Scalar attribute description.
///
/// All strings are engine-owned and released with `quiver_database_free_scalar_metadata`
/// (or the `_array` variant for listings). `default_value`, `references_collection` and
/// `references_column` are null when absent.
#[repr(C)]
#[derive(Copy, Clone)]
pub struct quiver_scalar_metadata_t {
    pub name: *const c_char,
    pub data_type: quiver_data_type_t,
    pub not_null: c_int,
    pub primary_key: c_int,
    pub default_value: *const c_char,
    pub is_foreign_key: c_int,
    pub references_collection: *const c_char,
    pub references_column: *const c_char,
}

impl quiver_scalar_metadata_t {
    pub const fn empty() -> Self {
        Self {
            name: ptr::null(),
            data_type: QUIVER_DATA_TYPE_NULL,
            not_null: 0,
            primary_key: 0,
            default_value: ptr::null(),
            is_foreign_key: 0,
            references_collection: ptr::null(),
            references_column: ptr::null(),
        }
    }
}

/// Vector, set or time-series group description.
///
/// `dimension_column` is null for vector and set groups.
#[repr(C)]
#[derive(Copy, Clone)]
pub struct quiver_group_metadata_t {
    pub group_name: *const c_char,
    pub dimension_column: *const c_char,
    pub value_columns: *mut quiver_scalar_metadata_t,
    pub value_column_count: usize,
}

impl quiver_group_metadata_t {
    pub const fn empty() -> Self {
        Self {
            group_name: ptr::null(),
            dimension_column: ptr::null(),
            value_columns: ptr::null_mut(),
            value_column_count: 0,
        }
    }
}

/// CSV import/export options.
///
/// The nested `attribute -> locale -> {label -> value}` mapping is flattened into groups, one
/// per `(attribute, locale)` pair. `enum_entry_counts[i]` entries of `enum_labels`/`enum_values`
/// belong to group `i`, in order. Every pointer is borrowed for the duration of the call.
#[repr(C)]
#[derive(Copy, Clone)]
pub struct quiver_csv_options_t {
    pub date_time_format: *const c_char,
    pub enum_attribute_names: *const *const c_char,
    pub enum_locale_names: *const *const c_char,
    pub enum_entry_counts: *const usize,
    pub enum_labels: *const *const c_char,
    pub enum_values: *const i64,
    pub enum_group_count: usize,
}

#[repr(C)]
pub struct quiver_database {
    _private: [u8; 0],
}
#[repr(C)]
pub struct quiver_element {
    _private: [u8; 0],
}
#[repr(C)]
pub struct quiver_lua_runner {
    _private: [u8; 0],
}

pub type quiver_database_t = quiver_database;
pub type quiver_element_t = quiver_element;
pub type quiver_lua_runner_t = quiver_lua_runner;
