//! Resolved Quiver ABI entrypoints.
//!
//! [`Api`] is a plain table of `unsafe extern "C"` function pointers. It is normally filled from a
//! dynamically loaded `libquiver_c` via [`Api::load`], but every field is public so an engine that
//! is linked into the process can be registered directly through
//! [`runtime::install`](crate::runtime::install).
#![allow(non_camel_case_types)]
#![allow(non_snake_case)]
use libloading::{Library, Symbol};
use std::os::raw::{c_char, c_int, c_void};

use crate::sys::*;

macro_rules! api_table {
    ($( $name:ident : fn($($arg:ty),* $(,)?) $(-> $ret:ty)? ; )*) => {
        /// Function table for the Quiver C ABI.
        ///
        /// Field names match the exported symbol names one to one.
        pub struct Api {
            $( pub $name: unsafe extern "C" fn($($arg),*) $(-> $ret)?, )*
        }

        impl Api {
            /// Resolve every ABI symbol from `lib`.
            ///
            /// # Safety
            ///
            /// `lib` must be a Quiver C API library whose exported functions have exactly the
            /// signatures declared in this table. The returned pointers are only valid while
            /// `lib` stays loaded.
            pub unsafe fn load(lib: &Library) -> Result<Self, libloading::Error> {
                unsafe fn get<T: Copy>(
                    lib: &Library,
                    name: &'static [u8],
                ) -> Result<T, libloading::Error> {
                    let sym: Symbol<T> = lib.get::<T>(name)?;
                    Ok(*sym)
                }
                Ok(Self {
                    $( $name: get(lib, concat!(stringify!($name), "\0").as_bytes())?, )*
                })
            }
        }
    };
}

api_table! {
    // common
    quiver_version: fn() -> *const c_char;
    quiver_get_last_error: fn() -> *const c_char;
    quiver_clear_last_error: fn();

    // lifecycle
    quiver_database_options_default: fn() -> quiver_database_options_t;
    quiver_database_open: fn(
        *const c_char,
        *const quiver_database_options_t,
        *mut *mut quiver_database_t,
    ) -> quiver_error_t;
    quiver_database_from_migrations: fn(
        *const c_char,
        *const c_char,
        *const quiver_database_options_t,
        *mut *mut quiver_database_t,
    ) -> quiver_error_t;
    quiver_database_from_schema: fn(
        *const c_char,
        *const c_char,
        *const quiver_database_options_t,
        *mut *mut quiver_database_t,
    ) -> quiver_error_t;
    quiver_database_close: fn(*mut quiver_database_t) -> quiver_error_t;
    quiver_database_is_healthy: fn(*mut quiver_database_t, *mut c_int) -> quiver_error_t;
    quiver_database_path: fn(*mut quiver_database_t, *mut *const c_char) -> quiver_error_t;
    quiver_database_current_version: fn(*mut quiver_database_t, *mut i64) -> quiver_error_t;
    quiver_database_describe: fn(*mut quiver_database_t) -> quiver_error_t;

    // element builder
    quiver_element_create: fn(*mut *mut quiver_element_t) -> quiver_error_t;
    quiver_element_destroy: fn(*mut quiver_element_t) -> quiver_error_t;
    quiver_element_clear: fn(*mut quiver_element_t) -> quiver_error_t;
    quiver_element_set_integer: fn(*mut quiver_element_t, *const c_char, i64) -> quiver_error_t;
    quiver_element_set_float: fn(*mut quiver_element_t, *const c_char, f64) -> quiver_error_t;
    quiver_element_set_string: fn(
        *mut quiver_element_t,
        *const c_char,
        *const c_char,
    ) -> quiver_error_t;
    quiver_element_set_null: fn(*mut quiver_element_t, *const c_char) -> quiver_error_t;
    quiver_element_set_array_integer: fn(
        *mut quiver_element_t,
        *const c_char,
        *const i64,
        i32,
    ) -> quiver_error_t;
    quiver_element_set_array_float: fn(
        *mut quiver_element_t,
        *const c_char,
        *const f64,
        i32,
    ) -> quiver_error_t;
    quiver_element_set_array_string: fn(
        *mut quiver_element_t,
        *const c_char,
        *const *const c_char,
        i32,
    ) -> quiver_error_t;
    quiver_element_has_scalars: fn(*mut quiver_element_t, *mut c_int) -> quiver_error_t;
    quiver_element_has_arrays: fn(*mut quiver_element_t, *mut c_int) -> quiver_error_t;
    quiver_element_scalar_count: fn(*mut quiver_element_t, *mut usize) -> quiver_error_t;
    quiver_element_array_count: fn(*mut quiver_element_t, *mut usize) -> quiver_error_t;
    quiver_element_to_string: fn(*mut quiver_element_t, *mut *mut c_char) -> quiver_error_t;
    quiver_element_free_string: fn(*mut c_char) -> quiver_error_t;

    // element writes
    quiver_database_create_element: fn(
        *mut quiver_database_t,
        *const c_char,
        *mut quiver_element_t,
        *mut i64,
    ) -> quiver_error_t;
    quiver_database_update_element: fn(
        *mut quiver_database_t,
        *const c_char,
        i64,
        *const quiver_element_t,
    ) -> quiver_error_t;
    quiver_database_delete_element: fn(
        *mut quiver_database_t,
        *const c_char,
        i64,
    ) -> quiver_error_t;

    // attribute updates
    quiver_database_update_scalar_integer: fn(
        *mut quiver_database_t,
        *const c_char,
        *const c_char,
        i64,
        i64,
    ) -> quiver_error_t;
    quiver_database_update_scalar_float: fn(
        *mut quiver_database_t,
        *const c_char,
        *const c_char,
        i64,
        f64,
    ) -> quiver_error_t;
    quiver_database_update_scalar_string: fn(
        *mut quiver_database_t,
        *const c_char,
        *const c_char,
        i64,
        *const c_char,
    ) -> quiver_error_t;
    quiver_database_update_vector_integers: fn(
        *mut quiver_database_t,
        *const c_char,
        *const c_char,
        i64,
        *const i64,
        usize,
    ) -> quiver_error_t;
    quiver_database_update_vector_floats: fn(
        *mut quiver_database_t,
        *const c_char,
        *const c_char,
        i64,
        *const f64,
        usize,
    ) -> quiver_error_t;
    quiver_database_update_vector_strings: fn(
        *mut quiver_database_t,
        *const c_char,
        *const c_char,
        i64,
        *const *const c_char,
        usize,
    ) -> quiver_error_t;
    quiver_database_update_set_integers: fn(
        *mut quiver_database_t,
        *const c_char,
        *const c_char,
        i64,
        *const i64,
        usize,
    ) -> quiver_error_t;
    quiver_database_update_set_floats: fn(
        *mut quiver_database_t,
        *const c_char,
        *const c_char,
        i64,
        *const f64,
        usize,
    ) -> quiver_error_t;
    quiver_database_update_set_strings: fn(
        *mut quiver_database_t,
        *const c_char,
        *const c_char,
        i64,
        *const *const c_char,
        usize,
    ) -> quiver_error_t;

    // relations
    quiver_database_update_scalar_relation: fn(
        *mut quiver_database_t,
        *const c_char,
        *const c_char,
        *const c_char,
        *const c_char,
    ) -> quiver_error_t;
    quiver_database_read_scalar_relation: fn(
        *mut quiver_database_t,
        *const c_char,
        *const c_char,
        *mut *mut *mut c_char,
        *mut usize,
    ) -> quiver_error_t;

    // scalar reads
    quiver_database_read_scalar_integers: fn(
        *mut quiver_database_t,
        *const c_char,
        *const c_char,
        *mut *mut i64,
        *mut usize,
    ) -> quiver_error_t;
    quiver_database_read_scalar_floats: fn(
        *mut quiver_database_t,
        *const c_char,
        *const c_char,
        *mut *mut f64,
        *mut usize,
    ) -> quiver_error_t;
    quiver_database_read_scalar_strings: fn(
        *mut quiver_database_t,
        *const c_char,
        *const c_char,
        *mut *mut *mut c_char,
        *mut usize,
    ) -> quiver_error_t;
    quiver_database_read_scalar_integer_by_id: fn(
        *mut quiver_database_t,
        *const c_char,
        *const c_char,
        i64,
        *mut i64,
        *mut c_int,
    ) -> quiver_error_t;
    quiver_database_read_scalar_float_by_id: fn(
        *mut quiver_database_t,
        *const c_char,
        *const c_char,
        i64,
        *mut f64,
        *mut c_int,
    ) -> quiver_error_t;
    quiver_database_read_scalar_string_by_id: fn(
        *mut quiver_database_t,
        *const c_char,
        *const c_char,
        i64,
        *mut *mut c_char,
        *mut c_int,
    ) -> quiver_error_t;

    // vector reads
    quiver_database_read_vector_integers: fn(
        *mut quiver_database_t,
        *const c_char,
        *const c_char,
        *mut *mut *mut i64,
        *mut *mut usize,
        *mut usize,
    ) -> quiver_error_t;
    quiver_database_read_vector_floats: fn(
        *mut quiver_database_t,
        *const c_char,
        *const c_char,
        *mut *mut *mut f64,
        *mut *mut usize,
        *mut usize,
    ) -> quiver_error_t;
    quiver_database_read_vector_strings: fn(
        *mut quiver_database_t,
        *const c_char,
        *const c_char,
        *mut *mut *mut *mut c_char,
        *mut *mut usize,
        *mut usize,
    ) -> quiver_error_t;
    quiver_database_read_vector_integers_by_id: fn(
        *mut quiver_database_t,
        *const c_char,
        *const c_char,
        i64,
        *mut *mut i64,
        *mut usize,
    ) -> quiver_error_t;
    quiver_database_read_vector_floats_by_id: fn(
        *mut quiver_database_t,
        *const c_char,
        *const c_char,
        i64,
        *mut *mut f64,
        *mut usize,
    ) -> quiver_error_t;
    quiver_database_read_vector_strings_by_id: fn(
        *mut quiver_database_t,
        *const c_char,
        *const c_char,
        i64,
        *mut *mut *mut c_char,
        *mut usize,
    ) -> quiver_error_t;

    // set reads
    quiver_database_read_set_integers: fn(
        *mut quiver_database_t,
        *const c_char,
        *const c_char,
        *mut *mut *mut i64,
        *mut *mut usize,
        *mut usize,
    ) -> quiver_error_t;
    quiver_database_read_set_floats: fn(
        *mut quiver_database_t,
        *const c_char,
        *const c_char,
        *mut *mut *mut f64,
        *mut *mut usize,
        *mut usize,
    ) -> quiver_error_t;
    quiver_database_read_set_strings: fn(
        *mut quiver_database_t,
        *const c_char,
        *const c_char,
        *mut *mut *mut *mut c_char,
        *mut *mut usize,
        *mut usize,
    ) -> quiver_error_t;
    quiver_database_read_set_integers_by_id: fn(
        *mut quiver_database_t,
        *const c_char,
        *const c_char,
        i64,
        *mut *mut i64,
        *mut usize,
    ) -> quiver_error_t;
    quiver_database_read_set_floats_by_id: fn(
        *mut quiver_database_t,
        *const c_char,
        *const c_char,
        i64,
        *mut *mut f64,
        *mut usize,
    ) -> quiver_error_t;
    quiver_database_read_set_strings_by_id: fn(
        *mut quiver_database_t,
        *const c_char,
        *const c_char,
        i64,
        *mut *mut *mut c_char,
        *mut usize,
    ) -> quiver_error_t;

    quiver_database_read_element_ids: fn(
        *mut quiver_database_t,
        *const c_char,
        *mut *mut i64,
        *mut usize,
    ) -> quiver_error_t;

    // read buffer release
    quiver_database_free_integer_array: fn(*mut i64) -> quiver_error_t;
    quiver_database_free_float_array: fn(*mut f64) -> quiver_error_t;
    quiver_database_free_string_array: fn(*mut *mut c_char, usize) -> quiver_error_t;
    quiver_database_free_integer_vectors: fn(*mut *mut i64, *mut usize, usize) -> quiver_error_t;
    quiver_database_free_float_vectors: fn(*mut *mut f64, *mut usize, usize) -> quiver_error_t;
    quiver_database_free_string_vectors: fn(
        *mut *mut *mut c_char,
        *mut usize,
        usize,
    ) -> quiver_error_t;

    // metadata
    quiver_database_get_scalar_metadata: fn(
        *mut quiver_database_t,
        *const c_char,
        *const c_char,
        *mut quiver_scalar_metadata_t,
    ) -> quiver_error_t;
    quiver_database_get_vector_metadata: fn(
        *mut quiver_database_t,
        *const c_char,
        *const c_char,
        *mut quiver_group_metadata_t,
    ) -> quiver_error_t;
    quiver_database_get_set_metadata: fn(
        *mut quiver_database_t,
        *const c_char,
        *const c_char,
        *mut quiver_group_metadata_t,
    ) -> quiver_error_t;
    quiver_database_get_time_series_metadata: fn(
        *mut quiver_database_t,
        *const c_char,
        *const c_char,
        *mut quiver_group_metadata_t,
    ) -> quiver_error_t;
    quiver_database_free_scalar_metadata: fn(*mut quiver_scalar_metadata_t) -> quiver_error_t;
    quiver_database_free_group_metadata: fn(*mut quiver_group_metadata_t) -> quiver_error_t;
    quiver_database_list_scalar_attributes: fn(
        *mut quiver_database_t,
        *const c_char,
        *mut *mut quiver_scalar_metadata_t,
        *mut usize,
    ) -> quiver_error_t;
    quiver_database_list_vector_groups: fn(
        *mut quiver_database_t,
        *const c_char,
        *mut *mut quiver_group_metadata_t,
        *mut usize,
    ) -> quiver_error_t;
    quiver_database_list_set_groups: fn(
        *mut quiver_database_t,
        *const c_char,
        *mut *mut quiver_group_metadata_t,
        *mut usize,
    ) -> quiver_error_t;
    quiver_database_list_time_series_groups: fn(
        *mut quiver_database_t,
        *const c_char,
        *mut *mut quiver_group_metadata_t,
        *mut usize,
    ) -> quiver_error_t;
    quiver_database_free_scalar_metadata_array: fn(
        *mut quiver_scalar_metadata_t,
        usize,
    ) -> quiver_error_t;
    quiver_database_free_group_metadata_array: fn(
        *mut quiver_group_metadata_t,
        usize,
    ) -> quiver_error_t;

    // time series
    quiver_database_read_time_series_group: fn(
        *mut quiver_database_t,
        *const c_char,
        *const c_char,
        i64,
        *mut *mut *mut c_char,
        *mut *mut c_int,
        *mut *mut *mut c_void,
        *mut usize,
        *mut usize,
    ) -> quiver_error_t;
    quiver_database_update_time_series_group: fn(
        *mut quiver_database_t,
        *const c_char,
        *const c_char,
        i64,
        *const *const c_char,
        *const c_int,
        *const *const c_void,
        usize,
        usize,
    ) -> quiver_error_t;
    quiver_database_free_time_series_data: fn(
        *mut *mut c_char,
        *mut c_int,
        *mut *mut c_void,
        usize,
        usize,
    ) -> quiver_error_t;
    quiver_database_has_time_series_files: fn(
        *mut quiver_database_t,
        *const c_char,
        *mut c_int,
    ) -> quiver_error_t;
    quiver_database_list_time_series_files_columns: fn(
        *mut quiver_database_t,
        *const c_char,
        *mut *mut *mut c_char,
        *mut usize,
    ) -> quiver_error_t;
    quiver_database_read_time_series_files: fn(
        *mut quiver_database_t,
        *const c_char,
        *mut *mut *mut c_char,
        *mut *mut *mut c_char,
        *mut usize,
    ) -> quiver_error_t;
    quiver_database_update_time_series_files: fn(
        *mut quiver_database_t,
        *const c_char,
        *const *const c_char,
        *const *const c_char,
        usize,
    ) -> quiver_error_t;
    quiver_database_free_time_series_files: fn(
        *mut *mut c_char,
        *mut *mut c_char,
        usize,
    ) -> quiver_error_t;

    // queries
    quiver_database_query_string: fn(
        *mut quiver_database_t,
        *const c_char,
        *mut *mut c_char,
        *mut c_int,
    ) -> quiver_error_t;
    quiver_database_query_integer: fn(
        *mut quiver_database_t,
        *const c_char,
        *mut i64,
        *mut c_int,
    ) -> quiver_error_t;
    quiver_database_query_float: fn(
        *mut quiver_database_t,
        *const c_char,
        *mut f64,
        *mut c_int,
    ) -> quiver_error_t;
    quiver_database_query_string_params: fn(
        *mut quiver_database_t,
        *const c_char,
        *const c_int,
        *const *const c_void,
        usize,
        *mut *mut c_char,
        *mut c_int,
    ) -> quiver_error_t;
    quiver_database_query_integer_params: fn(
        *mut quiver_database_t,
        *const c_char,
        *const c_int,
        *const *const c_void,
        usize,
        *mut i64,
        *mut c_int,
    ) -> quiver_error_t;
    quiver_database_query_float_params: fn(
        *mut quiver_database_t,
        *const c_char,
        *const c_int,
        *const *const c_void,
        usize,
        *mut f64,
        *mut c_int,
    ) -> quiver_error_t;

    // csv
    quiver_database_export_csv: fn(
        *mut quiver_database_t,
        *const c_char,
        *const c_char,
        *const c_char,
        *const quiver_csv_options_t,
    ) -> quiver_error_t;
    quiver_database_import_csv: fn(
        *mut quiver_database_t,
        *const c_char,
        *const c_char,
        *const c_char,
        *const quiver_csv_options_t,
    ) -> quiver_error_t;

    // transactions
    quiver_database_begin_transaction: fn(*mut quiver_database_t) -> quiver_error_t;
    quiver_database_commit: fn(*mut quiver_database_t) -> quiver_error_t;
    quiver_database_rollback: fn(*mut quiver_database_t) -> quiver_error_t;
    quiver_database_in_transaction: fn(*mut quiver_database_t, *mut bool) -> quiver_error_t;

    // lua runner
    quiver_lua_runner_new: fn(
        *mut quiver_database_t,
        *mut *mut quiver_lua_runner_t,
    ) -> quiver_error_t;
    quiver_lua_runner_free: fn(*mut quiver_lua_runner_t) -> quiver_error_t;
    quiver_lua_runner_run: fn(*mut quiver_lua_runner_t, *const c_char) -> quiver_error_t;
    quiver_lua_runner_get_error: fn(*mut quiver_lua_runner_t, *mut *const c_char) -> quiver_error_t;
}
