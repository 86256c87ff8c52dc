//! Scalar and collection decoding of engine-owned buffers.
//!
//! Every buffer the engine allocates for an out-parameter is wrapped in a guard *before* the call
//! that fills it. The call writes straight into the guard's fields and the guard's `Drop` runs the
//! matching free function, so the buffer is released on success, on decode failure and on unwind.
use std::{
    ffi::CStr,
    os::raw::{c_char, c_int},
    ptr, slice,
};

use crate::{api::Api, Error, Result};

/// Presence decoding: the value slot is meaningful only when `has_value` is nonzero.
pub(crate) fn present<T>(value: T, has_value: c_int) -> Option<T> {
    (has_value != 0).then_some(value)
}

/// Copy a NUL-terminated string without taking ownership of it.
///
/// # Safety
///
/// `p` must be non-null and point to a NUL-terminated string valid for this call.
pub(crate) unsafe fn decode_str(p: *const c_char, what: &str) -> Result<String> {
    CStr::from_ptr(p)
        .to_str()
        .map(str::to_owned)
        .map_err(|_| Error::Utf8 {
            what: what.to_owned(),
        })
}

/// Engine-allocated string released with `quiver_element_free_string`.
pub(crate) struct EngineString<'a> {
    api: &'a Api,
    pub(crate) ptr: *mut c_char,
}

impl<'a> EngineString<'a> {
    pub(crate) fn new(api: &'a Api) -> Self {
        Self {
            api,
            ptr: ptr::null_mut(),
        }
    }

    /// Decode the string, `None` if the engine left the slot null.
    pub(crate) fn decode(&self, what: &str) -> Result<Option<String>> {
        if self.ptr.is_null() {
            return Ok(None);
        }
        unsafe { decode_str(self.ptr, what) }.map(Some)
    }
}

impl Drop for EngineString<'_> {
    fn drop(&mut self) {
        if !self.ptr.is_null() {
            unsafe { (self.api.quiver_element_free_string)(self.ptr) };
        }
    }
}

/// Flat numeric array guards.
macro_rules! flat_array {
    ($name:ident, $t:ty, $free:ident) => {
        pub(crate) struct $name<'a> {
            api: &'a Api,
            pub(crate) ptr: *mut $t,
            pub(crate) len: usize,
        }

        impl<'a> $name<'a> {
            pub(crate) fn new(api: &'a Api) -> Self {
                Self {
                    api,
                    ptr: ptr::null_mut(),
                    len: 0,
                }
            }

            pub(crate) fn as_slice(&self) -> &[$t] {
                if self.len == 0 || self.ptr.is_null() {
                    &[]
                } else {
                    unsafe { slice::from_raw_parts(self.ptr, self.len) }
                }
            }
        }

        impl Drop for $name<'_> {
            fn drop(&mut self) {
                if !self.ptr.is_null() {
                    unsafe { (self.api.$free)(self.ptr) };
                }
            }
        }
    };
}

flat_array!(IntArray, i64, quiver_database_free_integer_array);
flat_array!(FloatArray, f64, quiver_database_free_float_array);

/// Array of engine-allocated strings released with `quiver_database_free_string_array`.
pub(crate) struct StringArray<'a> {
    api: &'a Api,
    pub(crate) ptr: *mut *mut c_char,
    pub(crate) len: usize,
}

impl<'a> StringArray<'a> {
    pub(crate) fn new(api: &'a Api) -> Self {
        Self {
            api,
            ptr: ptr::null_mut(),
            len: 0,
        }
    }

    fn entries(&self) -> &[*mut c_char] {
        if self.len == 0 || self.ptr.is_null() {
            &[]
        } else {
            unsafe { slice::from_raw_parts(self.ptr, self.len) }
        }
    }

    /// Null entries decode to `None`.
    pub(crate) fn to_opt_vec(&self, what: &str) -> Result<Vec<Option<String>>> {
        self.entries()
            .iter()
            .map(|&p| {
                if p.is_null() {
                    Ok(None)
                } else {
                    unsafe { decode_str(p, what) }.map(Some)
                }
            })
            .collect()
    }

    /// Null entries are a contract violation here.
    pub(crate) fn to_vec(&self, what: &str) -> Result<Vec<String>> {
        self.entries()
            .iter()
            .map(|&p| non_null_str(p, what))
            .collect()
    }
}

impl Drop for StringArray<'_> {
    fn drop(&mut self) {
        if !self.ptr.is_null() {
            unsafe { (self.api.quiver_database_free_string_array)(self.ptr, self.len) };
        }
    }
}

fn non_null_str(p: *const c_char, what: &str) -> Result<String> {
    if p.is_null() {
        return Err(Error::protocol(format!("null entry in {what}")));
    }
    unsafe { decode_str(p, what) }
}

/// Row slices of an engine jagged array. A null row or a zero size is an empty row.
///
/// # Safety
///
/// When `count` is nonzero and both arrays are non-null they must hold `count` entries, and each
/// non-null row must hold its size in values. The slices borrow engine memory and must not outlive
/// the guard that frees it.
unsafe fn jagged_rows<'a, T>(
    vectors: *const *mut T,
    sizes: *const usize,
    count: usize,
) -> Result<Vec<&'a [T]>> {
    if count == 0 {
        return Ok(Vec::new());
    }
    if vectors.is_null() || sizes.is_null() {
        return Err(Error::protocol(format!(
            "jagged arrays are null but count is {count}"
        )));
    }
    let rows = slice::from_raw_parts(vectors, count);
    let sizes = slice::from_raw_parts(sizes, count);
    Ok(rows
        .iter()
        .zip(sizes)
        .map(|(&row, &size)| {
            if row.is_null() || size == 0 {
                &[][..]
            } else {
                slice::from_raw_parts(row.cast_const(), size)
            }
        })
        .collect())
}

/// Jagged numeric array guards: one row per element, each with its own size.
macro_rules! jagged_array {
    ($name:ident, $t:ty, $free:ident) => {
        pub(crate) struct $name<'a> {
            api: &'a Api,
            pub(crate) vectors: *mut *mut $t,
            pub(crate) sizes: *mut usize,
            pub(crate) count: usize,
        }

        impl<'a> $name<'a> {
            pub(crate) fn new(api: &'a Api) -> Self {
                Self {
                    api,
                    vectors: ptr::null_mut(),
                    sizes: ptr::null_mut(),
                    count: 0,
                }
            }

            pub(crate) fn to_vec(&self) -> Result<Vec<Vec<$t>>> {
                let rows = unsafe { jagged_rows(self.vectors, self.sizes, self.count) }?;
                Ok(rows.into_iter().map(<[$t]>::to_vec).collect())
            }
        }

        impl Drop for $name<'_> {
            fn drop(&mut self) {
                if !self.vectors.is_null() {
                    unsafe { (self.api.$free)(self.vectors, self.sizes, self.count) };
                }
            }
        }
    };
}

jagged_array!(IntVectors, i64, quiver_database_free_integer_vectors);
jagged_array!(FloatVectors, f64, quiver_database_free_float_vectors);

pub(crate) struct StringVectors<'a> {
    api: &'a Api,
    pub(crate) vectors: *mut *mut *mut c_char,
    pub(crate) sizes: *mut usize,
    pub(crate) count: usize,
}

impl<'a> StringVectors<'a> {
    pub(crate) fn new(api: &'a Api) -> Self {
        Self {
            api,
            vectors: ptr::null_mut(),
            sizes: ptr::null_mut(),
            count: 0,
        }
    }

    pub(crate) fn to_vec(&self, what: &str) -> Result<Vec<Vec<String>>> {
        unsafe { jagged_rows(self.vectors, self.sizes, self.count) }?
            .into_iter()
            .map(|row| row.iter().map(|&p| non_null_str(p, what)).collect::<Result<_>>())
            .collect()
    }
}

impl Drop for StringVectors<'_> {
    fn drop(&mut self) {
        if !self.vectors.is_null() {
            unsafe {
                (self.api.quiver_database_free_string_vectors)(self.vectors, self.sizes, self.count)
            };
        }
    }
}

/// Element array setters take an `int32_t` count.
pub(crate) fn element_count(len: usize, attribute: &str) -> Result<i32> {
    i32::try_from(len).map_err(|_| {
        Error::protocol(format!(
            "array '{attribute}' has {len} entries, more than an element can hold"
        ))
    })
}
