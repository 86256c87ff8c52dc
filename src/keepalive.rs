//! Host buffers that must outlive a single native call.
//!
//! A [`Keepalive`] is created at the top of an operation, every string, cell and array passed to
//! the engine is stored in it, and it is dropped when the operation returns. Pointers come back as
//! [`Pinned`] values that borrow the arena, so none of them can escape it.
use std::{
    any::Any,
    cell::RefCell,
    ffi::CString,
    fmt,
    marker::PhantomData,
    os::raw::{c_char, c_void},
    ptr,
};

use crate::{Error, Result};

/// A pointer into a [`Keepalive`], valid for as long as the arena is borrowed.
pub struct Pinned<'k, T> {
    ptr: *const T,
    _arena: PhantomData<&'k Keepalive>,
}

impl<T> Clone for Pinned<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Pinned<'_, T> {}

impl<T> fmt::Debug for Pinned<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Pinned").field(&self.ptr).finish()
    }
}

impl<'k, T> Pinned<'k, T> {
    fn new(ptr: *const T) -> Self {
        Self {
            ptr,
            _arena: PhantomData,
        }
    }

    /// The null pointer, used for empty arrays and absent options.
    pub fn null() -> Self {
        Self::new(ptr::null())
    }

    pub fn as_ptr(self) -> *const T {
        self.ptr
    }

    pub fn is_null(self) -> bool {
        self.ptr.is_null()
    }

    /// Erase the pointee type, for `void*` cell arrays.
    pub fn erase(self) -> *const c_void {
        self.ptr.cast()
    }
}

/// Arena owning the host buffers of one native call.
#[derive(Default)]
pub struct Keepalive {
    slots: RefCell<Vec<Box<dyn Any>>>,
}

impl Keepalive {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of buffers held.
    pub fn len(&self) -> usize {
        self.slots.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// NUL-terminated copy of `s`. `what` names the string in the error if it holds a NUL byte.
    pub fn str(&self, s: &str, what: &str) -> Result<Pinned<'_, c_char>> {
        let c = CString::new(s).map_err(|_| Error::Nul {
            what: what.to_owned(),
        })?;
        let p = c.as_ptr();
        self.slots.borrow_mut().push(Box::new(c));
        Ok(Pinned::new(p))
    }

    /// Array of `const char*`, null when `items` is empty.
    ///
    /// Every string is stored before the pointer array that refers to it.
    pub fn strs<S: AsRef<str>>(
        &self,
        items: &[S],
        what: &str,
    ) -> Result<Pinned<'_, *const c_char>> {
        if items.is_empty() {
            return Ok(Pinned::null());
        }
        let ptrs = items
            .iter()
            .map(|s| self.str(s.as_ref(), what).map(Pinned::as_ptr))
            .collect::<Result<Vec<_>>>()?;
        Ok(self.array(&ptrs))
    }

    /// Like [`strs`](Self::strs) but `None` entries become null pointers.
    pub fn opt_strs<S: AsRef<str>>(
        &self,
        items: &[Option<S>],
        what: &str,
    ) -> Result<Pinned<'_, *const c_char>> {
        if items.is_empty() {
            return Ok(Pinned::null());
        }
        let ptrs = items
            .iter()
            .map(|s| match s {
                Some(s) => self.str(s.as_ref(), what).map(Pinned::as_ptr),
                None => Ok(ptr::null()),
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(self.array(&ptrs))
    }

    /// Copy of `values`, null when empty.
    pub fn array<T: Copy + 'static>(&self, values: &[T]) -> Pinned<'_, T> {
        if values.is_empty() {
            return Pinned::null();
        }
        let owned: Box<[T]> = values.into();
        let p = owned.as_ptr();
        self.slots.borrow_mut().push(Box::new(owned));
        Pinned::new(p)
    }

    /// Single heap cell holding `value`. Never null.
    pub fn cell<T: Copy + 'static>(&self, value: T) -> Pinned<'_, T> {
        let owned = Box::new(value);
        let p: *const T = &*owned;
        self.slots.borrow_mut().push(owned);
        Pinned::new(p)
    }
}
