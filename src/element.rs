//! Element builder: a native attribute bag filled before create/update calls.
use std::{
    fmt,
    marker::PhantomData,
    os::raw::{c_char, c_int},
    ptr::{self, NonNull},
    rc::Rc,
};

use crate::{
    api::Api,
    codec::{element_count, EngineString},
    error::check,
    keepalive::Keepalive,
    runtime::runtime,
    sys, Error, Result, Value,
};

/// Ordered attribute values for one element.
///
/// Setting the same attribute twice keeps the last value. Arrays take their kind from the first
/// entry; an empty array is sent as an integer array since no data is carried.
///
/// ```no_run
/// # fn main() -> quiverdb::Result<()> {
/// let mut el = quiverdb::Element::new()?;
/// el.set("label", "item 1")?
///     .set("count", 3)?
///     .set("scores", vec![1, 2, 3])?;
/// # Ok(())
/// # }
/// ```
pub struct Element {
    el: Option<NonNull<sys::quiver_element>>,
    api: &'static Api,
    _nosend: PhantomData<Rc<()>>,
}

impl Element {
    pub fn new() -> Result<Self> {
        let api = &runtime()?.api;
        let mut out: *mut sys::quiver_element_t = ptr::null_mut();
        check(api, unsafe { (api.quiver_element_create)(&mut out) })?;
        let el = NonNull::new(out)
            .ok_or_else(|| Error::protocol("quiver_element_create returned a null element"))?;
        Ok(Self {
            el: Some(el),
            api,
            _nosend: PhantomData,
        })
    }

    /// Build an element from `(name, value)` pairs, in order.
    pub fn from_pairs<I, K, V>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Value>,
    {
        let mut el = Self::new()?;
        for (name, value) in pairs {
            el.set(name.as_ref(), value)?;
        }
        Ok(el)
    }

    pub(crate) fn ptr(&self) -> Result<*mut sys::quiver_element_t> {
        self.el
            .map(NonNull::as_ptr)
            .ok_or(Error::Closed { resource: "Element" })
    }

    pub fn is_closed(&self) -> bool {
        self.el.is_none()
    }

    /// Set an attribute, returning the builder for chaining.
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> Result<&mut Self> {
        let el = self.ptr()?;
        let ka = Keepalive::new();
        let n = ka.str(name, "attribute name")?.as_ptr();
        let api = self.api;
        // Bool is matched before Integer so the 0/1 mapping stays explicit.
        let rc = match value.into() {
            Value::Null => unsafe { (api.quiver_element_set_null)(el, n) },
            Value::Bool(b) => unsafe { (api.quiver_element_set_integer)(el, n, i64::from(b)) },
            Value::Integer(v) => unsafe { (api.quiver_element_set_integer)(el, n, v) },
            Value::Float(v) => unsafe { (api.quiver_element_set_float)(el, n, v) },
            Value::Text(s) => {
                let s = ka.str(&s, name)?;
                unsafe { (api.quiver_element_set_string)(el, n, s.as_ptr()) }
            }
            Value::Array(items) => set_array(api, &ka, el, n, name, &items)?,
        };
        check(api, rc)?;
        Ok(self)
    }

    /// Remove every attribute set so far.
    pub fn clear(&mut self) -> Result<()> {
        let el = self.ptr()?;
        check(self.api, unsafe { (self.api.quiver_element_clear)(el) })
    }

    pub fn has_scalars(&self) -> Result<bool> {
        let el = self.ptr()?;
        let mut out: c_int = 0;
        check(self.api, unsafe { (self.api.quiver_element_has_scalars)(el, &mut out) })?;
        Ok(out != 0)
    }

    pub fn has_arrays(&self) -> Result<bool> {
        let el = self.ptr()?;
        let mut out: c_int = 0;
        check(self.api, unsafe { (self.api.quiver_element_has_arrays)(el, &mut out) })?;
        Ok(out != 0)
    }

    pub fn scalar_count(&self) -> Result<usize> {
        let el = self.ptr()?;
        let mut out = 0usize;
        check(self.api, unsafe { (self.api.quiver_element_scalar_count)(el, &mut out) })?;
        Ok(out)
    }

    pub fn array_count(&self) -> Result<usize> {
        let el = self.ptr()?;
        let mut out = 0usize;
        check(self.api, unsafe { (self.api.quiver_element_array_count)(el, &mut out) })?;
        Ok(out)
    }

    /// Engine rendering of the element's contents.
    pub fn render(&self) -> Result<String> {
        let el = self.ptr()?;
        let mut out = EngineString::new(self.api);
        check(self.api, unsafe {
            (self.api.quiver_element_to_string)(el, &mut out.ptr)
        })?;
        Ok(out.decode("element rendering")?.unwrap_or_default())
    }

    /// Release the native element. Calling it again is a no-op.
    pub fn close(&mut self) -> Result<()> {
        match self.el.take() {
            Some(el) => check(self.api, unsafe { (self.api.quiver_element_destroy)(el.as_ptr()) }),
            None => Ok(()),
        }
    }
}

fn set_array(
    api: &Api,
    ka: &Keepalive,
    el: *mut sys::quiver_element_t,
    n: *const c_char,
    name: &str,
    items: &[Value],
) -> Result<sys::quiver_error_t> {
    let Some(first) = items.first() else {
        return Ok(unsafe { (api.quiver_element_set_array_integer)(el, n, ptr::null(), 0) });
    };
    let count = element_count(items.len(), name)?;
    let rc = match first {
        Value::Bool(_) | Value::Integer(_) => {
            let values = collect(name, items, "integer", |v| match v {
                Value::Integer(i) => Some(*i),
                Value::Bool(b) => Some(i64::from(*b)),
                _ => None,
            })?;
            let arr = ka.array(&values);
            unsafe { (api.quiver_element_set_array_integer)(el, n, arr.as_ptr(), count) }
        }
        Value::Float(_) => {
            let values = collect(name, items, "float", |v| match v {
                Value::Float(f) => Some(*f),
                Value::Integer(i) => Some(*i as f64),
                _ => None,
            })?;
            let arr = ka.array(&values);
            unsafe { (api.quiver_element_set_array_float)(el, n, arr.as_ptr(), count) }
        }
        Value::Text(_) => {
            let values = collect(name, items, "text", |v| v.as_str())?;
            let arr = ka.strs(&values, name)?;
            unsafe { (api.quiver_element_set_array_string)(el, n, arr.as_ptr(), count) }
        }
        Value::Null | Value::Array(_) => return Err(unsupported_entry(name, first)),
    };
    Ok(rc)
}

fn collect<'v, T>(
    name: &str,
    items: &'v [Value],
    expected: &'static str,
    pick: impl Fn(&'v Value) -> Option<T>,
) -> Result<Vec<T>> {
    items
        .iter()
        .enumerate()
        .map(|(index, v)| match v {
            Value::Null | Value::Array(_) => Err(unsupported_entry(name, v)),
            _ => pick(v).ok_or_else(|| Error::ArrayType {
                attribute: name.to_owned(),
                index,
                expected,
                actual: v.type_name(),
            }),
        })
        .collect()
}

fn unsupported_entry(name: &str, v: &Value) -> Error {
    Error::UnsupportedType {
        attribute: name.to_owned(),
        type_name: match v {
            Value::Null => "array of null",
            _ => "nested array",
        },
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_closed() {
            return f.write_str("Element(closed)");
        }
        match self.render() {
            Ok(s) => f.write_str(&s),
            Err(e) => write!(f, "Element(<{e}>)"),
        }
    }
}

impl fmt::Debug for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Element")
            .field("closed", &self.is_closed())
            .finish()
    }
}

impl Drop for Element {
    fn drop(&mut self) {
        if let Some(el) = self.el.take() {
            let rc = unsafe { (self.api.quiver_element_destroy)(el.as_ptr()) };
            tracing::debug!(rc, "released element on drop");
        }
    }
}
