use std::ffi::CStr;

use crate::{api::Api, sys};

pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the driver.
///
/// [`Error::Engine`] carries the engine's own message. Every other variant is raised on the Rust
/// side, before or after a native call, and names the attribute, column or row at fault.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("quiver error (code {code}): {message}")]
    Engine { code: i32, message: String },

    #[error("{resource} is closed")]
    Closed { resource: &'static str },

    #[error("unsupported type {type_name} for attribute '{attribute}'")]
    UnsupportedType {
        attribute: String,
        type_name: &'static str,
    },

    #[error(
        "array '{attribute}' must be homogeneous: element {index} is {actual}, expected {expected}"
    )]
    ArrayType {
        attribute: String,
        index: usize,
        expected: &'static str,
        actual: &'static str,
    },

    #[error("row {row} is missing column '{column}'")]
    MissingColumn { row: usize, column: String },

    #[error("column '{column}' expects {expected}, got {actual}")]
    WrongType {
        column: String,
        expected: &'static str,
        actual: &'static str,
    },

    #[error(
        "unsupported parameter type {type_name} at index {index}; \
         expected integer, float, text or null"
    )]
    UnsupportedParameter {
        index: usize,
        type_name: &'static str,
    },

    #[error("malformed input '{input}': {reason}")]
    MalformedInput { input: String, reason: String },

    #[error("{what} contains an interior NUL byte")]
    Nul { what: String },

    #[error("{what} is not valid UTF-8")]
    Utf8 { what: String },

    #[error("ABI contract violated: {message}")]
    Protocol { message: String },

    #[error("{message}")]
    Runtime { message: String },
}

impl Error {
    pub(crate) fn protocol(message: impl Into<String>) -> Self {
        Error::Protocol {
            message: message.into(),
        }
    }

    /// The engine-reported message, if this error came from the engine.
    pub fn engine_message(&self) -> Option<&str> {
        match self {
            Error::Engine { message, .. } => Some(message),
            _ => None,
        }
    }
}

/// Route a native status code through the last-error channel.
///
/// A nonzero status is always a failure. The thread-local message is read but never cleared, so
/// a later failure that does not set a message can still surface the previous one.
pub(crate) fn check(api: &Api, status: sys::quiver_error_t) -> Result<()> {
    if status == sys::QUIVER_OK {
        return Ok(());
    }
    let message = last_error(api).unwrap_or_else(|| "Unknown error".to_owned());
    tracing::debug!(code = status, %message, "quiver call failed");
    Err(Error::Engine {
        code: status,
        message,
    })
}

/// Current thread's last engine error, `None` when null or empty.
pub(crate) fn last_error(api: &Api) -> Option<String> {
    let p = unsafe { (api.quiver_get_last_error)() };
    unsafe { non_empty(p) }
}

/// Copy a borrowed, engine-owned C string if it is non-null and non-empty.
///
/// # Safety
///
/// `p` must be null or point to a NUL-terminated string that stays valid for this call.
pub(crate) unsafe fn non_empty(p: *const std::os::raw::c_char) -> Option<String> {
    if p.is_null() {
        return None;
    }
    let s = CStr::from_ptr(p).to_string_lossy().into_owned();
    if s.is_empty() {
        None
    } else {
        Some(s)
    }
}
