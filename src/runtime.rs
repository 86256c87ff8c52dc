//! Quiver library loader and process-wide API singleton.
//!
//! This module is responsible for:
//! - Locating the Quiver C API dynamic library (`libquiver_c`) and its core dependency.
//! - Dynamically loading it and resolving ABI symbols into an [`Api`] table.
//! - Exposing a process-wide singleton [`Runtime`] via [`runtime()`].
//! - Accepting an already-resolved [`Api`] through [`install`] for engines linked into the
//!   process.
//!
//! ## Environment variables
//!
//! - `QUIVER_LIB_PATH` *(optional)*: load the C API library directly from this path.
//! - `QUIVER_LIB_DIR` *(optional)*: directory holding `libquiver_c` and `libquiver`. The core
//!   library is pre-loaded first so the C API library can resolve it.
//!
//! Without either variable the platform library name is handed to the system loader.
//!
//! ## Initialization semantics
//!
//! The runtime is initialized lazily on first use and stored in a global [`OnceLock`]. If
//! initialization fails, subsequent calls to [`runtime()`] return the same error (cloned).

use std::{
    env,
    path::{Path, PathBuf},
    sync::OnceLock,
};

use libloading::Library;

use crate::{api::Api, Error, Result};

/// Note that this stores `Result<Runtime>`, so a failed initialization is cached as well.
static RUNTIME: OnceLock<Result<Runtime>> = OnceLock::new();

#[cfg(target_os = "windows")]
const C_API_LIB: &str = "libquiver_c.dll";
#[cfg(target_os = "windows")]
const CORE_LIB: &str = "libquiver.dll";

#[cfg(target_os = "macos")]
const C_API_LIB: &str = "libquiver_c.dylib";
#[cfg(target_os = "macos")]
const CORE_LIB: &str = "libquiver.dylib";

#[cfg(not(any(target_os = "windows", target_os = "macos")))]
const C_API_LIB: &str = "libquiver_c.so";
#[cfg(not(any(target_os = "windows", target_os = "macos")))]
const CORE_LIB: &str = "libquiver.so";

/// Loaded Quiver library and resolved ABI table.
///
/// - `_libs` keeps the loaded libraries alive for the lifetime of the process. It is empty when
///   the table was registered with [`install`].
/// - `path` is the file the C API library was loaded from, if it was loaded by path.
pub struct Runtime {
    _libs: Vec<Library>,
    /// ABI entrypoints.
    pub api: Api,
    pub path: Option<PathBuf>,
}

/// Get the process-wide Quiver runtime singleton.
///
/// # Errors
///
/// Returns [`Error::Runtime`] if the library cannot be loaded or a required symbol is missing.
pub fn runtime() -> Result<&'static Runtime> {
    match RUNTIME.get_or_init(Runtime::init) {
        Ok(rt) => Ok(rt),
        Err(e) => Err(e.clone()),
    }
}

/// Register an already-resolved function table as the process runtime.
///
/// Only the first registration (or the first [`runtime()`] call) wins; later calls return the
/// existing runtime and drop `api`.
pub fn install(api: Api) -> Result<&'static Runtime> {
    match RUNTIME.get_or_init(|| {
        Ok(Runtime {
            _libs: Vec::new(),
            api,
            path: None,
        })
    }) {
        Ok(rt) => Ok(rt),
        Err(e) => Err(e.clone()),
    }
}

impl Runtime {
    fn init() -> Result<Self> {
        if let Ok(p) = env::var("QUIVER_LIB_PATH") {
            return unsafe { Self::load(Vec::new(), PathBuf::from(p)) };
        }

        if let Ok(d) = env::var("QUIVER_LIB_DIR") {
            let dir = PathBuf::from(d);
            let mut libs = Vec::new();
            let core = dir.join(CORE_LIB);
            if core.exists() {
                libs.push(unsafe { open(&core) }?);
            }
            return unsafe { Self::load(libs, dir.join(C_API_LIB)) };
        }

        // The core library may be statically linked or already resolvable; ignore a miss.
        let mut libs = Vec::new();
        match unsafe { Library::new(CORE_LIB) } {
            Ok(lib) => libs.push(lib),
            Err(e) => tracing::debug!("pre-loading {CORE_LIB} skipped: {e}"),
        }
        unsafe { Self::load(libs, PathBuf::from(C_API_LIB)) }
    }

    /// Load the C API library from `path` and resolve its ABI.
    ///
    /// # Safety
    ///
    /// `path` must name a Quiver C API library built for this process whose exports match
    /// [`Api`]. Calling through a mismatched table is undefined behaviour.
    unsafe fn load(mut libs: Vec<Library>, path: PathBuf) -> Result<Self> {
        let lib = open(&path)?;
        let api = Api::load(&lib).map_err(|e| Error::Runtime {
            message: format!(
                "Failed to resolve Quiver ABI symbols from '{}': {e}",
                path.display()
            ),
        })?;
        tracing::debug!(path = %path.display(), "loaded Quiver C API library");
        libs.push(lib);
        Ok(Self {
            _libs: libs,
            api,
            path: Some(path),
        })
    }
}

unsafe fn open(path: &Path) -> Result<Library> {
    Library::new(path).map_err(|e| Error::Runtime {
        message: format!("Failed to load Quiver library '{}': {e}", path.display()),
    })
}
