//! Rust driver for the Quiver embedded database.
//!
//! The engine is reached through its C ABI, loaded at runtime (see [`runtime`]). This crate
//! marshals Rust values into the ABI's pointer and count representation, releases every
//! engine-allocated buffer with its matching free function, and turns nonzero status codes into
//! [`Error`]s carrying the engine's last error message.
//!
//! ```no_run
//! use quiverdb::{Database, Element};
//!
//! # fn main() -> quiverdb::Result<()> {
//! let mut db = Database::from_schema("plant.db", "schema.sql")?;
//! let mut el = Element::new()?;
//! el.set("label", "Unit 1")?.set("capacity", 12.5)?;
//! let id = db.create_element("Plant", &el)?;
//! assert_eq!(db.read_scalar_float_by_id("Plant", "capacity", id)?, Some(12.5));
//! db.close()?;
//! # Ok(())
//! # }
//! ```
#![allow(unsafe_code)]

pub mod api;
mod codec;
mod csv;
mod database;
pub mod datetime;
mod element;
mod error;
mod keepalive;
mod lua;
mod metadata;
mod query;
mod read;
pub mod runtime;
pub mod sys;
pub mod table;
mod time_series;
mod transaction;
mod value;

pub use csv::CsvOptions;
pub use database::{Database, DatabaseOptions, LogLevel};
pub use datetime::{format_date_time, parse_date_time};
pub use element::Element;
pub use error::{Error, Result};
pub use keepalive::{Keepalive, Pinned};
pub use lua::LuaRunner;
pub use metadata::{GroupMetadata, ScalarMetadata};
pub use value::{DataType, Row, Value};

/// Version string reported by the loaded engine.
pub fn version() -> Result<String> {
    let api = &runtime::runtime()?.api;
    let p = unsafe { (api.quiver_version)() };
    if p.is_null() {
        return Err(Error::protocol("quiver_version returned null"));
    }
    unsafe { codec::decode_str(p, "version") }
}
