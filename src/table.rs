//! Row/column transposition for multi-column groups.
//!
//! Rows are [`Row`] maps keyed by column name. On the wire a table is three parallel arrays
//! (names, type tags, per-column data pointers) plus a column and a row count. The dimension column
//! is always a string. Writes send it first and reads move it first.
use std::{
    os::raw::{c_char, c_int, c_void},
    ptr, slice,
};

use crate::{
    api::Api,
    codec::decode_str,
    keepalive::{Keepalive, Pinned},
    DataType, Error, GroupMetadata, Result, Row, Value,
};

/// One column of a table, in wire order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub name: String,
    pub kind: DataType,
}

/// `[dimension, value columns...]` for a time-series group.
pub fn columns_for(meta: &GroupMetadata) -> Result<Vec<Column>> {
    let dimension = meta.dimension_column.as_ref().ok_or_else(|| {
        Error::protocol(format!("group '{}' has no dimension column", meta.group_name))
    })?;
    let mut columns = Vec::with_capacity(meta.value_columns.len() + 1);
    columns.push(Column {
        name: dimension.clone(),
        kind: DataType::String,
    });
    columns.extend(meta.value_columns.iter().map(|c| Column {
        name: c.name.clone(),
        kind: c.data_type,
    }));
    Ok(columns)
}

fn expected(kind: DataType) -> &'static str {
    match kind {
        DataType::Integer => "integer",
        DataType::Float => "float",
        _ => "text",
    }
}

fn accepts(kind: DataType, v: &Value) -> bool {
    match kind {
        DataType::Integer => matches!(v, Value::Integer(_)),
        DataType::Float => matches!(v, Value::Float(_)),
        _ => matches!(v, Value::Text(_)),
    }
}

/// Check every row against `columns` before anything is marshaled.
///
/// Kinds must match exactly: an integer is not accepted for a float column and a bool is not
/// accepted for an integer column.
pub fn validate(rows: &[Row], columns: &[Column]) -> Result<()> {
    for (index, row) in rows.iter().enumerate() {
        for column in columns {
            let v = row.get(&column.name).ok_or_else(|| Error::MissingColumn {
                row: index,
                column: column.name.clone(),
            })?;
            if !accepts(column.kind, v) {
                return Err(Error::WrongType {
                    column: column.name.clone(),
                    expected: expected(column.kind),
                    actual: v.type_name(),
                });
            }
        }
    }
    Ok(())
}

/// Column-major buffers for one update call.
pub(crate) struct Columnar<'k> {
    pub(crate) names: Pinned<'k, *const c_char>,
    pub(crate) types: Pinned<'k, c_int>,
    pub(crate) data: Pinned<'k, *const c_void>,
    pub(crate) col_count: usize,
    pub(crate) row_count: usize,
}

pub(crate) fn encode<'k>(
    ka: &'k Keepalive,
    rows: &[Row],
    columns: &[Column],
) -> Result<Columnar<'k>> {
    validate(rows, columns)?;

    let names: Vec<&str> = columns.iter().map(|c| c.name.as_str()).collect();
    let names = ka.strs(&names, "column name")?;
    let tags: Vec<c_int> = columns.iter().map(|c| c.kind.to_raw()).collect();
    let types = ka.array(&tags);

    let mut data = Vec::with_capacity(columns.len());
    for column in columns {
        let p = match column.kind {
            DataType::Integer => ka.array(&pick(rows, column, Value::as_i64)?).erase(),
            DataType::Float => ka.array(&pick(rows, column, Value::as_f64)?).erase(),
            _ => ka.strs(&pick(rows, column, Value::as_str)?, &column.name)?.erase(),
        };
        data.push(p);
    }

    Ok(Columnar {
        names,
        types,
        data: ka.array(&data),
        col_count: columns.len(),
        row_count: rows.len(),
    })
}

fn pick<'r, T>(
    rows: &'r [Row],
    column: &Column,
    get: impl Fn(&'r Value) -> Option<T>,
) -> Result<Vec<T>> {
    rows.iter()
        .map(|row| {
            row.get(&column.name)
                .and_then(&get)
                .ok_or_else(|| Error::protocol(format!("column '{}' changed kind", column.name)))
        })
        .collect()
}

/// Engine-allocated table, released with `quiver_database_free_time_series_data`.
pub(crate) struct TableData<'a> {
    api: &'a Api,
    pub(crate) names: *mut *mut c_char,
    pub(crate) types: *mut c_int,
    pub(crate) data: *mut *mut c_void,
    pub(crate) col_count: usize,
    pub(crate) row_count: usize,
}

impl<'a> TableData<'a> {
    pub(crate) fn new(api: &'a Api) -> Self {
        Self {
            api,
            names: ptr::null_mut(),
            types: ptr::null_mut(),
            data: ptr::null_mut(),
            col_count: 0,
            row_count: 0,
        }
    }

    /// Transpose back into rows with the `dimension` column first and value columns in wire
    /// order.
    pub(crate) fn decode(&self, dimension: &str) -> Result<Vec<Row>> {
        if self.col_count == 0 || self.row_count == 0 {
            return Ok(Vec::new());
        }
        if self.names.is_null() || self.types.is_null() || self.data.is_null() {
            return Err(Error::protocol("table arrays are null but counts are not"));
        }
        let names = unsafe { slice::from_raw_parts(self.names, self.col_count) };
        let types = unsafe { slice::from_raw_parts(self.types, self.col_count) };
        let data = unsafe { slice::from_raw_parts(self.data, self.col_count) };

        let mut columns = Vec::with_capacity(self.col_count);
        for ((&name, &tag), &cells) in names.iter().zip(types).zip(data) {
            if name.is_null() || cells.is_null() {
                return Err(Error::protocol("null column in table"));
            }
            let name = unsafe { decode_str(name, "column name") }?;
            columns.push((name, DataType::from_raw(tag)?, cells));
        }
        dimension_first(&mut columns, dimension)?;

        let mut rows = Vec::with_capacity(self.row_count);
        for r in 0..self.row_count {
            let mut row = Row::with_capacity(columns.len());
            for (name, kind, cells) in &columns {
                let v = unsafe { cell(*kind, *cells, r, name) }?;
                row.insert(name.clone(), v);
            }
            rows.push(row);
        }
        Ok(rows)
    }
}

fn dimension_first(
    columns: &mut [(String, DataType, *mut c_void)],
    dimension: &str,
) -> Result<()> {
    let at = columns
        .iter()
        .position(|(name, ..)| name == dimension)
        .ok_or_else(|| Error::protocol(format!("table has no '{dimension}' column")))?;
    columns[..=at].rotate_right(1);
    Ok(())
}

/// # Safety
///
/// `cells` must point to at least `r + 1` values of the type `kind` describes.
unsafe fn cell(kind: DataType, cells: *mut c_void, r: usize, name: &str) -> Result<Value> {
    Ok(match kind {
        DataType::Integer => Value::Integer(*cells.cast::<i64>().add(r)),
        DataType::Float => Value::Float(*cells.cast::<f64>().add(r)),
        DataType::String | DataType::DateTime => {
            let p = *cells.cast::<*const c_char>().add(r);
            if p.is_null() {
                Value::Null
            } else {
                Value::Text(decode_str(p, name)?)
            }
        }
        DataType::Null => Value::Null,
    })
}

impl Drop for TableData<'_> {
    fn drop(&mut self) {
        if !self.names.is_null() || !self.types.is_null() || !self.data.is_null() {
            unsafe {
                (self.api.quiver_database_free_time_series_data)(
                    self.names,
                    self.types,
                    self.data,
                    self.col_count,
                    self.row_count,
                )
            };
        }
    }
}
