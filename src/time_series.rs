//! Time-series groups and time-series file references.
use std::os::raw::{c_char, c_int};

use indexmap::IndexMap;

use crate::{
    api::Api,
    codec::{decode_str, StringArray},
    database::names,
    error::check,
    keepalive::Keepalive,
    table::{columns_for, encode, TableData},
    Database, Error, Result, Row,
};

/// Column paths released with `quiver_database_free_time_series_files`.
struct FilesData<'a> {
    api: &'a Api,
    columns: *mut *mut c_char,
    paths: *mut *mut c_char,
    count: usize,
}

impl Drop for FilesData<'_> {
    fn drop(&mut self) {
        if !self.columns.is_null() || !self.paths.is_null() {
            unsafe {
                (self.api.quiver_database_free_time_series_files)(
                    self.columns,
                    self.paths,
                    self.count,
                )
            };
        }
    }
}

impl Database {
    /// All rows of a time-series group for one element, dimension column first.
    pub fn read_time_series_group(
        &self,
        collection: &str,
        group: &str,
        id: i64,
    ) -> Result<Vec<Row>> {
        let db = self.ptr()?;
        let ka = Keepalive::new();
        let (c, g) = names(&ka, collection, group)?;
        let mut out = TableData::new(self.api);
        check(self.api, unsafe {
            (self.api.quiver_database_read_time_series_group)(
                db,
                c.as_ptr(),
                g.as_ptr(),
                id,
                &mut out.names,
                &mut out.types,
                &mut out.data,
                &mut out.col_count,
                &mut out.row_count,
            )
        })?;
        if out.col_count == 0 || out.row_count == 0 {
            return Ok(Vec::new());
        }
        let dimension = self
            .get_time_series_metadata(collection, group)?
            .dimension_column
            .ok_or_else(|| {
                Error::protocol(format!("time series group '{group}' has no dimension column"))
            })?;
        out.decode(&dimension)
    }

    /// Replace the rows of a time-series group for one element.
    ///
    /// Every row must carry the dimension column and every value column with exactly the declared
    /// kind; nothing is sent to the engine otherwise. An empty slice clears the group without
    /// consulting metadata.
    pub fn update_time_series_group(
        &self,
        collection: &str,
        group: &str,
        id: i64,
        rows: &[Row],
    ) -> Result<()> {
        let db = self.ptr()?;
        let ka = Keepalive::new();
        let (c, g) = names(&ka, collection, group)?;
        if rows.is_empty() {
            return check(self.api, unsafe {
                (self.api.quiver_database_update_time_series_group)(
                    db,
                    c.as_ptr(),
                    g.as_ptr(),
                    id,
                    std::ptr::null(),
                    std::ptr::null(),
                    std::ptr::null(),
                    0,
                    0,
                )
            });
        }
        let meta = self.get_time_series_metadata(collection, group)?;
        let columns = columns_for(&meta)?;
        let table = encode(&ka, rows, &columns)?;
        check(self.api, unsafe {
            (self.api.quiver_database_update_time_series_group)(
                db,
                c.as_ptr(),
                g.as_ptr(),
                id,
                table.names.as_ptr(),
                table.types.as_ptr(),
                table.data.as_ptr(),
                table.col_count,
                table.row_count,
            )
        })
    }

    pub fn has_time_series_files(&self, collection: &str) -> Result<bool> {
        let db = self.ptr()?;
        let ka = Keepalive::new();
        let c = ka.str(collection, "collection")?;
        let mut out: c_int = 0;
        check(self.api, unsafe {
            (self.api.quiver_database_has_time_series_files)(db, c.as_ptr(), &mut out)
        })?;
        Ok(out != 0)
    }

    pub fn list_time_series_files_columns(&self, collection: &str) -> Result<Vec<String>> {
        let db = self.ptr()?;
        let ka = Keepalive::new();
        let c = ka.str(collection, "collection")?;
        let mut out = StringArray::new(self.api);
        check(self.api, unsafe {
            (self.api.quiver_database_list_time_series_files_columns)(
                db,
                c.as_ptr(),
                &mut out.ptr,
                &mut out.len,
            )
        })?;
        out.to_vec("time series files column")
    }

    /// File path per column; `None` where no file is set.
    pub fn read_time_series_files(
        &self,
        collection: &str,
    ) -> Result<IndexMap<String, Option<String>>> {
        let db = self.ptr()?;
        let ka = Keepalive::new();
        let c = ka.str(collection, "collection")?;
        let mut out = FilesData {
            api: self.api,
            columns: std::ptr::null_mut(),
            paths: std::ptr::null_mut(),
            count: 0,
        };
        check(self.api, unsafe {
            (self.api.quiver_database_read_time_series_files)(
                db,
                c.as_ptr(),
                &mut out.columns,
                &mut out.paths,
                &mut out.count,
            )
        })?;
        if out.count == 0 {
            return Ok(IndexMap::new());
        }
        if out.columns.is_null() || out.paths.is_null() {
            return Err(Error::protocol("time series files arrays are null"));
        }
        let columns = unsafe { std::slice::from_raw_parts(out.columns, out.count) };
        let paths = unsafe { std::slice::from_raw_parts(out.paths, out.count) };
        let mut files = IndexMap::with_capacity(out.count);
        for (&column, &path) in columns.iter().zip(paths) {
            if column.is_null() {
                return Err(Error::protocol("null time series files column"));
            }
            let column = unsafe { decode_str(column, "time series files column") }?;
            let path = if path.is_null() {
                None
            } else {
                Some(unsafe { decode_str(path, "time series file path") }?)
            };
            files.insert(column, path);
        }
        Ok(files)
    }

    /// Set file paths per column; `None` clears a column. An empty map is a no-op.
    pub fn update_time_series_files<K, V>(
        &self,
        collection: &str,
        files: &[(K, Option<V>)],
    ) -> Result<()>
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let db = self.ptr()?;
        if files.is_empty() {
            return Ok(());
        }
        let ka = Keepalive::new();
        let c = ka.str(collection, "collection")?;
        let columns: Vec<&str> = files.iter().map(|(k, _)| k.as_ref()).collect();
        let paths: Vec<Option<&str>> = files
            .iter()
            .map(|(_, v)| v.as_ref().map(|p| p.as_ref()))
            .collect();
        let columns = ka.strs(&columns, "time series files column")?;
        let paths = ka.opt_strs(&paths, "time series file path")?;
        check(self.api, unsafe {
            (self.api.quiver_database_update_time_series_files)(
                db,
                c.as_ptr(),
                columns.as_ptr(),
                paths.as_ptr(),
                files.len(),
            )
        })
    }
}
