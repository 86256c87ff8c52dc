//! CSV export and import.
use std::{marker::PhantomData, path::Path};

use indexmap::IndexMap;

use crate::{
    error::check,
    keepalive::Keepalive,
    sys::{self, quiver_csv_options_t},
    Database, Error, Result,
};

/// Options for CSV export and import.
///
/// `enum_labels` maps attribute → locale → label → stored integer value. It lets an integer
/// column be written and read as human-readable labels.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CsvOptions {
    /// strftime-style format for date-time columns; empty keeps the stored text.
    pub date_time_format: String,
    pub enum_labels: IndexMap<String, IndexMap<String, IndexMap<String, i64>>>,
}

impl CsvOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn date_time_format(mut self, format: impl Into<String>) -> Self {
        self.date_time_format = format.into();
        self
    }

    /// Add one `label = value` entry for `attribute` in `locale`.
    pub fn enum_label(
        mut self,
        attribute: impl Into<String>,
        locale: impl Into<String>,
        label: impl Into<String>,
        value: i64,
    ) -> Self {
        self.enum_labels
            .entry(attribute.into())
            .or_default()
            .entry(locale.into())
            .or_default()
            .insert(label.into(), value);
        self
    }
}

/// Options struct whose pointers borrow a keepalive.
pub(crate) struct RawCsvOptions<'k> {
    raw: quiver_csv_options_t,
    _arena: PhantomData<&'k Keepalive>,
}

impl RawCsvOptions<'_> {
    pub(crate) fn as_ptr(&self) -> *const quiver_csv_options_t {
        &self.raw
    }

    #[cfg(test)]
    fn raw(&self) -> &quiver_csv_options_t {
        &self.raw
    }
}

/// Flatten the nested label mapping into one group per `(attribute, locale)` pair.
pub(crate) fn marshal_csv_options<'k>(
    ka: &'k Keepalive,
    options: &CsvOptions,
) -> Result<RawCsvOptions<'k>> {
    let date_time_format = ka.str(&options.date_time_format, "date time format")?.as_ptr();

    let mut attributes = Vec::new();
    let mut locales = Vec::new();
    let mut counts = Vec::new();
    let mut labels = Vec::new();
    let mut values = Vec::new();
    for (attribute, by_locale) in &options.enum_labels {
        for (locale, entries) in by_locale {
            attributes.push(attribute.as_str());
            locales.push(locale.as_str());
            counts.push(entries.len());
            for (label, value) in entries {
                labels.push(label.as_str());
                values.push(*value);
            }
        }
    }

    let raw = sys::quiver_csv_options_t {
        date_time_format,
        enum_attribute_names: ka.strs(&attributes, "enum attribute")?.as_ptr(),
        enum_locale_names: ka.strs(&locales, "enum locale")?.as_ptr(),
        enum_entry_counts: ka.array(&counts).as_ptr(),
        enum_labels: ka.strs(&labels, "enum label")?.as_ptr(),
        enum_values: ka.array(&values).as_ptr(),
        enum_group_count: attributes.len(),
    };
    Ok(RawCsvOptions {
        raw,
        _arena: PhantomData,
    })
}

fn path_str<'p>(path: &'p Path) -> Result<&'p str> {
    path.to_str().ok_or_else(|| Error::Utf8 {
        what: "csv path".to_owned(),
    })
}

impl Database {
    /// Export a collection (empty `group`) or one of its groups to a CSV file.
    pub fn export_csv(
        &self,
        collection: &str,
        group: &str,
        path: impl AsRef<Path>,
        options: Option<&CsvOptions>,
    ) -> Result<()> {
        let db = self.ptr()?;
        let ka = Keepalive::new();
        let c = ka.str(collection, "collection")?;
        let g = ka.str(group, "group")?;
        let p = ka.str(path_str(path.as_ref())?, "csv path")?;
        let defaults = CsvOptions::default();
        let opts = marshal_csv_options(&ka, options.unwrap_or(&defaults))?;
        check(self.api, unsafe {
            (self.api.quiver_database_export_csv)(
                db,
                c.as_ptr(),
                g.as_ptr(),
                p.as_ptr(),
                opts.as_ptr(),
            )
        })
    }

    /// Import a CSV file into a collection (empty `group`) or one of its groups.
    pub fn import_csv(
        &self,
        collection: &str,
        group: &str,
        path: impl AsRef<Path>,
        options: Option<&CsvOptions>,
    ) -> Result<()> {
        let db = self.ptr()?;
        let ka = Keepalive::new();
        let c = ka.str(collection, "collection")?;
        let g = ka.str(group, "group")?;
        let p = ka.str(path_str(path.as_ref())?, "csv path")?;
        let defaults = CsvOptions::default();
        let opts = marshal_csv_options(&ka, options.unwrap_or(&defaults))?;
        check(self.api, unsafe {
            (self.api.quiver_database_import_csv)(
                db,
                c.as_ptr(),
                g.as_ptr(),
                p.as_ptr(),
                opts.as_ptr(),
            )
        })
    }
}
