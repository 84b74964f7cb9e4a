use std::collections::HashMap;

use polars::functions::concat_df_diagonal;
use polars::prelude::*;

// ---------------------------------------------------------------------------
// Unified Table
// ---------------------------------------------------------------------------
//
// Every table in the data layer is a polars `DataFrame` whose columns are all
// `Utf8`, exactly as the source text had them. Numbers and dates are parsed
// only by the typed records in `schema`, so institution names like "007" or
// agents like "nan" survive untouched.

/// Stack frames in order. The result carries the union of all columns in
/// first-seen order; cells a source did not have are null.
pub fn stack(frames: Vec<DataFrame>) -> PolarsResult<DataFrame> {
    if frames.is_empty() {
        return Ok(DataFrame::empty());
    }
    concat_df_diagonal(&frames)
}

pub fn has_column(frame: &DataFrame, name: &str) -> bool {
    frame.get_column_names().contains(&name)
}

// ---------------------------------------------------------------------------
// Row-wise text access
// ---------------------------------------------------------------------------

/// Row-wise reader over a frame of text columns.
pub struct TextRows<'a> {
    columns: HashMap<&'a str, &'a Utf8Chunked>,
    height: usize,
}

impl<'a> TextRows<'a> {
    /// Fails when a column is not text.
    pub fn new(frame: &'a DataFrame) -> PolarsResult<Self> {
        let columns = frame
            .get_columns()
            .iter()
            .map(|s| s.utf8().map(|values| (s.name(), values)))
            .collect::<PolarsResult<HashMap<_, _>>>()?;
        Ok(Self {
            columns,
            height: frame.height(),
        })
    }

    pub fn len(&self) -> usize {
        self.height
    }

    pub fn row(&self, index: usize) -> Row<'_> {
        Row {
            columns: &self.columns,
            index,
        }
    }
}

/// One row of a [`TextRows`].
#[derive(Clone, Copy)]
pub struct Row<'r> {
    columns: &'r HashMap<&'r str, &'r Utf8Chunked>,
    index: usize,
}

impl<'r> Row<'r> {
    pub fn index(&self) -> usize {
        self.index
    }

    /// Trimmed cell text. `None` for a missing column, a null or a blank cell.
    pub fn text(&self, column: &str) -> Option<&'r str> {
        let values: &'r Utf8Chunked = self.columns.get(column).copied()?;
        values
            .get(self.index)
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}
