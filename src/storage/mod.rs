//! In-memory row store for a single table.
//!
//! A [`Table`] is a plain value: the registry wraps each one in its own lock,
//! and [`codec::read_table`] hands one back detached from any registry.

pub mod codec;
pub mod predicate;

use std::collections::BTreeMap;

use snafu::prelude::*;

use crate::error::{
    ColumnCountMismatchSnafu, DuplicateColumnSnafu, IdentKind, InvalidIdentifierSnafu,
    NoColumnsSnafu, Result, UnknownColumnSnafu,
};
use crate::ident::{Ident, InvalidIdent};
pub use predicate::{Condition, Op, Predicate};

/// One record, keyed by column name. A caller may build a row with fewer
/// fields than the table declares; once inserted, a row holds exactly the
/// declared columns, with omitted ones set to `""`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row {
    fields: BTreeMap<String, String>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields.get(column).map(String::as_str)
    }

    pub fn set(&mut self, column: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.fields.insert(column.into(), value.into())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    fn fill(&mut self, columns: &[Ident]) {
        for column in columns {
            self.fields.entry(column.to_string()).or_default();
        }
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Row {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl<K: Into<String>, V: Into<String>, const N: usize> From<[(K, V); N]> for Row {
    fn from(pairs: [(K, V); N]) -> Self {
        pairs.into_iter().collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    name: Ident,
    columns: Vec<Ident>,
    rows: Vec<Row>,
}

impl Table {
    /// Validates the table name, then every column, in declaration order.
    pub fn new<I, S>(name: &str, columns: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let name = Ident::try_from(name).map_err(|InvalidIdent(name)| {
            InvalidIdentifierSnafu {
                kind: IdentKind::Table,
                name,
            }
            .build()
        })?;
        let mut declared: Vec<Ident> = Vec::new();
        for column in columns {
            let column = Ident::try_from(column.into()).map_err(|InvalidIdent(name)| {
                InvalidIdentifierSnafu {
                    kind: IdentKind::Column,
                    name,
                }
                .build()
            })?;
            ensure!(
                !declared.contains(&column),
                DuplicateColumnSnafu {
                    table: name.as_str(),
                    column: column.as_str(),
                }
            );
            declared.push(column);
        }
        ensure!(!declared.is_empty(), NoColumnsSnafu { table: name.as_str() });
        Ok(Self {
            name,
            columns: declared,
            rows: Vec::new(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn ident(&self) -> &Ident {
        &self.name
    }

    pub fn columns(&self) -> &[Ident] {
        &self.columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }

    /// Fails on the first field (in name order) that is not a declared column.
    pub fn check_fields(&self, row: &Row) -> Result<()> {
        match row.columns().find(|column| !self.has_column(column)) {
            Some(column) => UnknownColumnSnafu {
                table: self.name(),
                column,
            }
            .fail(),
            None => Ok(()),
        }
    }

    /// Appends `row`; declared columns it leaves out are stored as `""`,
    /// the same value a reload from disk would give them.
    pub fn insert(&mut self, mut row: Row) -> Result<()> {
        self.check_fields(&row)?;
        row.fill(&self.columns);
        self.rows.push(row);
        Ok(())
    }

    /// Positional insert: `values[i]` lands in `columns()[i]`.
    pub fn insert_values(&mut self, values: Vec<String>) -> Result<()> {
        ensure!(
            values.len() == self.columns.len(),
            ColumnCountMismatchSnafu {
                table: self.name(),
                expected: self.columns.len(),
                found: values.len(),
            }
        );
        let row = self
            .columns
            .iter()
            .map(|c| c.to_string())
            .zip(values)
            .collect();
        self.rows.push(row);
        Ok(())
    }

    /// Drops every matching row, keeping survivors in order. Returns the
    /// number of rows removed.
    pub fn delete(&mut self, predicate: &Predicate) -> usize {
        let before = self.rows.len();
        self.rows.retain(|row| !predicate.matches(row));
        before - self.rows.len()
    }

    /// Overwrites the fields in `values` on every matching row.
    /// Nothing is written unless every key of `values` is a declared column.
    pub fn update(&mut self, predicate: &Predicate, values: &Row) -> Result<usize> {
        self.check_fields(values)?;
        let mut updated = 0;
        for row in self.rows.iter_mut().filter(|row| predicate.matches(row)) {
            for (column, value) in values.iter() {
                row.set(column, value);
            }
            updated += 1;
        }
        Ok(updated)
    }

    pub fn search(&self, predicate: &Predicate) -> Vec<Row> {
        self.rows
            .iter()
            .filter(|row| predicate.matches(row))
            .cloned()
            .collect()
    }

    /// Values of `row` in column order; fields it lacks come out empty.
    pub fn record<'a>(&'a self, row: &'a Row) -> impl Iterator<Item = &'a str> + 'a {
        self.columns
            .iter()
            .map(move |column| row.get(column).unwrap_or(""))
    }
}
