//! Table registry and the CRUD operations over it.
//!
//! ## Locking
//!
//! A [`Database`] holds one mutex over its name→table map, and every table
//! sits behind a mutex of its own inside that map. Operations take the
//! database lock, then the table lock, and hold both until they return.
//! The table guard borrows from the database guard, so it cannot outlive it
//! and the order cannot be inverted:
//!
//! ```text
//! tables.lock()  ──►  tables[name].lock()  ──►  work  ──►  drop table guard  ──►  drop tables guard
//! ```
//!
//! All calls against one database are serialized, including calls on
//! unrelated tables. There is no reader/writer split.

mod persist;

use hashbrown::HashMap;
use parking_lot::Mutex;
use snafu::prelude::*;

use crate::config::Config;
use crate::error::{Result, TableAlreadyExistsSnafu, TableNotFoundSnafu};
use crate::ident::Ident;
use crate::storage::{Predicate, Row, Table};

type Tables = HashMap<Ident, Mutex<Table>>;

#[derive(Debug)]
pub struct Database {
    name: String,
    config: Config,
    tables: Mutex<Tables>,
}

impl Database {
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_config(name, Config::default())
    }

    pub fn with_config(name: impl Into<String>, config: Config) -> Self {
        Self {
            name: name.into(),
            config,
            tables: Mutex::new(HashMap::new()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Registers an empty table. Names are checked before existence, so an
    /// invalid name reports `InvalidIdentifier` even if it collides.
    pub fn create_table<I, S>(&self, name: &str, columns: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut tables = self.tables.lock();
        let table = Table::new(name, columns)?;
        ensure!(!tables.contains_key(name), TableAlreadyExistsSnafu { name });
        tracing::debug!("created table {} ({} columns)", name, table.columns().len());
        tables.insert(table.ident().clone(), Mutex::new(table));
        Ok(())
    }

    /// Snapshot of the table's columns and rows at the time of the call.
    pub fn get_table(&self, name: &str) -> Result<Table> {
        self.with_table(name, |table| Ok(table.clone()))
    }

    /// Names of all registered tables, sorted.
    pub fn table_names(&self) -> Vec<String> {
        let tables = self.tables.lock();
        let mut names: Vec<String> = tables.keys().map(|k| k.to_string()).collect();
        names.sort();
        names
    }

    pub fn insert(&self, table: &str, row: Row) -> Result<()> {
        self.with_table(table, |t| t.insert(row))?;
        tracing::trace!("inserted 1 row into {}", table);
        Ok(())
    }

    /// Positional insert, values in declared column order.
    pub fn insert_values<I, S>(&self, table: &str, values: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let values: Vec<String> = values.into_iter().map(Into::into).collect();
        self.with_table(table, |t| t.insert_values(values))?;
        tracing::trace!("inserted 1 row into {}", table);
        Ok(())
    }

    /// Removes every row matching `predicate`; returns how many went.
    pub fn delete(&self, table: &str, predicate: &Predicate) -> Result<usize> {
        let deleted = self.with_table(table, |t| Ok(t.delete(predicate)))?;
        tracing::debug!("deleted {} row(s) from {} where {}", deleted, table, predicate);
        Ok(deleted)
    }

    /// Applies `values` to every row matching `predicate`; returns how many
    /// rows were touched.
    pub fn update(&self, table: &str, predicate: &Predicate, values: Row) -> Result<usize> {
        let updated = self.with_table(table, |t| t.update(predicate, &values))?;
        tracing::debug!("updated {} row(s) in {} where {}", updated, table, predicate);
        Ok(updated)
    }

    pub fn search(&self, table: &str, predicate: &Predicate) -> Result<Vec<Row>> {
        self.with_table(table, |t| Ok(t.search(predicate)))
    }

    /// [`search`](Self::search), plus the table's columns, read under the
    /// same lock.
    pub fn select(&self, table: &str, predicate: &Predicate) -> Result<(Vec<Ident>, Vec<Row>)> {
        self.with_table(table, |t| Ok((t.columns().to_vec(), t.search(predicate))))
    }

    /// Runs `f` with the database lock and then the table lock held.
    fn with_table<R>(&self, name: &str, f: impl FnOnce(&mut Table) -> Result<R>) -> Result<R> {
        let tables = self.tables.lock();
        let table = tables.get(name).context(TableNotFoundSnafu { name })?;
        let mut table = table.lock();
        f(&mut table)
    }
}
