/*
Command grammar

Keywords are case-insensitive and runs of whitespace count as one space.
Every list, including SET and WHERE, is separated by `,`.

--- create ---
    `create table users has id, name, age`
    `create table users (id, name, age)`

--- insert ---
Values are positional, in declared column order.
    `insert to users 1, ahmad, 23`
    `insert to users 2, 'Smith, John', ''`
                        ^^^^^^^^^^^^^ quote a value holding `,` or a keyword

--- update ---
    `update users set age=24, name=Ahmad where id=1`
    `update spots set where=Oslo where id=1`
                      ^^^^^ `where` directly followed by `=` is a column

--- delete ---
    `delete from users where id=1`

--- get / select ---
    `get from users where age=23, name=ahmad`
    `get from users`
    >>> Rows:
        | id | name  | age |
        | 1  | ahmad | 23  |

`where a=1 and b=2` is rejected: write `where a=1, b=2`.
*/

use snafu::prelude::*;

use crate::database::Database;
use crate::error::{InvalidCommandSnafu, Result};
use crate::query::{Command, Parser};
use crate::ident::Ident;
use crate::storage::Row;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryResult {
    /// Matching rows, with the table's columns in declared order.
    Rows { columns: Vec<Ident>, rows: Vec<Row> },
    /// Rows deleted or updated.
    Affected(usize),
    Success,
}

pub struct Executor<'db> {
    db: &'db Database,
}

impl<'db> Executor<'db> {
    pub fn new(db: &'db Database) -> Self {
        Self { db }
    }

    pub fn run(&self, src: &str) -> Result<QueryResult> {
        let command = Parser::new(src)
            .and_then(Parser::parse)
            .context(InvalidCommandSnafu {
                command: src.trim(),
            })?;
        self.execute(command)
    }

    pub fn execute(&self, command: Command) -> Result<QueryResult> {
        match command {
            Command::Create { table, columns } => {
                self.db.create_table(&table, columns)?;
                Ok(QueryResult::Success)
            }
            Command::Insert { table, values } => {
                self.db.insert_values(&table, values)?;
                Ok(QueryResult::Success)
            }
            Command::Update {
                table,
                assigns,
                filter,
            } => {
                let values: Row = assigns.into_iter().collect();
                let n = self.db.update(&table, &filter, values)?;
                Ok(QueryResult::Affected(n))
            }
            Command::Delete { table, filter } => {
                let n = self.db.delete(&table, &filter)?;
                Ok(QueryResult::Affected(n))
            }
            Command::Get { table, filter } => {
                let (columns, rows) = self.db.select(&table, &filter)?;
                Ok(QueryResult::Rows { columns, rows })
            }
        }
    }
}
