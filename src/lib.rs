//! # tabledb
//!
//! An embeddable, in-process table store. A [`Database`] is a named set of
//! tables; each table has a fixed list of text columns and an ordered list of
//! rows. Tables are driven either through the typed API or through one-line
//! text commands, and can be written to (and read back from) one CSV file
//! per table.
//!
//! ```no_run
//! use tabledb::{Database, Executor, Predicate, Row};
//!
//! # fn main() -> tabledb::Result<()> {
//! let db = Database::new("shop");
//! db.create_table("users", ["id", "name", "age"])?;
//! db.insert("users", Row::from([("id", "1"), ("name", "Alice"), ("age", "30")]))?;
//! db.update("users", &Predicate::eq("name", "Alice"), Row::from([("age", "31")]))?;
//!
//! let exec = Executor::new(&db);
//! exec.run("insert to users 2, Bob, 25")?;
//! let result = exec.run("get from users where name=Bob")?;
//!
//! db.save()?; // ./shop/users.csv
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`database`]: the registry, CRUD operations and persistence
//! - [`storage`]: rows, tables, predicates and the CSV codec
//! - [`query`]: lexer and parser for text commands
//! - [`executor`]: runs parsed commands against a database
//!
//! Every operation is synchronous and takes the database lock, then the
//! table lock; see [`database`] for the locking rules.

pub mod config;
pub mod database;
pub mod error;
pub mod executor;
pub mod ident;
pub mod query;
pub mod storage;

pub use config::Config;
pub use database::Database;
pub use error::{Error, IdentKind, Result};
pub use executor::{Executor, QueryResult};
pub use ident::Ident;
pub use storage::{Condition, Op, Predicate, Row, Table};
