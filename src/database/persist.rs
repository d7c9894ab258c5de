//! Saving a database to its directory and reading tables back.

use std::fs;
use std::path::PathBuf;

use snafu::prelude::*;

use super::Database;
use crate::config::Config;
use crate::error::{
    CreateDirSnafu, Error, IdentKind, InvalidIdentifierSnafu, IoSnafu, PartialSaveSnafu, Result,
};
use crate::ident::Ident;
use crate::storage::codec;
use crate::storage::Table;

impl Database {
    /// `root/<database name>`. Computed as given; [`save`](Self::save),
    /// [`load`](Self::load) and [`open`](Self::open) refuse a database name
    /// that is not an identifier before touching the file system.
    pub fn dir(&self) -> PathBuf {
        self.config.root_dir().join(&self.name)
    }

    pub fn table_path(&self, table: &str) -> PathBuf {
        self.dir()
            .join(format!("{table}.{}", self.config.file_extension()))
    }

    /// Writes every table to `<dir>/<table>.<ext>`, creating the directory
    /// (and its parents) first.
    ///
    /// Holds the database lock for the whole call. A table that fails to
    /// write does not stop the others; all failures come back together in
    /// [`Error::PartialSave`].
    pub fn save(&self) -> Result<()> {
        self.check_name()?;
        let tables = self.tables.lock();
        let dir = self.dir();
        fs::create_dir_all(&dir).context(CreateDirSnafu { path: &dir })?;

        let mut names: Vec<&Ident> = tables.keys().collect();
        names.sort();
        let mut failures: Vec<(String, Error)> = Vec::new();
        for name in names {
            let path = self.table_path(name);
            let table = tables[name].lock();
            if let Err(e) = codec::write_table(&path, &table) {
                tracing::warn!("failed to save table {}: {}", name, e);
                failures.push((name.to_string(), e));
            }
        }
        if !failures.is_empty() {
            return PartialSaveSnafu { failures }.fail();
        }
        tracing::info!("saved {} table(s) to {}", tables.len(), dir.display());
        Ok(())
    }

    /// Reads `<dir>/<table>.<ext>` into a standalone [`Table`]. The live
    /// registry is neither consulted nor changed.
    pub fn load(&self, table: &str) -> Result<Table> {
        self.check_name()?;
        ensure!(
            Ident::is_valid(table),
            InvalidIdentifierSnafu {
                kind: IdentKind::Table,
                name: table,
            }
        );
        codec::read_table(&self.table_path(table), table)
    }

    /// Opens `root/<name>` and registers every `<table>.<ext>` file found in
    /// it. Files whose stem is not a valid identifier are skipped.
    pub fn open(name: impl Into<String>, config: Config) -> Result<Self> {
        let db = Self::with_config(name, config);
        db.check_name()?;
        let dir = db.dir();
        let entries = fs::read_dir(&dir).context(IoSnafu { path: &dir })?;

        let mut tables = db.tables.lock();
        for entry in entries {
            let path = entry.context(IoSnafu { path: &dir })?.path();
            if path.extension().and_then(|e| e.to_str()) != Some(db.config.file_extension())
                || !path.is_file()
            {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            if !Ident::is_valid(stem) {
                tracing::debug!("skipping {}: not a table name", path.display());
                continue;
            }
            let table = codec::read_table(&path, stem)?;
            tables.insert(table.ident().clone(), parking_lot::Mutex::new(table));
        }
        tracing::debug!("opened {} with {} table(s)", dir.display(), tables.len());
        drop(tables);
        Ok(db)
    }

    fn check_name(&self) -> Result<()> {
        ensure!(
            Ident::is_valid(&self.name),
            InvalidIdentifierSnafu {
                kind: IdentKind::Database,
                name: &self.name,
            }
        );
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::storage::{Predicate, Row};
    use tempfile::TempDir;

    fn db_in(dir: &TempDir) -> Database {
        Database::with_config("shop", Config::new().root(dir.path()))
    }

    #[test]
    fn test_save_writes_one_file_per_table() {
        let tmp = TempDir::new().unwrap();
        let db = db_in(&tmp);
        db.create_table("users", ["id", "name", "age"]).unwrap();
        db.create_table("orders", ["id", "user"]).unwrap();
        db.insert_values("users", ["1", "Alice", "30"]).unwrap();
        db.insert_values("users", ["2", "Bob", "25"]).unwrap();
        db.update("users", &Predicate::eq("name", "Bob"), Row::from([("age", "26")]))
            .unwrap();
        db.save().unwrap();

        let users = fs::read_to_string(tmp.path().join("shop/users.csv")).unwrap();
        assert_eq!(users, "id,name,age\n1,Alice,30\n2,Bob,26\n");
        let orders = fs::read_to_string(tmp.path().join("shop/orders.csv")).unwrap();
        assert_eq!(orders, "id,user\n");
    }

    #[test]
    fn test_save_creates_missing_parents() {
        let tmp = TempDir::new().unwrap();
        let db = Database::with_config("db", Config::new().root(tmp.path().join("a/b/c")));
        db.create_table("t", ["x"]).unwrap();
        db.save().unwrap();
        assert!(tmp.path().join("a/b/c/db/t.csv").is_file());
    }

    #[test]
    fn test_save_truncates_previous_contents() {
        let tmp = TempDir::new().unwrap();
        let db = db_in(&tmp);
        db.create_table("t", ["x"]).unwrap();
        db.insert_values("t", ["1"]).unwrap();
        db.insert_values("t", ["2"]).unwrap();
        db.save().unwrap();
        db.delete("t", &Predicate::eq("x", "1")).unwrap();
        db.save().unwrap();
        assert_eq!(fs::read_to_string(db.table_path("t")).unwrap(), "x\n2\n");
    }

    #[test]
    fn test_save_reports_every_failed_table() {
        let tmp = TempDir::new().unwrap();
        let db = db_in(&tmp);
        for name in ["a", "b", "c"] {
            db.create_table(name, ["x"]).unwrap();
        }
        fs::create_dir_all(db.table_path("a")).unwrap();
        fs::create_dir_all(db.table_path("c")).unwrap();

        match db.save() {
            Err(Error::PartialSave { failures }) => {
                let failed: Vec<_> = failures.iter().map(|(n, _)| n.as_str()).collect();
                assert_eq!(failed, ["a", "c"]);
            }
            other => panic!("expected PartialSave, got {other:?}"),
        }
        assert_eq!(fs::read_to_string(db.table_path("b")).unwrap(), "x\n");
    }

    #[test]
    fn test_database_name_must_be_identifier() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("root");
        let db = Database::with_config("../escape", Config::new().root(&root));
        db.create_table("t", ["x"]).unwrap();
        for result in [
            db.save(),
            db.load("t").map(|_| ()),
            Database::open("../escape", Config::new().root(&root)).map(|_| ()),
        ] {
            assert!(matches!(
                result,
                Err(Error::InvalidIdentifier { kind: IdentKind::Database, name }) if name == "../escape"
            ));
        }
        assert!(!root.exists());
        assert!(!tmp.path().join("escape").exists());
    }

    #[test]
    fn test_load_is_independent_of_registry() {
        let tmp = TempDir::new().unwrap();
        let db = db_in(&tmp);
        db.create_table("users", ["id", "name"]).unwrap();
        db.insert_values("users", ["1", "Alice"]).unwrap();
        db.save().unwrap();
        db.insert_values("users", ["2", "Bob"]).unwrap();

        let loaded = db.load("users").unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(db.get_table("users").unwrap().len(), 2);

        let other = db_in(&tmp);
        assert_eq!(other.load("users").unwrap(), loaded);
        assert!(other.table_names().is_empty());
    }

    #[test]
    fn test_load_failures() {
        let tmp = TempDir::new().unwrap();
        let db = db_in(&tmp);
        assert!(matches!(db.load("ghost"), Err(Error::NotFound { .. })));
        assert!(matches!(
            db.load("../etc/passwd"),
            Err(Error::InvalidIdentifier { kind: IdentKind::Table, .. })
        ));
    }

    #[test]
    fn test_open_registers_saved_tables() {
        let tmp = TempDir::new().unwrap();
        let db = db_in(&tmp);
        db.create_table("users", ["id", "name"]).unwrap();
        db.create_table("tags", ["tag"]).unwrap();
        db.insert_values("users", ["1", "Alice"]).unwrap();
        db.save().unwrap();
        fs::write(tmp.path().join("shop/notes.txt"), "ignored").unwrap();
        fs::write(tmp.path().join("shop/bad-name.csv"), "a\n").unwrap();

        let reopened = Database::open("shop", Config::new().root(tmp.path())).unwrap();
        assert_eq!(reopened.table_names(), ["tags", "users"]);
        assert_eq!(reopened.get_table("users").unwrap(), db.get_table("users").unwrap());
    }

    #[test]
    fn test_open_missing_directory() {
        let tmp = TempDir::new().unwrap();
        assert!(matches!(
            Database::open("nothing", Config::new().root(tmp.path())),
            Err(Error::Io { .. })
        ));
    }
}
