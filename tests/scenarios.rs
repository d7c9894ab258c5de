//! End-to-end flows through the typed API and the command executor,
//! finishing on disk.

use std::fs;

use tabledb::{Config, Database, Error, Executor, Predicate, QueryResult, Row};
use tempfile::TempDir;

fn database(tmp: &TempDir, name: &str) -> Database {
    Database::with_config(name, Config::new().root(tmp.path()))
}

#[test]
fn typed_api_update_then_save() {
    let tmp = TempDir::new().unwrap();
    let db = database(&tmp, "db");
    db.create_table("users", ["id", "name", "age"]).unwrap();
    db.insert("users", Row::from([("id", "1"), ("name", "Alice"), ("age", "30")]))
        .unwrap();
    db.insert("users", Row::from([("id", "2"), ("name", "Bob"), ("age", "25")]))
        .unwrap();
    db.update("users", &Predicate::eq("name", "Bob"), Row::from([("age", "26")]))
        .unwrap();
    db.save().unwrap();

    let text = fs::read_to_string(tmp.path().join("db").join("users.csv")).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines, ["id,name,age", "1,Alice,30", "2,Bob,26"]);
}

#[test]
fn text_commands_create_insert_get() {
    let db = Database::new("db");
    let exec = Executor::new(&db);
    exec.run("create table users has id, name, age").unwrap();
    exec.run("insert to users 1, ahmad, 23").unwrap();

    let QueryResult::Rows { columns, rows } = exec.run("get from users where id=1").unwrap()
    else {
        panic!("get should return rows");
    };
    assert_eq!(columns, ["id", "name", "age"]);
    assert_eq!(rows, [Row::from([("id", "1"), ("name", "ahmad"), ("age", "23")])]);
}

#[test]
fn text_commands_then_load_from_disk() {
    let tmp = TempDir::new().unwrap();
    let db = database(&tmp, "club");
    let exec = Executor::new(&db);
    for src in [
        "create table members (id, name, note)",
        "insert to members 1, Ann Lee, 'likes, commas'",
        "insert to members 2, Bo, ''",
        "insert to members 3, Cy, \"said \\\"hi\\\"\"",
        "update members set note=moved where id=2",
        "delete from members where id=3",
    ] {
        exec.run(src).unwrap();
    }
    db.save().unwrap();

    let loaded = db.load("members").unwrap();
    assert_eq!(loaded, db.get_table("members").unwrap());
    assert_eq!(loaded.rows()[0].get("note"), Some("likes, commas"));
    assert_eq!(loaded.rows()[1].get("note"), Some("moved"));

    let reopened = Database::open("club", Config::new().root(tmp.path())).unwrap();
    let exec = Executor::new(&reopened);
    let QueryResult::Rows { rows, .. } = exec.run("get from members where name=Ann Lee").unwrap()
    else {
        panic!("get should return rows");
    };
    assert_eq!(
        rows,
        [Row::from([("id", "1"), ("name", "Ann Lee"), ("note", "likes, commas")])]
    );
}

#[test]
fn failed_calls_leave_tables_unchanged() {
    let db = Database::new("db");
    let exec = Executor::new(&db);
    exec.run("create table t has a, b").unwrap();
    exec.run("insert to t 1, 2").unwrap();
    let before = db.get_table("t").unwrap();

    for src in [
        "insert to t 1, 2, 3",
        "update t set c=1 where a=1",
        "update t set b=9 where a=1 and b=2",
        "delete from t where a",
        "create table t has x",
    ] {
        assert!(exec.run(src).is_err(), "{src} should fail");
    }
    assert!(matches!(
        db.insert("t", Row::from([("a", "1"), ("zzz", "2")])),
        Err(Error::UnknownColumn { .. })
    ));
    assert_eq!(db.get_table("t").unwrap(), before);
}

#[test]
fn empty_condition_set_matches_every_row() {
    let db = Database::new("db");
    db.create_table("t", ["a"]).unwrap();
    for v in ["1", "2", "3"] {
        db.insert_values("t", [v]).unwrap();
    }
    assert_eq!(db.search("t", &Predicate::all()).unwrap().len(), 3);
    assert_eq!(db.update("t", &Predicate::all(), Row::from([("a", "x")])).unwrap(), 3);
    assert_eq!(db.delete("t", &Predicate::all()).unwrap(), 3);
    assert!(db.get_table("t").unwrap().is_empty());
}

#[test]
fn omitted_fields_read_back_the_same() {
    let tmp = TempDir::new().unwrap();
    let db = database(&tmp, "db");
    db.create_table("users", ["id", "name"]).unwrap();
    db.insert("users", Row::from([("id", "1")])).unwrap();
    db.save().unwrap();

    let loaded = db.load("users").unwrap();
    assert_eq!(loaded, db.get_table("users").unwrap());
    let unnamed = Predicate::eq("name", "");
    assert_eq!(db.search("users", &unnamed).unwrap().len(), 1);
    assert_eq!(loaded.search(&unnamed).len(), 1);
}
