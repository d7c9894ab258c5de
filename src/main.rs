use clap::Parser as ArgParser;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use tabledb::config::DEFAULT_EXTENSION;
use tabledb::{Config, Database, Error, Executor, Ident, QueryResult, Row};
use tracing_subscriber::EnvFilter;

/// Line-oriented shell over a tabledb database
#[derive(ArgParser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    #[arg(value_name = "DATABASE NAME")]
    database: String,
    /// Directory that holds the database directory
    #[arg(long, value_name = "DIR", default_value = ".")]
    root: PathBuf,
    /// Extension of the per-table files
    #[arg(long, value_name = "EXT", default_value = DEFAULT_EXTENSION)]
    extension: String,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    let config = Config::new().root(args.root).extension(args.extension);
    let db = match open_or_create(args.database, config) {
        Ok(db) => db,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };
    let exec = Executor::new(&db);
    println!("tabledb REPL on {} (type '.exit' or '.quit' to stop)", db.dir().display());

    let mut lines = io::stdin().lock().lines();
    loop {
        print!("db> ");
        if io::stdout().flush().is_err() {
            break;
        }
        let input = match lines.next() {
            Some(Ok(input)) => input,
            Some(Err(e)) => {
                eprintln!("Failed to read line: {e}");
                break;
            }
            None => break,
        };
        let input = input.trim();
        if input.is_empty() {
            continue;
        }
        if let Some(dot) = input.strip_prefix('.') {
            if !dot_command(&db, dot) {
                break;
            }
            continue;
        }
        run(&exec, input);
    }
}

fn open_or_create(name: String, config: Config) -> tabledb::Result<Database> {
    let db = Database::with_config(name, config);
    if db.dir().is_dir() {
        return Database::open(db.name(), db.config().clone());
    }
    Ok(db)
}

fn run(exec: &Executor, input: &str) {
    match exec.run(input) {
        Ok(QueryResult::Rows { columns, rows }) => print!("{}", render(&columns, &rows)),
        Ok(QueryResult::Affected(n)) => println!("{n} row(s) affected"),
        Ok(QueryResult::Success) => println!("SUCCESS"),
        Err(e @ Error::InvalidCommand { .. }) => eprintln!("Error: {e}"),
        Err(e) => eprintln!("Error: {input}: {e}"),
    }
}

// Returns false when the shell should exit.
fn dot_command(db: &Database, input: &str) -> bool {
    let mut parts = input.split_whitespace();
    match (parts.next(), parts.next()) {
        (Some("exit" | "quit"), _) => return false,
        (Some("tables"), _) => {
            for name in db.table_names() {
                println!("{name}");
            }
        }
        (Some("save"), _) => match db.save() {
            Ok(()) => println!("saved to {}", db.dir().display()),
            Err(e) => eprintln!("Error: {e}"),
        },
        (Some("load"), Some(table)) => match db.load(table) {
            Ok(table) => print!("{}", render(table.columns(), table.rows())),
            Err(e) => eprintln!("Error: {e}"),
        },
        _ => eprintln!("Unknown command: .{input} (try .tables, .save, .load <table>, .exit)"),
    }
    true
}

fn render(columns: &[Ident], rows: &[Row]) -> String {
    let mut out = format!("Rows: {}\n", rows.len());
    if columns.is_empty() {
        return out;
    }
    let widths: Vec<usize> = columns
        .iter()
        .map(|c| {
            rows.iter()
                .map(|r| r.get(c).unwrap_or("").chars().count())
                .chain([c.chars().count()])
                .max()
                .unwrap_or(0)
        })
        .collect();
    let line = |cells: Vec<&str>| {
        let cells: Vec<String> = cells
            .iter()
            .zip(&widths)
            .map(|(cell, &w)| format!(" {cell:<w$} "))
            .collect();
        format!("|{}|\n", cells.join("|"))
    };
    out.push_str(&line(columns.iter().map(|c| c.as_str()).collect()));
    for row in rows {
        out.push_str(&line(columns.iter().map(|c| row.get(c).unwrap_or("")).collect()));
    }
    out
}
