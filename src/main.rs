use std::io::{self, BufRead, Write};

use clap::Parser;
use minidb::{Command, Engine, QueryResult, Row, parse, tokenize};

/// Interactive shell for the in-memory database
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Prompt printed before each statement
    #[arg(long, default_value = "minidb> ")]
    prompt: String,

    /// Most verbose log level written to stderr
    #[arg(long, default_value = "warn")]
    log_level: tracing::Level,
}

fn main() -> io::Result<()> {
    let args = Args::parse();
    tracing_subscriber::fmt()
        .with_max_level(args.log_level)
        .with_writer(io::stderr)
        .init();

    let mut engine = Engine::new();
    let mut stdout = io::stdout();

    println!("minidb (type 'exit' to quit)");
    for line in prompt_lines(&args.prompt)? {
        let line = line?;
        let input = line.trim();
        let input = input.strip_suffix(';').unwrap_or(input).trim_end();

        match input {
            "" => {}
            "exit" | ".exit" | ".quit" => break,
            ".tables" => {
                let mut names = engine.table_names();
                names.sort_unstable();
                for name in names {
                    println!("{name}");
                }
            }
            sql => {
                if let Err(err) = run(&mut engine, sql) {
                    println!("error: {err}");
                }
            }
        }
        print!("{}", args.prompt);
        stdout.flush()?;
    }
    println!("bye");
    Ok(())
}

/// Prints the first prompt and hands back stdin's lines.
fn prompt_lines(prompt: &str) -> io::Result<io::Lines<io::StdinLock<'static>>> {
    print!("{prompt}");
    io::stdout().flush()?;
    Ok(io::stdin().lock().lines())
}

fn run(engine: &mut Engine, sql: &str) -> minidb::Result<()> {
    let command = parse(tokenize(sql)?)?;
    let summary = match &command {
        Command::Update(_) => Some("updated"),
        Command::Delete(_) => Some("deleted"),
        _ => None,
    };
    let is_select = matches!(command, Command::Select(_));

    let result = engine.run(command)?;
    match summary {
        Some(verb) => println!("{} row(s) {verb}", result.affected),
        None if is_select => print_rows(&result),
        None => println!("OK"),
    }
    Ok(())
}

fn print_rows(result: &QueryResult) {
    if result.rows.is_empty() {
        println!("(0 rows)");
        return;
    }
    for row in &result.rows {
        println!("{}", format_row(&result.columns, row));
    }
}

/// `{ id:1 name:Alice }`, following the result column order. Columns the row
/// has no value for print as `NULL`.
fn format_row(columns: &[String], row: &Row) -> String {
    let fields: Vec<String> = columns
        .iter()
        .map(|column| match row.get(column) {
            Some(value) => format!("{column}:{value}"),
            None => format!("{column}:NULL"),
        })
        .collect();
    format!("{{ {} }}", fields.join(" "))
}
