//! cfstore CLI
//!
//! Local command-line access to a cfstore data directory.

use std::io::{self, BufRead, Write};
use std::process;

use cfstore::{Config, Modify, RequestContext, StandaloneStorage, Storage, StorageReader};
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

/// cfstore CLI
#[derive(Parser, Debug)]
#[command(name = "cfstore")]
#[command(about = "Column-family key-value storage")]
#[command(version)]
struct Args {
    /// Data directory
    #[arg(short, long, default_value = "./cfstore_data")]
    data_dir: String,

    /// Column families (comma separated)
    #[arg(long, value_delimiter = ',', default_value = "default,write,lock")]
    column_families: Vec<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Get a value by key
    Get { cf: String, key: String },

    /// Set a key-value pair
    Put {
        cf: String,
        key: String,
        value: String,
    },

    /// Delete a key
    Del { cf: String, key: String },

    /// List up to LIMIT pairs starting at START
    Scan {
        cf: String,
        start: String,
        limit: usize,
    },

    /// Read commands from stdin, one per line
    Shell,
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,cfstore=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();

    let config = Config::builder()
        .data_dir(&args.data_dir)
        .column_families(args.column_families)
        .build();

    let storage = StandaloneStorage::new(config);
    if let Err(e) = storage.start() {
        tracing::error!("Failed to start storage: {}", e);
        process::exit(1);
    }

    let outcome = match args.command {
        Commands::Shell => run_shell(&storage),
        Commands::Get { cf, key } => run_line(&storage, &["get", &cf, &key]),
        Commands::Put { cf, key, value } => run_line(&storage, &["put", &cf, &key, &value]),
        Commands::Del { cf, key } => run_line(&storage, &["del", &cf, &key]),
        Commands::Scan { cf, start, limit } => {
            run_line(&storage, &["scan", &cf, &start, &limit.to_string()])
        }
    };

    if let Err(e) = storage.stop() {
        tracing::error!("Failed to stop storage: {}", e);
        process::exit(1);
    }

    if let Err(e) = outcome {
        eprintln!("{}", e);
        process::exit(1);
    }
}

/// Interactive loop: `get`, `put`, `del`, `scan`, one command per line
fn run_shell(storage: &StandaloneStorage) -> Result<(), String> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!(">>>");
        stdout.flush().map_err(|e| e.to_string())?;

        let mut line = String::new();
        match stdin.lock().read_line(&mut line) {
            Ok(0) => return Ok(()),
            Ok(_) => {}
            Err(e) => return Err(e.to_string()),
        }

        let words: Vec<&str> = line.split_whitespace().collect();
        if words.is_empty() {
            continue;
        }

        if let Err(e) = run_line(storage, &words) {
            println!("{}", e);
        }
    }
}

/// Execute one parsed command against the storage
fn run_line(storage: &StandaloneStorage, words: &[&str]) -> Result<(), String> {
    let ctx = RequestContext::default();

    match words {
        ["get", cf, key] => {
            let reader = storage.reader(&ctx).map_err(|e| e.to_string())?;
            match reader.get_cf(cf, key.as_bytes()).map_err(|e| e.to_string())? {
                Some(value) => println!("<<<{}", String::from_utf8_lossy(&value)),
                None => println!("<<<(not found)"),
            }
        }
        ["get", ..] => return Err("get has two args".to_string()),

        ["put", cf, key, value] => {
            let batch = [Modify::put(*cf, key.as_bytes(), value.as_bytes())];
            storage.write(&ctx, &batch).map_err(|e| e.to_string())?;
            println!("<<<OK");
        }
        ["put", ..] => return Err("put has three args".to_string()),

        ["del", cf, key] => {
            let batch = [Modify::delete(*cf, key.as_bytes())];
            storage.write(&ctx, &batch).map_err(|e| e.to_string())?;
            println!("<<<OK");
        }
        ["del", ..] => return Err("del has two args".to_string()),

        ["scan", cf, start, limit] => {
            let limit: usize = limit.parse().map_err(|e| format!("bad limit: {}", e))?;
            let reader = storage.reader(&ctx).map_err(|e| e.to_string())?;
            let pairs = reader
                .scan_cf(cf, start.as_bytes(), limit)
                .map_err(|e| e.to_string())?;

            if !pairs.is_empty() {
                let rendered: Vec<String> = pairs
                    .iter()
                    .map(|p| {
                        format!(
                            "{}:{}",
                            String::from_utf8_lossy(&p.key),
                            String::from_utf8_lossy(&p.value)
                        )
                    })
                    .collect();
                println!("<<<{}", rendered.join(", "));
            }
        }
        ["scan", ..] => return Err("scan has three args".to_string()),

        _ => return Err("invalid command".to_string()),
    }

    Ok(())
}
