use shopdesk::{config::Config, import::Importer, import_file, record::EntityKind, store};

use anyhow::Context;
use std::env;
use std::path::{Path, PathBuf};
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let (kind, csv_path) = parse_args();
    validate_csv_file(&csv_path);
    run_import(kind, &csv_path).await
}

fn parse_args() -> (EntityKind, PathBuf) {
    let args: Vec<String> = env::args().collect();

    if args.len() != 3 {
        eprintln!("Usage: {} <order|deposit|withdrawal|agent> <csv_file>", args[0]);
        std::process::exit(1);
    }

    match args[1].parse() {
        Ok(kind) => (kind, PathBuf::from(&args[2])),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

fn validate_csv_file(path: &Path) {
    if !path.exists() {
        eprintln!("Error: File '{}' does not exist", path.display());
        std::process::exit(1);
    }

    let is_csv = path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("csv"))
        .unwrap_or(false);
    if !is_csv {
        eprintln!("Error: File '{}' is not a CSV file", path.display());
        std::process::exit(1);
    }
}

async fn run_import(kind: EntityKind, csv_path: &Path) -> anyhow::Result<()> {
    let config = Config::from_env().context("Invalid configuration")?;
    let store = store::open_store(&config.store)
        .await
        .context("Failed to open store")?;
    let importer = Importer::new(store, config);

    println!("Importing {} records from: {}", kind, csv_path.display());

    // Progress is printed by a separate task while the import runs
    let (tx, mut rx) = mpsc::unbounded_channel::<shopdesk::import::Progress>();
    let printer = tokio::spawn(async move {
        let mut last = None;
        while let Some(progress) = rx.recv().await {
            if last != Some(progress.percent) {
                println!(
                    "{:>3}% ({} ok, {} failed)",
                    progress.percent, progress.succeeded, progress.failed
                );
                last = Some(progress.percent);
            }
        }
    });

    let result = import_file(&importer, kind, csv_path, Some(tx)).await;
    printer.await?;
    let result = result?;

    for rejection in &result.rejections {
        eprintln!("line {}: {}", rejection.line, rejection.error);
    }
    println!("success: {}, errors: {}", result.succeeded, result.failed);

    Ok(())
}
