mod args;
mod fetcher;
mod paths;
mod render;

use std::fs::File;
use std::path::Path;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::sync::PoisonError;
use std::sync::RwLock;

use clap::Parser;
use gridstore_lib::Action;
use gridstore_lib::RawAction;
use gridstore_lib::StoreConfig;
use gridstore_lib::TableStore;
use gridstore_lib::bus::Dispatcher;
use gridstore_lib::error::DispatchError;
use gridstore_lib::fetch::QueryParams;
use gridstore_lib::model::TableDefinition;
use gridstore_lib::store::attach;
use gridstore_lib::store::settle_shared;
use serde::de::DeserializeOwned;
use simplelog::{Config, LevelFilter, WriteLogger};

use crate::args::Cli;
use crate::args::OutputFormat;
use crate::fetcher::FileFetcher;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("cannot read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid JSON in {}: {source}", path.display())]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("invalid --filters: {0}")]
    Filters(serde_json::Error),

    #[error("JSON output failed: {0}")]
    Output(#[from] serde_json::Error),

    #[error(transparent)]
    Dispatch(#[from] DispatchError),
}

async fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, CliError> {
    let body = tokio::fs::read_to_string(path).await.map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&body).map_err(|source| CliError::Json {
        path: path.to_path_buf(),
        source,
    })
}

fn init_logging(cli: &Cli) {
    let level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    let Some(path) = cli.log_file.clone().or_else(paths::log_file) else {
        return;
    };
    if let Some(parent) = path.parent() {
        if let Err(e) = std::fs::create_dir_all(parent) {
            eprintln!("Warning: cannot create {}: {}", parent.display(), e);
            return;
        }
    }
    match File::create(&path) {
        Ok(file) => {
            if let Err(e) = WriteLogger::init(level, Config::default(), file) {
                eprintln!("Warning: logger not initialized: {}", e);
            }
        }
        Err(e) => eprintln!("Warning: cannot create log file {}: {}", path.display(), e),
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let definition: TableDefinition = read_json(&cli.definition).await?;
    let config: StoreConfig = match &cli.config {
        Some(path) => read_json(path).await?,
        None => StoreConfig::default(),
    };
    let script: Vec<RawAction> = match &cli.actions {
        Some(path) => read_json(path).await?,
        None => Vec::new(),
    };
    let filters: Option<QueryParams> = cli
        .filters
        .as_deref()
        .map(serde_json::from_str::<QueryParams>)
        .transpose()
        .map_err(CliError::Filters)?;

    let base_dir = cli
        .definition
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_default();
    let mut fetcher = FileFetcher::new(base_dir);
    if let Some(data) = &cli.data {
        tokio::fs::metadata(data).await.map_err(|source| CliError::Read {
            path: data.clone(),
            source,
        })?;
        fetcher = fetcher.with_data(data);
    }

    let mut store = TableStore::new(config, Arc::new(fetcher));
    store.on("change", |event| log::info!("[event] {} {:?}", event.name, event.id));
    store.on("fail", |event| {
        log::warn!("[event] {} {:?} {:?}", event.name, event.id, event.args);
        let reason: Vec<String> = event.args.iter().map(|a| a.to_display_string()).collect();
        eprintln!("fail: {}", reason.join(" "));
    });

    let store = Arc::new(RwLock::new(store));
    let bus = Dispatcher::new();
    attach(&store, &bus)?;

    bus.dispatch(&Action::request_data(&cli.id, definition, None, filters))?;
    settle_shared(&store).await;

    for raw in script {
        match Action::try_from(raw) {
            Ok(action) => {
                bus.dispatch(&action)?;
                settle_shared(&store).await;
            }
            Err(e) => log::warn!("[replay] skipping action: {}", e),
        }
    }

    let store = store.read().unwrap_or_else(PoisonError::into_inner);
    let Some(table) = store.get_instance(&cli.id) else {
        println!("no table '{}'", cli.id);
        return Ok(());
    };
    let selected = store.get_selected_items(&cli.id);

    match cli.format {
        OutputFormat::Json => {
            let json = render::render_json(table, &selected);
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
        OutputFormat::Table => {
            if table.is_data_available() {
                print!("{}", render::render_table(table));
                println!("{}", render::summary(table, &selected));
            } else {
                println!("data unavailable");
            }
        }
    }
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&cli);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
