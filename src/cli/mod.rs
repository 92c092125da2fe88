//! Command-line front end over [`TokenManager`].

mod args;

pub use args::{Cli, Command};

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::Parser;

use crate::config::{load_app_config, AppConfig};
use crate::host::{KitApi, StoreKitApi};
use crate::logging;
use crate::manager::{Caller, ColorRow, FontRow, KitSync, SaveForm, TokenManager, TokenRows};
use crate::queue::{DrainOutcome, DrainTrigger};
use crate::storage::StorageService;

pub fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init();
    let config = load_app_config();
    execute(cli, config)
}

/// Runs one parsed command against the configured stores.
pub fn execute(cli: Cli, config: AppConfig) -> anyhow::Result<()> {
    let data_dir = resolve_data_dir(cli.data_dir.clone(), &config)?;
    tracing::debug!(data_dir = %data_dir.display(), "using data directory");
    let storage = StorageService::with_paths(data_dir);
    let options = storage.options();
    let user_meta = storage.user_meta();
    let documents = storage.documents();

    let store_api = StoreKitApi::new(&documents, &options);
    let api = (config.host_api && !cli.no_api).then_some(&store_api as &dyn KitApi);
    let site = cli.site_url.clone().unwrap_or_else(|| config.site_url.clone());
    let mut manager = TokenManager::new(&options, &user_meta, &documents, api, site);

    if !matches!(cli.command, Command::Drain) {
        manager
            .process_pending(DrainTrigger::ApplicationReady)
            .context("failed to replay the queued kit write")?;
        print_notice(&manager);
    }

    let caller = Caller::Cli;
    match cli.command {
        Command::Export {
            file,
            source,
            preserve_ids,
        } => {
            let payload = manager.export(&caller, source, preserve_ids)?.value;
            let json = payload
                .to_json_pretty()
                .context("failed to encode export payload")?;
            match file {
                Some(path) => {
                    fs::write(&path, json + "\n")
                        .with_context(|| format!("failed to write file: {}", path.display()))?;
                    println!(
                        "Exported {} colors and {} fonts to {}",
                        payload.colors.len(),
                        payload.fonts.len(),
                        path.display()
                    );
                }
                None => println!("{json}"),
            }
        }
        Command::Import {
            file,
            mode,
            preserve_ids,
        } => {
            let sync = manager
                .import_file(&caller, &file, mode, preserve_ids, config.max_import_bytes)
                .with_context(|| format!("import of {} failed", file.display()))?
                .value;
            report(sync, &format!("Imported tokens ({}).", mode.as_str()))?;
        }
        Command::Sync => {
            let sync = manager.sync(&caller)?.value;
            report(sync, "Synced plugin options to the kit.")?;
        }
        Command::Push => {
            let sync = manager.push(&caller)?.value;
            report(sync, "Pushed plugin options to the kit.")?;
        }
        Command::Pull => match manager.pull(&caller)?.value {
            Some(rows) => println!(
                "Pulled {} colors and {} fonts from the kit.",
                rows.colors.len(),
                rows.fonts.len()
            ),
            None => bail!("no active kit document to pull from"),
        },
        Command::Drain => {
            let outcome = manager.process_pending(DrainTrigger::HostReady)?;
            print_notice(&manager);
            match outcome {
                DrainOutcome::Idle => println!("Nothing queued."),
                DrainOutcome::Applied => println!("Queued kit write applied."),
                DrainOutcome::Deferred => bail!("kit still unavailable; the job stays queued"),
                DrainOutcome::Failed => bail!("queued kit write failed; the job stays queued"),
            }
        }
        Command::List { json } => {
            let rows = manager.rows(&caller)?.value;
            if json {
                let text =
                    serde_json::to_string_pretty(&rows).context("failed to encode token rows")?;
                println!("{text}");
            } else {
                print_rows(&rows);
            }
        }
        Command::Save { colors, fonts } => {
            let rows = manager.rows(&caller)?.value;
            let form = SaveForm {
                colors: rows.colors.iter().map(ColorRow::from).collect(),
                fonts: rows.fonts.iter().map(FontRow::from).collect(),
                colors_bulk: read_bulk(colors.as_deref())?,
                fonts_bulk: read_bulk(fonts.as_deref())?,
            };
            let sync = manager.save(&caller, form)?.value;
            report(sync, "Saved tokens.")?;
        }
    }
    Ok(())
}

fn resolve_data_dir(flag: Option<PathBuf>, config: &AppConfig) -> anyhow::Result<PathBuf> {
    if let Some(dir) = flag.or_else(|| config.data_dir.clone()) {
        return Ok(dir);
    }
    let storage = StorageService::with_default_paths().context("cannot locate a data directory")?;
    Ok(storage.data_dir().to_path_buf())
}

fn report(sync: KitSync, success: &str) -> anyhow::Result<()> {
    match sync {
        KitSync::Applied => {
            println!("{success}");
            Ok(())
        }
        KitSync::Queued => bail!("no active kit document; the write is queued and will be retried"),
        KitSync::Failed => bail!("kit write failed; the write is queued and will be retried"),
    }
}

fn read_bulk(path: Option<&Path>) -> anyhow::Result<String> {
    match path {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("failed to read bulk file: {}", path.display())),
        None => Ok(String::new()),
    }
}

fn print_notice(manager: &TokenManager<'_>) {
    if let Some(notice) = manager.take_notice() {
        eprintln!("{}", notice.message);
    }
}

fn print_rows(rows: &TokenRows) {
    println!("Colors ({})", rows.colors.len());
    for color in &rows.colors {
        println!("  {:<24} {:<9} {}", color.title, color.color, color.id);
    }
    println!("Fonts ({})", rows.fonts.len());
    for font in &rows.fonts {
        let weight = font.weight.map(|w| w.to_string()).unwrap_or_default();
        println!(
            "  {:<24} {} | {} | {} | {}  {}",
            font.title, font.family, font.size, weight, font.line_height, font.id
        );
    }
}
