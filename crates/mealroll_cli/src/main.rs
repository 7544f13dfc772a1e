//! mealroll command-line entry point.
//!
//! # Responsibility
//! - Resolve configuration, logging and the active record store.
//! - Dispatch subcommands to `mealroll_core` services and print results.

mod cli;

use anyhow::{bail, Context, Result};
use chrono::{Local, NaiveDate};
use cli::{Cli, Commands};
use log::warn;
use mealroll_core::db::open_db;
use mealroll_core::{
    init_logging, search_people, transfer_records, MealService, MealServiceError, MealSlot,
    MealrollConfig, PersonMealRecord, RecordStore, SearchQuery, SheetFileStore, SlotEdit,
    SlotLabels, SqliteRecordStore,
};
use std::path::Path;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse_args();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut config = MealrollConfig::load(cli.config.as_deref())?;
    if let Some(db) = cli.db.clone() {
        config.db_path = db;
        config.sheet_path = None;
    }
    if let Some(sheet) = cli.sheet.clone() {
        config.sheet_path = Some(sheet);
    }
    if let Some(level) = cli.log_level.clone() {
        config.log_level = level;
    }
    if let Some(log_dir) = cli.log_dir.clone() {
        config.log_dir = Some(log_dir);
    }

    // Logging is diagnostic only; a bad log dir must not block a cycle.
    if let Err(err) = init_logging(&config.log_level, &config.effective_log_dir()) {
        eprintln!("warning: file logging disabled: {err}");
    }

    match &config.sheet_path {
        Some(sheet_path) => {
            let store = SheetFileStore::new(sheet_path, config.slot_labels.clone());
            dispatch(cli.command, &config, &store)
        }
        None => {
            let conn = open_db(&config.db_path).with_context(|| {
                format!("failed to open record store `{}`", config.db_path.display())
            })?;
            let store = SqliteRecordStore::new(&conn);
            dispatch(cli.command, &config, &store)
        }
    }
}

fn dispatch(command: Commands, config: &MealrollConfig, store: &dyn RecordStore) -> Result<()> {
    let labels = &config.slot_labels;
    let service = MealService::new(store);

    match command {
        Commands::Run { slot, date } => {
            let slot = parse_slot(labels, &slot)?;
            let today = date.unwrap_or_else(local_today);
            let cycle = match service.run_resolution_cycle(slot, today) {
                Ok(cycle) => cycle,
                Err(MealServiceError::WriteBack { cycle, source }) => {
                    warn!("event=cli_run module=cli status=retry stage=write_back");
                    service.persist(&cycle.records).with_context(|| {
                        format!("failed to save resolved records after retry: {source}")
                    })?;
                    *cycle
                }
                Err(err) => return Err(err.into()),
            };

            if cycle.serving_list.is_empty() {
                println!("Nothing to serve.");
            } else {
                println!("{}", cycle.serving_list);
            }
        }
        Commands::List => {
            for record in service.list_people()? {
                print_record(labels, &record);
            }
        }
        Commands::Show { key } => match service.find_person(&key)? {
            Some(record) => print_record(labels, &record),
            None => bail!("person not found: {key}"),
        },
        Commands::Search { terms, limit } => {
            let records = service.list_people()?;
            let query = SearchQuery {
                text: terms.join(" "),
                limit,
            };
            for hit in search_people(&records, &query) {
                println!("{}", hit.display_key);
            }
        }
        Commands::Set {
            key,
            slot,
            today,
            default,
            skip_until,
            clear_skip,
        } => {
            let slot = parse_slot(labels, &slot)?;
            let edit = SlotEdit {
                today_order: today,
                default_order: default,
                skip_until: if clear_skip {
                    Some(None)
                } else {
                    skip_until.map(Some)
                },
            };
            if edit.is_empty() {
                bail!("nothing to change; pass --today, --default, --skip-until or --clear-skip");
            }
            let record = service.update_slot(&key, slot, &edit)?;
            println!("Updated: {}", record.name);
        }
        Commands::Add { name, address } => {
            let record = service.add_person(&name, &address)?;
            println!("Added: {}", record.display_key());
        }
        Commands::Import { sheet } => {
            let source = sheet_store(&sheet, labels);
            let count = transfer_records(&source, &store)?;
            println!("Imported {count} record(s) from {}", sheet.display());
        }
        Commands::Export { sheet } => {
            let target = sheet_store(&sheet, labels);
            let count = transfer_records(&store, &target)?;
            println!("Exported {count} record(s) to {}", sheet.display());
        }
        Commands::Seed { force, date } => {
            let today = date.unwrap_or_else(local_today);
            let count = service.seed_sample(today, force)?;
            println!("Seeded {count} sample record(s).");
        }
    }
    Ok(())
}

fn parse_slot(labels: &SlotLabels, value: &str) -> Result<MealSlot> {
    labels.parse_slot(value).with_context(|| {
        format!(
            "unknown meal slot `{value}`; expected one of {}, {}, {}",
            labels.breakfast, labels.lunch, labels.dinner
        )
    })
}

fn sheet_store(path: &Path, labels: &SlotLabels) -> SheetFileStore {
    SheetFileStore::new(path, labels.clone())
}

fn local_today() -> NaiveDate {
    Local::now().date_naive()
}

fn print_record(labels: &SlotLabels, record: &PersonMealRecord) {
    println!("{}", record.display_key());
    for slot in MealSlot::ALL {
        let order = record.slot(slot);
        let skip = order
            .skip_until
            .map(|date| date.to_string())
            .unwrap_or_else(|| "(none)".to_string());
        println!(
            "  {:<8} default={:<12} today={:<12} skip_until={}",
            labels.label(slot),
            display_cell(&order.default_order),
            display_cell(&order.today_order),
            skip
        );
    }
}

fn display_cell(value: &str) -> &str {
    if value.is_empty() {
        "(none)"
    } else {
        value
    }
}
