use std::fs::File;
use std::io::{self, BufWriter, Write};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::{debug, info};

mod aggregator;
mod config;
mod console;
mod daily_command;
mod datetime;
mod entry_command;
mod error;
mod local_store;
mod logging;
mod remote_store;
mod store;
mod tag;
mod time_entry;
mod transfer_command;
mod weekly_command;

use config::Config;
use console::{ConsoleMarkdownList, ConsolePresenter};
use daily_command::{DailyArgs, DailyCommand};
use entry_command::{AddArgs, EntryCommand, ListArgs};
use local_store::LocalStore;
use remote_store::RemoteStore;
use store::EntryStore;
use tag::TagSet;
use transfer_command::{ExportArgs, ImportArgs, TransferCommand};
use weekly_command::{WeeklyArgs, WeeklyCommand, WeeklyReport};

/// タイムエントリーを記録し、集計するためのCLIアプリケーション。
///
/// # Examples
/// ```
/// $ cargo run -- add 23:30 00:15 "reading" --tag Productive
/// $ cargo run -- daily
/// $ cargo run -- weekly --trend
/// ```
#[derive(Debug, Parser)]
#[clap(version, about)]
struct Args {
    #[clap(subcommand)]
    subcommand: SubCommands,
}

/// サブコマンドを表す列挙型。
#[derive(Debug, Subcommand)]
enum SubCommands {
    /// Records a time entry
    Add(AddArgs),
    /// Lists time entries
    List(ListArgs),
    /// Deletes a time entry
    Delete {
        #[clap(help = "Identifier shown by the list subcommand")]
        id: String,
    },
    /// Lists available tags
    Tags,
    /// Shows entries and totals per tag of a day
    Daily(DailyArgs),
    /// Shows daily averages per tag of 7 days
    Weekly(WeeklyArgs),
    /// Writes all entries as JSON
    Export(ExportArgs),
    /// Adds entries from a JSON export
    Import(ImportArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = Config::from_env().context("Failed to load configuration")?;
    logging::init_logger(config.log_level)?;
    debug!("{:?}", config);

    let tag_set = TagSet::new(config.custom_tags.iter().cloned());
    let store: Box<dyn EntryStore> = match &config.api_url {
        Some(api_url) => {
            info!("Using time entries at {}", api_url);
            Box::new(RemoteStore::new(api_url, tag_set.clone()))
        }
        None => {
            let store = LocalStore::new(config.entries_path()?);
            info!("Using time entries in {}", store.path().display());
            Box::new(store)
        }
    };

    let mut stdout = io::stdout();
    let mut presenter = ConsoleMarkdownList::new(&mut stdout);

    match args.subcommand {
        SubCommands::Add(add) => {
            let entry = EntryCommand::new(&*store, &tag_set).add(add).await?;
            presenter.show_time_entries(&[entry])?;
        }
        SubCommands::List(list) => {
            let entries = EntryCommand::new(&*store, &tag_set).list(list).await?;
            presenter.show_time_entries(&entries)?;
        }
        SubCommands::Delete { id } => {
            if !EntryCommand::new(&*store, &tag_set).delete(&id).await? {
                anyhow::bail!("Time entry {} was not found", id);
            }
        }
        SubCommands::Tags => {
            let tags = EntryCommand::new(&*store, &tag_set).tags().await?;
            presenter.show_tags(&tags)?;
        }
        SubCommands::Daily(daily) => {
            let report = DailyCommand::new(&*store).run(daily).await?;
            presenter.show_time_entries(&report.entries)?;
            presenter.show_daily_summary(&report.summary)?;
        }
        SubCommands::Weekly(weekly) => match WeeklyCommand::new(&*store).run(weekly).await? {
            WeeklyReport::Averages {
                reference_date,
                averages,
            } => presenter.show_weekly_averages(reference_date, &averages)?,
            WeeklyReport::Trend {
                reference_date,
                stats,
            } => presenter.show_weekly_trend(reference_date, &stats)?,
        },
        SubCommands::Export(export) => {
            let command = TransferCommand::new(&*store, &tag_set);
            match export.output {
                Some(path) => {
                    let file = File::create(&path)
                        .with_context(|| format!("Failed to create {}", path.display()))?;
                    let mut writer = BufWriter::new(file);
                    command.export(&mut writer).await?;
                    writer
                        .flush()
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                }
                None => {
                    command.export(&mut io::stdout()).await?;
                }
            }
        }
        SubCommands::Import(import) => {
            let count = TransferCommand::new(&*store, &tag_set)
                .import(&import.input)
                .await?;
            println!("Imported {} entries", count);
        }
    }

    Ok(())
}
