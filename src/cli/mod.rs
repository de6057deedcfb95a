pub mod backup;
pub mod moment;
pub mod period;

use std::path::PathBuf;

use anyhow::Result;
use chrono::Utc;
use clap::{Parser, Subcommand};
use moment::{command_clock, DateStyle};
use tracing::{debug, level_filters::LevelFilter};

use crate::{
    cycle::{entities::FlowLevel, tracker::CycleTracker},
    storage::{keys::StorageKey, record_store::FileRecordStore},
    utils::{
        dir::{create_application_default_path, ensure_dir},
        logging::{enable_logging, CLI_PREFIX},
        runtime::single_thread_runtime,
    },
};

#[derive(Parser, Debug)]
#[command(name = "bloomlog", version, long_about = None)]
#[command(about = "Track your cycle, symptoms and period predictions locally", long_about = None)]
pub struct Args {
    #[command(subcommand)]
    commands: Commands,
    #[arg(long, global = true, help = "Enable logging")]
    log: bool,
    #[arg(
        long,
        global = true,
        help = "Application directory. By default tries to save into $XDG_DATA_HOME or $HOME/.local/share"
    )]
    dir: Option<PathBuf>,
    #[arg(long, global = true, default_value_t = DateStyle::Uk, help = "Style of dates used during parsing. For Uk it's day/month/year. For Us it's month/day/year")]
    date_style: DateStyle,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(about = "Start a period")]
    Start {
        #[arg(
            long,
            help = "When the period started. Examples are \"yesterday\", \"2 days ago\", \"15/03/2025\""
        )]
        at: Option<String>,
    },
    #[command(about = "End the current period and record the cycle")]
    End {
        #[arg(long, help = "When the period ended. Examples are \"today\", \"yesterday\"")]
        at: Option<String>,
    },
    #[command(about = "Log symptoms, flow and a note")]
    Log {
        #[arg(short, long = "symptom", help = "Symptom to record, can be repeated. For example -s cramps -s fatigue")]
        symptoms: Vec<String>,
        #[arg(short, long)]
        flow: Option<FlowLevel>,
        #[arg(short, long)]
        note: Option<String>,
        #[arg(long, help = "When the symptoms were noticed")]
        at: Option<String>,
    },
    #[command(about = "Delete a recorded cycle by its index in `history`")]
    Delete { index: usize },
    #[command(about = "Show the running period and the current cycle phase")]
    Status {},
    #[command(about = "Show cycle statistics and the next period prediction")]
    Stats {},
    #[command(about = "List recorded cycles, most recent first")]
    History {},
    #[command(about = "Export stored data into a backup file")]
    Export {
        #[arg(long, help = "Export only one collection")]
        only: Option<StorageKey>,
        #[arg(long, help = "Export with metadata and a summary of every collection")]
        branches: bool,
        #[arg(short, long, help = "Output file. By default bloomlog-backup-<date>.json")]
        output: Option<PathBuf>,
    },
    #[command(about = "Import a backup file. Collections missing from the file are left untouched")]
    Import { file: PathBuf },
    #[command(about = "Remove all stored data")]
    Clear {
        #[arg(long)]
        yes: bool,
    },
}

pub fn run_cli() -> Result<()> {
    let args = Args::parse();

    let app_dir = args
        .dir
        .clone()
        .map_or_else(create_application_default_path, ensure_dir)?;

    let logging_level = if args.log {
        Some(LevelFilter::TRACE)
    } else {
        None
    };
    enable_logging(CLI_PREFIX, &app_dir, logging_level, args.log)?;
    debug!("Using application directory {app_dir:?}");

    single_thread_runtime()?.block_on(run_command(args, app_dir))
}

async fn run_command(args: Args, app_dir: PathBuf) -> Result<()> {
    let storage = FileRecordStore::new(app_dir.join("records"))?;
    let date_style = args.date_style;

    match args.commands {
        Commands::Start { at } => {
            let clock = command_clock(at.as_deref(), date_style)?;
            let mut tracker = CycleTracker::load(storage, clock).await?;
            period::start(&mut tracker).await?;
        }
        Commands::End { at } => {
            let clock = command_clock(at.as_deref(), date_style)?;
            let mut tracker = CycleTracker::load(storage, clock).await?;
            period::end(&mut tracker).await?;
        }
        Commands::Log {
            symptoms,
            flow,
            note,
            at,
        } => {
            let clock = command_clock(at.as_deref(), date_style)?;
            let mut tracker = CycleTracker::load(storage, clock).await?;
            period::log(&mut tracker, symptoms, flow, note).await?;
        }
        Commands::Delete { index } => {
            let mut tracker = CycleTracker::load(storage, command_clock(None, date_style)?).await?;
            period::delete(&mut tracker, index).await?;
        }
        Commands::Status {} => {
            let tracker = CycleTracker::load(storage, command_clock(None, date_style)?).await?;
            period::print_status(&tracker);
        }
        Commands::Stats {} => {
            let tracker = CycleTracker::load(storage, command_clock(None, date_style)?).await?;
            period::print_stats(&tracker.stats());
        }
        Commands::History {} => {
            let tracker = CycleTracker::load(storage, command_clock(None, date_style)?).await?;
            period::print_history(&tracker.state().cycles);
        }
        Commands::Export {
            only,
            branches,
            output,
        } => backup::export(&storage, only, branches, output, Utc::now()).await?,
        Commands::Import { file } => backup::import(&storage, file).await?,
        Commands::Clear { yes } => backup::clear(&storage, yes).await?,
    }
    Ok(())
}
