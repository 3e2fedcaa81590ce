use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use conference_roster_backend::import::{import_classes, import_participants};
use conference_roster_backend::model::{Conference, Participant};
use conference_roster_backend::normalize::FeedTable;
use conference_roster_backend::repository::{load, load_classes, load_conference};
use conference_roster_backend::telemetry::setup_telemetry;
use conference_roster_backend::{build_schedule, LunchCache, SyncReport};
use conference_roster_config::get_config;
use conference_roster_database::{PgStore, Store, Transaction};
use itertools::Itertools;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "roster-import")]
#[command(about = "Reconcile conference feeds with the roster database")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Import the complete registration export
    Participants {
        /// Feed as JSON `{"columns": [...], "rows": [[...], ...]}`
        feed: PathBuf,
    },
    /// Import the complete class spreadsheet
    Classes {
        /// Feed as JSON `{"columns": [...], "rows": [[...], ...]}`
        feed: PathBuf,
    },
    /// Print a participant's sessions and lunch
    Schedule { participant_id: String },
}

async fn read_feed(path: &Path) -> Result<FeedTable> {
    let contents = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&contents).with_context(|| format!("parsing {}", path.display()))
}

fn print_report(kind: &str, report: &SyncReport) {
    println!(
        "{kind}: {} inserted, {} updated, {} deleted, {} unchanged",
        report.inserted, report.updated, report.deleted, report.unchanged
    );
}

async fn print_schedule(store: &PgStore, participant_id: &str) -> Result<()> {
    let mut tx = store.begin().await?;
    let participant = load::<Participant, _>(&mut tx, participant_id)
        .await?
        .with_context(|| format!("no participant {participant_id}"))?;
    let classes = load_classes(&mut tx).await?;
    let conference: Arc<Conference> = Arc::new(load_conference(&mut tx).await?);
    tx.rollback().await?;

    let schedule = build_schedule(&participant, &classes);
    let lunches = LunchCache::new();
    let resolver = lunches.resolver(&conference);
    let lunch = resolver.resolve(&participant);

    println!(
        "{} {} ({})",
        participant.display_first_name(),
        participant.last_name,
        participant.id()
    );
    for (session, slot) in schedule.sessions.iter().enumerate() {
        let class = slot.number.and_then(|number| classes.get(&number));
        let title = class.map_or("No Class", |class| class.title.as_str());
        let role = if slot.instructor { " (instructor)" } else { "" };
        match slot.number {
            Some(number) => println!(
                "  session {}: {number} {title} part {}{role}",
                session + 1,
                slot.part
            ),
            None => println!("  session {}: {title}", session + 1),
        }
    }
    println!(
        "  lunch: {} seating {} at {}",
        lunch.name, lunch.seating, lunch.location
    );
    if !schedule.diagnostics.is_empty() {
        println!(
            "  problems: {}",
            schedule
                .diagnostics
                .iter()
                .map(|diagnostic| format!("{diagnostic:?}"))
                .join(", ")
        );
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = get_config()?;
    setup_telemetry(config.log_filter.as_deref());

    let store = PgStore::connect(&config.database_url)?;
    match cli.command {
        Command::Participants { feed } => {
            info!(feed = %feed.display(), "importing participants");
            let table = read_feed(&feed).await?;
            let report = import_participants(&store, &table, &config).await?;
            print_report("participants", &report);
        }
        Command::Classes { feed } => {
            info!(feed = %feed.display(), "importing classes");
            let table = read_feed(&feed).await?;
            let report = import_classes(&store, &table, &config).await?;
            print_report("classes", &report);
        }
        Command::Schedule { participant_id } => print_schedule(&store, &participant_id).await?,
    }
    Ok(())
}
