//! VotoTrack CLI - operator front end for the census sync engine
//!
//! Sync the roster from the published sheet, inspect it, and mark turnout.

use std::env;
use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use thiserror::Error;
use vototrack_core::auth::{Operator, OperatorDirectory};
use vototrack_core::config::SheetConfig;
use vototrack_core::dispatch::DeliveryOutcome;
use vototrack_core::filter::{scoped_view, RosterFilter};
use vototrack_core::models::{Scope, Voter};
use vototrack_core::notify::{send_individual_reminder, send_mass_reminder, SimulatedSender};
use vototrack_core::sync::SyncState;
use vototrack_core::{CensusService, VoterId};

/// Build-provisioned snapshot endpoint, overridable via `VOTOTRACK_CSV_URL`.
const DEFAULT_CSV_URL: &str =
    "https://docs.google.com/spreadsheets/d/e/2PACX-example/pub?gid=0&single=true&output=csv";

#[derive(Parser)]
#[command(name = "vototrack")]
#[command(about = "Track election-day turnout against a shared roster")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Optional path to local cache file
    #[arg(long, value_name = "PATH")]
    db_path: Option<PathBuf>,

    /// Operator username (defaults to unrestricted local access)
    #[arg(long, global = true)]
    user: Option<String>,

    /// Operator password
    #[arg(long, global = true)]
    password: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch the remote roster and reconcile it into the local cache
    Sync,
    /// List visible roster records
    List {
        /// Free-text search over name, email, and phone
        #[arg(short, long)]
        search: Option<String>,
        /// Restrict by affiliation
        #[arg(long, value_enum, default_value_t = AffiliationArg::Todos)]
        affiliation: AffiliationArg,
        /// Restrict by turnout status
        #[arg(long, value_enum, default_value_t = StatusArg::Todos)]
        status: StatusArg,
        /// Restrict to one voting center (unrestricted operators only)
        #[arg(long)]
        center: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Mark a voter as having voted
    Mark {
        /// Voter id
        id: i64,
        /// Clear the voted mark instead of setting it
        #[arg(long)]
        undo: bool,
    },
    /// Send a turnout reminder
    Remind {
        /// Voter id
        id: Option<i64>,
        /// Remind every visible voter still pending
        #[arg(long, conflicts_with = "id")]
        all_pending: bool,
    },
    /// Show turnout summary and last sync time
    Status,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
enum AffiliationArg {
    Todos,
    Afiliados,
    NoAfiliados,
}

impl AffiliationArg {
    const fn as_filter(self) -> Option<bool> {
        match self {
            Self::Todos => None,
            Self::Afiliados => Some(true),
            Self::NoAfiliados => Some(false),
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
enum StatusArg {
    Todos,
    Votado,
    NoVotado,
}

impl StatusArg {
    const fn as_filter(self) -> Option<bool> {
        match self {
            Self::Todos => None,
            Self::Votado => Some(true),
            Self::NoVotado => Some(false),
        }
    }
}

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Core(#[from] vototrack_core::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
    #[error("Invalid username or password")]
    InvalidCredentials,
    #[error("Both --user and --password are required to authenticate")]
    IncompleteCredentials,
    #[error("Voter {0} is outside your scope")]
    OutOfScope(i64),
    #[error("Provide a voter id or --all-pending")]
    MissingReminderTarget,
    #[error("Unknown voting center: {0}")]
    UnknownCenter(String),
}

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), CliError> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("vototrack=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();
    let scope = resolve_scope(cli.user.as_deref(), cli.password.as_deref())?;
    let config = resolve_config()?;
    let service = CensusService::open(resolve_db_path(cli.db_path), config)?;

    match cli.command {
        Commands::Sync => run_sync(&service).await?,
        Commands::List {
            search,
            affiliation,
            status,
            center,
            json,
        } => {
            if let Some(center) = &center {
                if !service.config().centers.contains(center) {
                    return Err(CliError::UnknownCenter(center.clone()));
                }
            }
            let filter = RosterFilter {
                search,
                affiliated: affiliation.as_filter(),
                voted: status.as_filter(),
                center,
            };
            run_list(&service, &scope, &filter, json).await?;
        }
        Commands::Mark { id, undo } => run_mark(&service, &scope, VoterId(id), !undo).await?,
        Commands::Remind { id, all_pending } => {
            run_remind(&service, &scope, id.map(VoterId), all_pending).await?;
        }
        Commands::Status => run_status(&service, &scope).await?,
    }

    Ok(())
}

async fn run_sync(service: &CensusService) -> Result<(), CliError> {
    let outcome = service.refresh().await?;
    if outcome.replaced() {
        println!(
            "Synced {} records at {}",
            outcome.state().roster.len(),
            outcome.state().last_sync_at.as_deref().unwrap_or("-")
        );
    } else {
        println!("Remote snapshot was empty; kept previous roster");
    }
    Ok(())
}

#[derive(Debug, Serialize)]
struct VoterListItem {
    id: i64,
    nombre: String,
    telefono: String,
    email: String,
    afiliado: bool,
    ha_votado: bool,
    hora_voto: Option<String>,
    centro: String,
    mesa: String,
}

fn voter_to_list_item(voter: &Voter) -> VoterListItem {
    VoterListItem {
        id: voter.id.0,
        nombre: voter.full_name(),
        telefono: voter.telefono.clone(),
        email: voter.email.clone(),
        afiliado: voter.afiliado_ugt,
        ha_votado: voter.ha_votado,
        hora_voto: voter.hora_voto.clone(),
        centro: voter.centro_votacion.clone(),
        mesa: voter.mesa_votacion.clone(),
    }
}

async fn run_list(
    service: &CensusService,
    scope: &Scope,
    filter: &RosterFilter,
    as_json: bool,
) -> Result<(), CliError> {
    let state = visible_state(service).await?;
    let view = scoped_view(&state.roster, scope, filter);

    if as_json {
        let items: Vec<VoterListItem> = view.iter().map(voter_to_list_item).collect();
        println!("{}", serde_json::to_string_pretty(&items)?);
    } else {
        for voter in &view {
            let mark = if voter.ha_votado { "x" } else { " " };
            let hora = voter.hora_voto.as_deref().unwrap_or("--:--");
            println!(
                "[{mark}] {:>6}  {}  {} ({})",
                voter.id,
                hora,
                voter.full_name(),
                voter.mesa_votacion
            );
        }
        println!("{} records", view.len());
    }

    Ok(())
}

async fn run_mark(
    service: &CensusService,
    scope: &Scope,
    id: VoterId,
    has_voted: bool,
) -> Result<(), CliError> {
    ensure_in_scope(service, scope, id).await?;

    let result = service.set_vote_status(id, has_voted).await?;
    if !result.applied {
        println!("Delivery failed; local state unchanged. Retry when back online.");
        return Ok(());
    }

    let hora = result
        .record
        .as_ref()
        .and_then(|r| r.hora_voto.as_deref())
        .unwrap_or("-");
    match result.outcome {
        DeliveryOutcome::Confirmed => println!("Marked {id} (hora {hora}), local-only"),
        DeliveryOutcome::Unconfirmed => {
            println!("Marked {id} (hora {hora}), dispatched to sheet (unconfirmed)");
        }
        DeliveryOutcome::Failed => unreachable!("failed delivery is never applied"),
    }
    Ok(())
}

async fn run_remind(
    service: &CensusService,
    scope: &Scope,
    id: Option<VoterId>,
    all_pending: bool,
) -> Result<(), CliError> {
    let state = visible_state(service).await?;
    let visible = scoped_view(&state.roster, scope, &RosterFilter::default());
    let sender = SimulatedSender;

    if let Some(id) = id {
        let voter = visible
            .get(id)
            .ok_or_else(|| CliError::OutOfScope(id.0))?;
        if send_individual_reminder(&sender, voter).await {
            println!("Reminder handed off for {id}");
        } else {
            println!("Reminder hand-off failed for {id}; retry later");
        }
        return Ok(());
    }

    if !all_pending {
        return Err(CliError::MissingReminderTarget);
    }

    let pending: Vec<Voter> = visible.iter().filter(|v| !v.ha_votado).cloned().collect();
    let delivered = send_mass_reminder(&sender, &pending).await;
    println!("Handed off {delivered} of {} pending reminders", pending.len());
    Ok(())
}

async fn run_status(service: &CensusService, scope: &Scope) -> Result<(), CliError> {
    let state = visible_state(service).await?;
    let view = scoped_view(&state.roster, scope, &RosterFilter::default());
    let turnout = view.turnout();

    println!("Voted {} of {}", turnout.voted, turnout.total);
    println!(
        "Last sync: {}",
        state.last_sync_at.as_deref().unwrap_or("never")
    );
    Ok(())
}

/// Load state, running the automatic first sync when the cache is empty.
async fn visible_state(service: &CensusService) -> Result<SyncState, CliError> {
    service.ensure_initial_sync().await?;
    Ok(service.load_state()?)
}

async fn ensure_in_scope(
    service: &CensusService,
    scope: &Scope,
    id: VoterId,
) -> Result<(), CliError> {
    let state = visible_state(service).await?;
    let visible = scoped_view(&state.roster, scope, &RosterFilter::default());
    if visible.get(id).is_none() {
        return Err(CliError::OutOfScope(id.0));
    }
    Ok(())
}

fn resolve_scope(user: Option<&str>, password: Option<&str>) -> Result<Scope, CliError> {
    match (user, password) {
        (None, None) => Ok(Scope::All),
        (Some(user), Some(password)) => {
            let Operator { scope, .. } = OperatorDirectory::with_defaults()
                .verify(user, password)
                .ok_or(CliError::InvalidCredentials)?;
            Ok(scope)
        }
        _ => Err(CliError::IncompleteCredentials),
    }
}

fn resolve_config() -> Result<SheetConfig, CliError> {
    match SheetConfig::from_env() {
        Some(config) => Ok(config?),
        None => Ok(SheetConfig::new(
            DEFAULT_CSV_URL,
            env::var("VOTOTRACK_SCRIPT_URL").ok(),
        )?),
    }
}

fn resolve_db_path(cli_db_path: Option<PathBuf>) -> PathBuf {
    cli_db_path
        .or_else(|| env::var_os("VOTOTRACK_DB_PATH").map(PathBuf::from))
        .unwrap_or_else(default_db_path)
}

fn default_db_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("vototrack")
        .join("vototrack.db")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn affiliation_arg_maps_to_filter() {
        assert_eq!(AffiliationArg::Todos.as_filter(), None);
        assert_eq!(AffiliationArg::Afiliados.as_filter(), Some(true));
        assert_eq!(AffiliationArg::NoAfiliados.as_filter(), Some(false));
    }

    #[test]
    fn status_arg_maps_to_filter() {
        assert_eq!(StatusArg::Todos.as_filter(), None);
        assert_eq!(StatusArg::Votado.as_filter(), Some(true));
        assert_eq!(StatusArg::NoVotado.as_filter(), Some(false));
    }

    #[test]
    fn resolve_scope_requires_both_credentials() {
        assert!(matches!(resolve_scope(None, None), Ok(Scope::All)));
        assert!(matches!(
            resolve_scope(Some("admin"), None),
            Err(CliError::IncompleteCredentials)
        ));
        assert!(matches!(
            resolve_scope(Some("admin"), Some("wrong")),
            Err(CliError::InvalidCredentials)
        ));
        assert!(matches!(
            resolve_scope(Some("admin"), Some("admin")),
            Ok(Scope::All)
        ));
    }

    #[test]
    fn resolve_db_path_prefers_cli_argument() {
        let explicit = resolve_db_path(Some(PathBuf::from("/tmp/census.db")));
        assert_eq!(explicit, PathBuf::from("/tmp/census.db"));
    }

    #[test]
    fn default_config_is_valid() {
        // The built-in endpoint must pass the sharing-link check.
        assert!(SheetConfig::new(DEFAULT_CSV_URL, None).is_ok());
    }
}
