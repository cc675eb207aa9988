//! srcpf-migrate CLI - migrates IBM i source physical file members to
//! stream files.

use clap::Parser;
use srcpf_migrate::{Config, MigrateError, MigrationRequest};
use std::path::PathBuf;
use std::process::ExitCode;
use tokio_util::sync::CancellationToken;
use tracing::{info, Level};
use tracing_subscriber::fmt::format::FmtSpan;

#[cfg(unix)]
use tokio::signal::unix::{signal, SignalKind};

#[derive(Parser)]
#[command(name = "srcpf-migrate")]
#[command(about = "Migrates IBM i source physical file members to stream files")]
#[command(version)]
struct Cli {
    /// Source library
    #[arg(short = 'l', long)]
    library: String,

    /// Restrict the migration to one source physical file
    #[arg(long)]
    source_file: Option<String>,

    /// Migrate only these members (requires --source-file)
    #[arg(long, num_args = 1.., requires = "source_file")]
    members: Vec<String>,

    /// Output root; relative paths resolve against the home directory
    #[arg(short, long, default_value = "sources")]
    output: String,

    /// Override the maximum number of concurrent transfers
    #[arg(long)]
    workers: Option<usize>,

    /// Path to YAML configuration file
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,

    /// Output the summary as JSON to stdout
    #[arg(long)]
    output_json: bool,

    /// Log format: text or json
    #[arg(long, default_value = "text")]
    log_format: String,

    /// Log verbosity: debug, info, warn, error
    #[arg(long, default_value = "info")]
    verbosity: String,
}

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e.format_detailed());
            ExitCode::from(e.exit_code())
        }
    }
}

async fn run() -> Result<(), MigrateError> {
    let cli = Cli::parse();

    setup_logging(&cli.verbosity, &cli.log_format)
        .map_err(MigrateError::Config)?;

    let mut config = Config::load(&cli.config)?.with_auto_tuning();
    info!("Loaded configuration from {:?}", cli.config);

    if let Some(workers) = cli.workers {
        if workers == 0 {
            return Err(MigrateError::Config("--workers must be at least 1".into()));
        }
        config.migration.workers = Some(workers);
    }

    // SIGINT/SIGTERM stop dispatching new transfers; in-flight ones
    // are drained before the summary is printed.
    let cancel = setup_signal_handler();

    let request = MigrationRequest {
        library: cli.library,
        source_file: cli.source_file,
        members: cli.members,
        output_root: cli.output,
    };

    let summary = migrate(&config, request, cancel).await?;

    if cli.output_json {
        println!("{}", summary.to_json()?);
    } else {
        let heading = if summary.status == "cancelled" {
            "Migration cancelled."
        } else {
            "Migration completed."
        };
        println!("\n{}", heading);
        println!("  Source files migrated: {}", summary.source_files_migrated);
        println!("  Members migrated: {}", summary.members_migrated);
        println!("  Migration errors: {}", summary.errors);
        println!("  Total time taken: {:.2} seconds", summary.duration_seconds);
    }

    Ok(())
}

#[cfg(feature = "odbc")]
async fn migrate(
    config: &Config,
    request: MigrationRequest,
    cancel: CancellationToken,
) -> Result<srcpf_migrate::MigrationSummary, MigrateError> {
    use srcpf_migrate::{OdbcHost, Orchestrator};
    use std::sync::Arc;

    let host = Arc::new(OdbcHost::connect(&config.host).await?);

    info!("User: {}", config.host.user.to_uppercase());
    info!("System: {}", host.system_name().await?);
    info!("System's CCSID: {}", host.ccsid().await?);

    let orchestrator = Orchestrator::new(host.clone(), host, config.migration.clone());
    orchestrator.run(request, cancel).await
}

#[cfg(not(feature = "odbc"))]
async fn migrate(
    _config: &Config,
    _request: MigrationRequest,
    _cancel: CancellationToken,
) -> Result<srcpf_migrate::MigrationSummary, MigrateError> {
    Err(MigrateError::Config(
        "this build has no host binding; rebuild with --features odbc".into(),
    ))
}

fn setup_logging(verbosity: &str, format: &str) -> Result<(), String> {
    let level = match verbosity.to_lowercase().as_str() {
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_span_events(FmtSpan::CLOSE)
        .with_target(false);

    if format == "json" {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    Ok(())
}

/// Setup signal handlers for graceful shutdown.
/// Handles both SIGINT (Ctrl-C) and SIGTERM.
#[cfg(unix)]
fn setup_signal_handler() -> CancellationToken {
    let cancel_token = CancellationToken::new();

    let token_int = cancel_token.clone();
    let token_term = cancel_token.clone();

    tokio::spawn(async move {
        let mut sigint = signal(SignalKind::interrupt()).expect("Failed to setup SIGINT handler");
        sigint.recv().await;
        eprintln!("\nReceived SIGINT. Draining in-flight transfers...");
        token_int.cancel();
    });

    tokio::spawn(async move {
        let mut sigterm = signal(SignalKind::terminate()).expect("Failed to setup SIGTERM handler");
        sigterm.recv().await;
        eprintln!("\nReceived SIGTERM. Draining in-flight transfers...");
        token_term.cancel();
    });

    cancel_token
}

/// Setup signal handler for Windows (only SIGINT/Ctrl-C)
#[cfg(not(unix))]
fn setup_signal_handler() -> CancellationToken {
    let cancel_token = CancellationToken::new();
    let token = cancel_token.clone();

    tokio::spawn(async move {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to setup Ctrl-C handler");
        eprintln!("\nReceived Ctrl-C. Draining in-flight transfers...");
        token.cancel();
    });

    cancel_token
}
