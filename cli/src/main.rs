use clap::Parser;

mod commands;
mod http;

use aura_core::api::{AgentContext, AgentError, BackendPreference, CliError, LoggingConfig};
use commands::cli::{Args, Commands};
use commands::tasks;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

static LOG_GUARD: std::sync::OnceLock<tracing_appender::non_blocking::WorkerGuard> =
    std::sync::OnceLock::new();

#[tokio::main]
async fn main() {
    let exit = match real_main().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{e}");
            exit_code_for_error(&e)
        }
    };

    std::process::exit(exit);
}

async fn real_main() -> Result<i32, CliError> {
    let args = Args::parse();
    let mut cfg =
        aura_core::config::load_default().map_err(|e| CliError::Config(e.to_string()))?;

    // Global flags override file/env config.
    if args.debug {
        cfg.debug = true;
        cfg.logging.level = "debug".to_string();
    }
    if let Some(backend) = args.backend.as_deref() {
        cfg.preferred_backend = if backend.eq_ignore_ascii_case("auto") {
            BackendPreference::Auto
        } else {
            BackendPreference::Pinned(backend.parse().map_err(CliError::Config)?)
        };
    }
    if args.headless {
        cfg.headless = true;
    }
    if args.headed {
        cfg.headless = false;
    }

    init_tracing(&cfg.logging).map_err(CliError::Command)?;

    let ctx = AgentContext::new(cfg).await?;

    match args.command {
        Commands::Generate(a) => tasks::handle_generate(&ctx, a).await,
        Commands::Export(a) => tasks::handle_export(&ctx, a).await,
        Commands::Create { name } => tasks::handle_create(&ctx, name).await,
        Commands::Prompt(a) => tasks::handle_prompt(&ctx, a).await,
        Commands::Template(a) => tasks::handle_template(&ctx, a).await,
        Commands::Execute(a) => tasks::handle_execute(&ctx, a).await,
        Commands::Health => tasks::handle_health(&ctx).await,
        Commands::Intercept => tasks::handle_intercept(&ctx).await,
        Commands::Interactive => tasks::handle_interactive(&ctx).await,
        Commands::Serve(a) => http::server::handle_serve(a, &ctx).await.map(|_| 0),
    }
}

fn exit_code_for_error(err: &CliError) -> i32 {
    match err {
        CliError::Config(_) => 2,
        CliError::Agent(AgentError::Config(_)) => 2,
        _ => 1,
    }
}

fn init_tracing(cfg: &LoggingConfig) -> Result<(), String> {
    if !cfg.enabled {
        return Ok(());
    }

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cfg.level.clone()));

    let console_layer = cfg.console.then(|| {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
    });

    let file_layer = if cfg.file {
        let directory = cfg
            .directory
            .clone()
            .filter(|d| !d.trim().is_empty())
            .unwrap_or_else(|| std::env::temp_dir().to_string_lossy().to_string());
        let appender = tracing_appender::rolling::daily(directory, "aura-agent.log");
        let (writer, guard) = tracing_appender::non_blocking(appender);
        let _ = LOG_GUARD.set(guard);
        Some(tracing_subscriber::fmt::layer().with_writer(writer).with_ansi(false))
    } else {
        None
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| format!("failed to init tracing: {e}"))
}
