//! staysync CLI entry point.

use std::process::ExitCode;

use clap::Parser;

use staysync_cli::cli::{CacheAction, Cli, Command, ConfigAction};
use staysync_cli::commands::{self, Context};
use staysync_cli::config::StaysyncConfig;
use staysync_cli::error::CliResult;
use staysync_core::{TracingConfig, init_tracing};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let tracing_config = if cli.debug {
        TracingConfig::cli_debug()
    } else {
        TracingConfig::default()
    };
    if let Err(e) = init_tracing(tracing_config) {
        eprintln!("warning: {}", e);
    }

    match run(cli).await {
        Ok(output) => {
            if !output.is_empty() {
                println!("{}", output);
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> CliResult<String> {
    let config_path = cli.config.clone().unwrap_or_else(StaysyncConfig::default_path);
    let config = if cli.config.is_some() {
        StaysyncConfig::load_from(&config_path)?
    } else {
        StaysyncConfig::load()?
    };

    // Config commands never open the database.
    if let Command::Config { action } = &cli.command {
        return match action {
            ConfigAction::Dump => commands::config::dump(&config, &config_path),
            ConfigAction::Validate => commands::config::validate(&config),
            ConfigAction::Path => Ok(commands::config::path(&config, &config_path)),
        };
    }

    let today = chrono::Local::now().date_naive();
    let ctx = Context::open(config, cli.json).await?;

    match cli.command {
        Command::Sync => commands::sync::run(&ctx).await,
        Command::Availability { room, period } => {
            commands::availability::show(&ctx, room.room.as_deref(), &period, today).await
        }
        Command::Admit(args) => commands::reservations::admit(&ctx, &args).await,
        Command::Block { room, dates, note } => {
            commands::availability::set_block(
                &ctx,
                room.room.as_deref(),
                &dates,
                note.as_deref(),
                true,
            )
            .await
        }
        Command::Unblock { room, dates } => {
            commands::availability::set_block(&ctx, room.room.as_deref(), &dates, None, false)
                .await
        }
        Command::Bookings => commands::reservations::list_bookings(&ctx).await,
        Command::Reservations => commands::reservations::list_reservations(&ctx).await,
        Command::Cancel { id } => commands::reservations::cancel(&ctx, &id).await,
        Command::Cache {
            action: CacheAction::Clear { yes },
        } => commands::reservations::clear_cache(&ctx, yes).await,
        Command::Config { .. } => Ok(String::new()),
    }
}
