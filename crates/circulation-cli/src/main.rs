//! Circulation CLI - library loan ledger
//!
//! This is the command-line interface for Circulation. It opens the configured
//! store and forwards each command to the core ledger engine.

mod app;
mod cli;
mod commands;
mod config;
mod constants;
mod errors;
mod helpers;
mod logging;
mod output;

use clap::Parser;

use crate::app::AppContext;
use crate::cli::{Cli, Commands};
use crate::errors::{exit_code_for, hint_for};

fn main() {
    let cli = Cli::parse();
    let ctx = AppContext::new(&cli);

    let config_level = ctx
        .config()
        .ok()
        .flatten()
        .and_then(|config| config.log.level.clone());
    logging::init(cli.verbose, config_level.as_deref());

    if let Err(err) = run(&ctx) {
        eprintln!("Error: {}", err);
        if let Some(hint) = hint_for(&err) {
            eprintln!("{}", hint);
        }
        let code = exit_code_for(&err);
        tracing::debug!(code, error = %err, "command failed");
        std::process::exit(code);
    }
}

fn run(ctx: &AppContext) -> anyhow::Result<()> {
    match &ctx.cli().command {
        Commands::Init(args) => commands::init::handle_init(ctx, args),
        Commands::Book(command) => commands::books::handle_book(ctx, command),
        Commands::Member(command) => commands::members::handle_member(ctx, command),
        Commands::Loan(command) => commands::loans::handle_loan(ctx, command),
        Commands::Status => commands::maintenance::handle_status(ctx),
        Commands::Check => commands::maintenance::handle_check(ctx),
        Commands::Completions(args) => commands::misc::handle_completions(args.shell),
    }
}
