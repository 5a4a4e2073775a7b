//! `provision` binary entry point.

use anyhow::Result;
use clap::Parser;
use std::process::ExitCode;
use std::sync::Arc;

use provision_cli::cli::{Cli, Command};
use provision_cli::commands;
use provision_cli::logging::{self, Logger};

fn main() -> ExitCode {
    let args = match Cli::try_parse() {
        Ok(args) => args,
        Err(e) => {
            let _ = e.print();
            // --help and --version print to stdout and are not failures
            return if e.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    let command = args.selected();
    let global = &args.global;
    let result = match &command {
        Command::Completions { shell } => {
            commands::completions::run(*shell, &mut std::io::stdout().lock());
            Ok(())
        }
        Command::Version => {
            commands::version::run(&mut std::io::stdout().lock()).map_err(anyhow::Error::from)
        }
        Command::Install => run_logged(&args, &command, |log| commands::install::run(global, log)),
        Command::Prefs => run_logged(&args, &command, |log| commands::prefs::run(global, log)),
        Command::Dock => run_logged(&args, &command, |log| commands::dock::run(global, log)),
        Command::Vm { action } => {
            run_logged(&args, &command, |log| commands::vm::run(global, action, log))
        }
    };

    if result.is_ok() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

/// Run `command` with a log file and console subscriber, logging any error.
fn run_logged(
    args: &Cli,
    command: &Command,
    run: impl FnOnce(&Arc<Logger>) -> Result<()>,
) -> Result<()> {
    logging::init_subscriber(args.verbose, command.log_name());
    let log = Arc::new(Logger::new(command.log_name()));

    let result = run(&log);
    if let Err(e) = &result {
        log.error(&format!("{e:#}"));
    }
    result
}
