//! Sane dotfiles.
//!
//! A thin wrapper around git that keeps repository metadata in
//! `~/.config/sdf` and uses the home directory as the work tree. `clone`,
//! `init` and `trace` are handled here; every other command is handed to git
//! with the location flags prepended.

use std::env;
use std::ffi::OsString;
use std::io;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::debug;

use sdf::core::arity::{program_argv, single_url};
use sdf::delegate::{CommandDelegator, mirrored_exit_code};
use sdf::exit_codes;
use sdf::io::config::{SdfConfig, load_config};
use sdf::io::confirm::TerminalPrompt;
use sdf::io::git::GitEngine;
use sdf::io::process::SystemRunner;
use sdf::io::profile::ProfilePaths;
use sdf::logging;
use sdf::repository::RepositoryController;
use sdf::trace::TraceCollector;

const USAGE: &str = "Usage: sdf <command> [<args>]

SDF: Sane DotFiles
Manage your dotfiles with ease.

SDF is a wrapper around Git and helps version control dotfiles.
It reimplements a few commands and provides some more.

SDF specific commands are:

   clone <url>   Clone user profile configuration from given URL
   init  <url>   Create an empty profile with given URL as upstream
   trace <arg>   List files opened by given command during runtime

Because SDF is just a wrapper around Git, you can pass all valid
git commands like so:

   $ sdf add ~/.bashrc
   $ sdf commit -m \"Initial commit\"

See Git's documentation with 'man git' for more details.
";

#[derive(Parser)]
#[command(
    name = "sdf",
    disable_help_flag = true,
    disable_version_flag = true,
    disable_help_subcommand = true
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Clone user profile configuration from the given URL.
    #[command(disable_help_flag = true)]
    Clone {
        #[arg(num_args = 0.., allow_hyphen_values = true)]
        args: Vec<OsString>,
    },
    /// Create an empty profile with the given URL as upstream.
    #[command(disable_help_flag = true)]
    Init {
        #[arg(num_args = 0.., allow_hyphen_values = true)]
        args: Vec<OsString>,
    },
    /// List profile files opened by a program while it runs.
    #[command(disable_help_flag = true)]
    Trace {
        #[arg(num_args = 0.., trailing_var_arg = true, allow_hyphen_values = true)]
        argv: Vec<OsString>,
    },
    /// Any other git command, run against the profile repository.
    #[command(external_subcommand)]
    Passthrough(Vec<OsString>),
}

fn main() {
    logging::init();
    match run() {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("{:#}", err);
            std::process::exit(exit_codes::FATAL);
        }
    }
}

fn run() -> Result<i32> {
    let args: Vec<OsString> = env::args_os().collect();
    let Some(command) = parse_command(&args) else {
        print!("{USAGE}");
        return Ok(exit_codes::OK);
    };

    let paths = ProfilePaths::from_env()?;
    let config = load_config(&paths.config_file)?;
    let runner = SystemRunner;
    let git = GitEngine::new(&runner, &config.git, &paths);

    match command {
        Command::Clone { args } => cmd_clone(git, &args),
        Command::Init { args } => cmd_init(git, &args),
        Command::Trace { argv } => cmd_trace(&paths, &config, &argv),
        Command::Passthrough(args) => cmd_passthrough(git, &args),
    }
}

/// Interpret argv, treating anything clap rejects as a git command line.
///
/// `clone`, `init` and `trace` accept any bytes, so they never reach the
/// fallback and always go through their own handlers.
fn parse_command(args: &[OsString]) -> Option<Command> {
    match Cli::try_parse_from(args) {
        Ok(cli) => cli.command,
        Err(err) => {
            debug!(err = %err.kind(), "not an sdf command, delegating");
            Some(Command::Passthrough(args.iter().skip(1).cloned().collect()))
        }
    }
}

fn cmd_clone(git: GitEngine<'_, SystemRunner>, args: &[OsString]) -> Result<i32> {
    let url = match single_url(args) {
        Ok(url) => url,
        Err(err) => {
            println!("{}", err.message());
            return Ok(exit_codes::OK);
        }
    };
    let outcome = RepositoryController::new(git).import(url, &mut TerminalPrompt::stdio())?;
    println!("{}", outcome.message());
    Ok(exit_codes::OK)
}

fn cmd_init(git: GitEngine<'_, SystemRunner>, args: &[OsString]) -> Result<i32> {
    let url = match single_url(args) {
        Ok(url) => url,
        Err(err) => {
            println!("{}", err.message());
            return Ok(exit_codes::OK);
        }
    };
    let outcome = RepositoryController::new(git).bootstrap(url, &mut TerminalPrompt::stdio())?;
    println!("{}", outcome.message());
    Ok(exit_codes::OK)
}

fn cmd_trace(paths: &ProfilePaths, config: &SdfConfig, argv: &[OsString]) -> Result<i32> {
    let program_argv = match program_argv(argv) {
        Ok(program_argv) => program_argv,
        Err(err) => {
            println!("{}", err.message());
            return Ok(exit_codes::OK);
        }
    };
    let collector = TraceCollector::new(paths, config);
    let outcome = collector.trace(program_argv, &mut io::stdout().lock())?;
    if let Some(message) = outcome.message() {
        println!("{message}");
    }
    Ok(exit_codes::OK)
}

fn cmd_passthrough(git: GitEngine<'_, SystemRunner>, args: &[OsString]) -> Result<i32> {
    let status = CommandDelegator::new(git).delegate(args)?;
    Ok(mirrored_exit_code(status))
}
