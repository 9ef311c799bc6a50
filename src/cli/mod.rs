//! Command-line interface for gemyank

use std::process::ExitCode;

use anyhow::Result;
use clap::Subcommand;

use crate::auth::CredentialsAuthenticator;
use crate::config::{Config, ConfigProvider, Settings};
use crate::http::HttpTransport;
use crate::ui::Ui;

mod yank;

pub use yank::{Outcome, YankArgs, YankCommand};

/// Name the binary is invoked as, used in usage text
pub const PROGRAM_NAME: &str = "gemyank";

#[derive(Subcommand)]
pub enum Commands {
    /// Remove a specific gem version release from the gem host
    #[command(disable_version_flag = true)]
    Yank(YankArgs),
}

/// Execute a CLI command
pub fn execute(command: Commands, config: &Config) -> Result<ExitCode> {
    match command {
        Commands::Yank(args) => run_yank(&args, config),
    }
}

fn run_yank(args: &YankArgs, config: &Config) -> Result<ExitCode> {
    let settings = Settings::resolve(config, args.host.as_deref())?;
    let transport = HttpTransport::new(settings.host(), config.http.timeout_secs)?;
    let mut authenticator = CredentialsAuthenticator::new(
        settings.host(),
        settings.api_key(),
        config.credentials_path()?,
        &transport,
    );
    let mut ui = Ui::stdio();

    let outcome =
        YankCommand::new(PROGRAM_NAME, &mut authenticator, &transport, &settings).execute(args, &mut ui)?;

    Ok(match outcome {
        Outcome::Requested => ExitCode::SUCCESS,
        Outcome::Terminated { exit_code } => ExitCode::from(exit_code),
    })
}
