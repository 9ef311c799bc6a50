//! Yank command implementation

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use reqwest::Method;

use crate::auth::Authenticator;
use crate::config::ConfigProvider;
use crate::error::YankError;
use crate::http::{ApiRequest, Transport};
use crate::platform;
use crate::requirement::{self, Version};
use crate::ui::Ui;

pub const YANK_PATH: &str = "api/v1/gems/yank";
pub const UNYANK_PATH: &str = "api/v1/gems/unyank";

/// Arguments of `yank`
#[derive(Args, Debug, Clone, Default)]
pub struct YankArgs {
    /// Name of the gem
    #[arg(value_name = "GEM")]
    pub gems: Vec<String>,

    /// Version to remove
    #[arg(short = 'v', long = "version", value_name = "VERSION")]
    pub version: Option<String>,

    /// Platform of the version to remove
    #[arg(short, long, value_name = "PLATFORM")]
    pub platform: Option<String>,

    /// Restore a previously yanked version
    #[arg(long)]
    pub undo: bool,

    /// Use API key from your gem credentials file
    #[arg(short, long, value_name = "KEY_NAME")]
    pub key: Option<String>,

    /// Gem host to yank from
    #[arg(long, env = "RUBYGEMS_HOST", value_name = "HOST")]
    pub host: Option<String>,
}

/// How an invocation ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The request was sent and its response printed
    Requested,
    /// Usage was printed instead of sending anything
    Terminated { exit_code: u8 },
}

/// Invocation syntax shown when no version is given
pub fn usage(program: &str) -> String {
    format!("{program} yank GEM -v VERSION [-p PLATFORM] [--undo] [--key KEY_NAME]")
}

/// The single gem name given on the command line
pub fn get_one_gem_name<'a>(gems: &'a [String], program: &str) -> Result<&'a str, YankError> {
    match gems {
        [] => Err(YankError::MissingGemName {
            program: format!("{program} yank"),
        }),
        [name] => Ok(name.as_str()),
        names => Err(YankError::TooManyGemNames(names.join(", "))),
    }
}

pub struct YankCommand<'a> {
    program: String,
    authenticator: &'a mut dyn Authenticator,
    transport: &'a dyn Transport,
    config: &'a dyn ConfigProvider,
}

impl<'a> YankCommand<'a> {
    pub fn new(
        program: &str,
        authenticator: &'a mut dyn Authenticator,
        transport: &'a dyn Transport,
        config: &'a dyn ConfigProvider,
    ) -> Self {
        Self {
            program: program.to_string(),
            authenticator,
            transport,
            config,
        }
    }

    pub fn execute(&mut self, args: &YankArgs, ui: &mut Ui) -> Result<Outcome> {
        let signed_in_key = self.authenticator.sign_in(ui)?;

        let version = requirement::version_from_requirement(args.version.as_deref());
        let platform =
            platform::platform_from_options(args.platform.is_some(), self.config.platforms());

        if let (Some(given), Some(sent)) = (&args.platform, &platform) {
            if given != sent {
                tracing::warn!(
                    "--platform {} is not sent as given; the request uses platform {:?}",
                    given,
                    sent
                );
            }
        }

        let api_key = match &args.key {
            Some(name) => {
                let key = self.config.named_api_key(name);
                if key.is_none() {
                    tracing::warn!("No API key named {:?} in credentials", name);
                }
                key.map(str::to_string)
            }
            None => Some(signed_in_key),
        };

        let platform = platform.as_deref();
        let api_key = api_key.as_deref();

        match version {
            Some(version) => {
                if args.undo {
                    self.unyank_gem(&args.gems, &version, platform, api_key, ui)?;
                } else {
                    self.yank_gem(&args.gems, &version, platform, api_key, ui)?;
                }
                Ok(Outcome::Requested)
            }
            None => {
                ui.say(&format!(
                    "A version argument is required: {}",
                    usage(&self.program)
                ))?;
                Ok(Outcome::Terminated { exit_code: 1 })
            }
        }
    }

    fn yank_gem(
        &self,
        gems: &[String],
        version: &Version,
        platform: Option<&str>,
        api_key: Option<&str>,
        ui: &mut Ui,
    ) -> Result<()> {
        ui.say(&format!("Yanking gem from {}...", self.config.host()).cyan().to_string())?;
        self.yank_api_request(Method::DELETE, gems, version, platform, YANK_PATH, api_key, ui)
    }

    fn unyank_gem(
        &self,
        gems: &[String],
        version: &Version,
        platform: Option<&str>,
        api_key: Option<&str>,
        ui: &mut Ui,
    ) -> Result<()> {
        ui.say(&format!("Unyanking gem from {}...", self.config.host()).cyan().to_string())?;
        self.yank_api_request(Method::PUT, gems, version, platform, UNYANK_PATH, api_key, ui)
    }

    #[allow(clippy::too_many_arguments)]
    fn yank_api_request(
        &self,
        method: Method,
        gems: &[String],
        version: &Version,
        platform: Option<&str>,
        path: &str,
        api_key: Option<&str>,
        ui: &mut Ui,
    ) -> Result<()> {
        let name = get_one_gem_name(gems, &self.program)?;

        let mut request = ApiRequest::new(method, path)
            .header("Authorization", api_key.unwrap_or_default())
            .form_field("gem_name", name)
            .form_field("version", version.as_str());

        if let Some(platform) = platform {
            request = request.form_field("platform", platform);
        }

        tracing::info!("Requesting {} of {} {}", path, name, version);
        let response = self.transport.send(&request)?;

        ui.say(&response.body)?;
        Ok(())
    }
}
