//! recipient-link - issue and open recipient links, check registration forms.

use anyhow::Context;
use clap::{Parser, Subcommand};
use recipient_link::caps::{CapabilityPayload, EncryptedToken, WalletAddress};
use recipient_link::config::{self, Config, LoggingConfig};
use recipient_link::eligibility::{Clock, EligibilityWindowValidator, FixedClock, SystemClock};
use recipient_link::registration::{RegistrationForm, RegistrationValidator};
use recipient_link::{RecipientLinkService, telemetry};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Environment variable that lets a weak link secret through startup checks.
const ALLOW_INSECURE_ENV: &str = "RECIPIENT_LINK_ALLOW_INSECURE_KEY";

#[derive(Debug, Parser)]
#[command(name = "recipient-link", version, about)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, global = true, default_value = "config.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Issue a recipient link for an order and print it.
    Issue {
        #[arg(long)]
        order_id: u64,
        #[arg(long)]
        wallet: String,
    },
    /// Open a recipient link (or a bare token) and print its payload as JSON.
    Open { link: String },
    /// Check a birth date (RFC 3339 or YYYY-MM-DD) against the age window.
    CheckAge {
        birth_date: String,
        /// Reference instant; defaults to the current time.
        #[arg(long)]
        now: Option<String>,
    },
    /// Validate a registration form read from a JSON file, or `-` for stdin.
    ValidateRegistration {
        path: PathBuf,
        /// Reference instant; defaults to the current time.
        #[arg(long)]
        now: Option<String>,
    },
    /// Load and validate the configuration, then exit.
    CheckConfig,
}

impl Command {
    fn needs_config(&self) -> bool {
        matches!(self, Self::Issue { .. } | Self::Open { .. } | Self::CheckConfig)
    }
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let config = match cli
        .command
        .needs_config()
        .then(|| Config::load(&cli.config))
        .transpose()
    {
        Ok(config) => config,
        Err(e) => {
            telemetry::init(&LoggingConfig::default());
            error!(path = %cli.config.display(), error = %e, "Failed to load config");
            return Err(e.into());
        }
    };

    let default_logging = LoggingConfig::default();
    telemetry::init(config.as_ref().map_or(&default_logging, |c| &c.logging));

    match (cli.command, config) {
        (Command::Issue { order_id, wallet }, Some(config)) => {
            let service = build_service(&config)?;
            let wallet = WalletAddress::parse(&wallet)?;
            let payload = CapabilityPayload::new(order_id, wallet)?;
            println!("{}", service.issue(&payload)?);
            Ok(ExitCode::SUCCESS)
        }
        (Command::Open { link }, Some(config)) => {
            let service = build_service(&config)?;
            let payload = if link.starts_with("http://") || link.starts_with("https://") {
                service.redeem(&link)?
            } else {
                service.redeem_token(&EncryptedToken::from(link))?
            };
            println!("{}", serde_json::to_string_pretty(&payload)?);
            Ok(ExitCode::SUCCESS)
        }
        (Command::CheckConfig, Some(config)) => {
            build_service(&config)?;
            println!("configuration OK");
            Ok(ExitCode::SUCCESS)
        }
        (Command::CheckAge { birth_date, now }, _) => {
            let clock = clock_at(now.as_deref())?;
            let birth_date = recipient_link::eligibility::parse_birth_date(&birth_date)
                .with_context(|| format!("invalid birth date {birth_date:?}"))?;

            let result = EligibilityWindowValidator::new(clock.as_ref()).check(birth_date);
            if result.is_valid() {
                println!("ok");
                return Ok(ExitCode::SUCCESS);
            }
            for violation in result.violations() {
                println!("{violation}");
            }
            Ok(ExitCode::FAILURE)
        }
        (Command::ValidateRegistration { path, now }, _) => {
            let clock = clock_at(now.as_deref())?;
            let form: RegistrationForm = serde_json::from_str(&read_input(&path)?)
                .context("registration form is not a JSON object")?;

            match RegistrationValidator::new(clock.as_ref()).validate(&form) {
                Ok(registration) => {
                    println!("{}", serde_json::to_string_pretty(&registration)?);
                    Ok(ExitCode::SUCCESS)
                }
                Err(violations) => {
                    println!("{}", serde_json::to_string_pretty(&violations)?);
                    Ok(ExitCode::FAILURE)
                }
            }
        }
        (command, None) => {
            anyhow::bail!("{command:?} requires a configuration file")
        }
    }
}

/// Validate the config and build the service.
///
/// A weak secret is fatal unless `RECIPIENT_LINK_ALLOW_INSECURE_KEY` is set.
/// Every other validation error is always fatal.
fn build_service(config: &Config) -> anyhow::Result<RecipientLinkService> {
    if let Err(errors) = config::validate(config) {
        let allow_insecure = std::env::var(ALLOW_INSECURE_ENV).is_ok();
        let mut fatal = false;
        let mut weak = false;

        for e in &errors {
            if e.is_waivable() && allow_insecure {
                warn!(
                    error = %e,
                    "INSECURE: running with a weak link secret (allowed via {ALLOW_INSECURE_ENV})"
                );
            } else {
                error!(error = %e, "Invalid configuration");
                weak |= e.is_waivable();
                fatal = true;
            }
        }

        if weak {
            error!("  Anyone who can guess the link secret can forge recipient links.");
            error!("  Generate a secure secret with:");
            error!("    openssl rand -hex 32");
            error!("  For testing only, set {ALLOW_INSECURE_ENV}=1 to bypass this check.");
        }
        if fatal {
            anyhow::bail!("Refusing to start with invalid configuration. See error messages above.");
        }
    }

    let keys = config.link.key_material()?;
    info!(
        active_key = keys.active_key().id(),
        retired_keys = keys.retired_ids().count(),
        base_url = %keys.base_url(),
        "Key material loaded"
    );
    Ok(RecipientLinkService::new(Arc::new(keys)))
}

fn clock_at(now: Option<&str>) -> anyhow::Result<Box<dyn Clock>> {
    match now {
        Some(s) => {
            let at = recipient_link::eligibility::parse_birth_date(s)
                .with_context(|| format!("invalid --now {s:?}"))?;
            Ok(Box::new(FixedClock::new(at)))
        }
        None => Ok(Box::new(SystemClock)),
    }
}

fn read_input(path: &Path) -> anyhow::Result<String> {
    if path.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        return Ok(buf);
    }
    std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}
