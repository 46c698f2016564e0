use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;

use crate::client::HaloClient;
use crate::config::{Config, EndpointOverrides};
use crate::identity::{mask_token, Identity, KeyringIdentity};
use crate::logging::init_logging;
use crate::menu::{dispatch, Navigate};
use crate::prompts::TerminalPrompter;

#[derive(Parser)]
#[command(name = "infinite-bookmarker")]
#[command(about = "Bookmark Halo Infinite maps, modes and match films", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Match stats service URL (overrides config)
    #[arg(long, global = true, env = "HALO_STATS_URL")]
    pub stats_url: Option<String>,

    /// UGC discovery service URL (overrides config)
    #[arg(long, global = true, env = "HALO_DISCOVERY_URL")]
    pub discovery_url: Option<String>,

    /// UGC authoring service URL (overrides config)
    #[arg(long, global = true, env = "HALO_AUTHORING_URL")]
    pub authoring_url: Option<String>,

    /// XUID to use instead of the stored identity
    #[arg(long = "with-xuid", global = true, env = "HALO_XUID", hide = true)]
    pub with_xuid: Option<String>,

    /// Spartan token to use instead of the stored identity
    #[arg(
        long = "with-spartan-token",
        global = true,
        env = "HALO_SPARTAN_TOKEN",
        hide = true,
        hide_env_values = true
    )]
    pub with_spartan_token: Option<String>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Jump straight into the bookmark menu
    Bookmark,

    /// Identity commands
    #[command(subcommand)]
    Auth(AuthCommands),

    /// Configuration commands
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Subcommand)]
pub enum AuthCommands {
    /// Store an XUID and Spartan token
    Login {
        /// Xbox network ID
        #[arg(long)]
        xuid: String,
        /// Spartan token (x-343-authorization-spartan)
        #[arg(long)]
        spartan_token: String,
    },
    /// Remove the stored identity
    Logout,
    /// Show the active identity
    Status,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Set a configuration value
    Set {
        /// Configuration key (e.g., api.stats_url)
        key: String,
        /// Configuration value
        value: String,
    },
    /// Get a configuration value
    Get {
        /// Configuration key
        key: String,
    },
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        let config = Config::load()?;
        let level = if self.verbose { "debug" } else { "info" };
        let _guard = init_logging(&config.log_dir(), level)?;

        let overrides = EndpointOverrides {
            stats_url: self.stats_url,
            discovery_url: self.discovery_url,
            authoring_url: self.authoring_url,
        };
        let identities = KeyringIdentity::new(self.with_xuid, self.with_spartan_token);

        match self.command {
            None => interactive(Navigate::Base, &config, &overrides, &identities).await?,
            Some(Commands::Bookmark) => {
                interactive(Navigate::Bookmark, &config, &overrides, &identities).await?
            }
            Some(Commands::Auth(cmd)) => match cmd {
                AuthCommands::Login {
                    xuid,
                    spartan_token,
                } => {
                    identities.store(&Identity {
                        xuid: xuid.trim().to_string(),
                        spartan_token: spartan_token.trim().to_string(),
                    })?;
                    println!("{} Identity saved successfully", "✓".green());
                }
                AuthCommands::Logout => {
                    identities.clear()?;
                    println!("{} Identity removed", "✓".green());
                }
                AuthCommands::Status => match identities.current()? {
                    Some(identity) => {
                        println!("{} {}", "✓".green(), "Signed in".bold());
                        println!("  XUID: {}", identity.xuid);
                        println!("  Spartan token: {}", mask_token(&identity.spartan_token));
                    }
                    None => {
                        println!("{} Not signed in", "✗".red());
                        println!(
                            "  Run 'infinite-bookmarker auth login --xuid <XUID> --spartan-token <TOKEN>' to sign in"
                        );
                    }
                },
            },
            Some(Commands::Config(cmd)) => match cmd {
                ConfigCommands::Set { key, value } => {
                    config.set(&key, &value)?;
                    println!("{} Configuration updated: {} = {}", "✓".green(), key, value);
                }
                ConfigCommands::Get { key } => match config.get(&key)? {
                    Some(val) => println!("{}", val),
                    None => println!("Configuration key '{}' not found", key),
                },
            },
        }

        Ok(())
    }
}

async fn interactive(
    start: Navigate,
    config: &Config,
    overrides: &EndpointOverrides,
    identities: &KeyringIdentity,
) -> Result<()> {
    let endpoints = config.endpoints(overrides)?;
    let client = HaloClient::new(&endpoints)?;
    let mut prompter = TerminalPrompter;

    tracing::info!(?start, ?endpoints, "starting interactive session");
    dispatch(start, &mut prompter, &client, identities)
        .await
        .context("Interactive session failed")
}
