use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use serde_json::json;

use crate::address::Address;
use crate::config::Config;
use crate::contracts::JavaContracts;
use crate::deploy::Deploy;
use crate::reporter::{Console, Reporter, Silent};

#[derive(Debug, Parser)]
pub struct CommandLine {
    /// target endpoint for connection
    #[clap(short, long, default_value = "gochain")]
    endpoint: String,

    /// keystore file for creating transactions
    #[clap(short, long, default_value = "res/keystore_gochain")]
    keystore: PathBuf,

    /// password for the keystore file
    #[clap(short, long, default_value = "gochain")]
    password: String,

    /// suppress progress output
    #[clap(short, long)]
    quiet: bool,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Deploy a contract, or update the one at --to
    Deploy {
        /// target contract to deploy
        contract: String,

        /// target address to be updated
        #[clap(long, value_name = "ADDRESS")]
        to: Option<Address>,
    },
}

impl CommandLine {
    pub async fn execute(self) -> Result<()> {
        let config = Config::new(&self.endpoint, &self.keystore, &self.password)?;
        let reporter: &dyn Reporter = if self.quiet { &Silent } else { &Console };

        match self.command {
            Command::Deploy { contract, to } => {
                let params = json!({
                    "TOBEREVEALED_URI": "q",
                    "MAX_PRESALES": 1000,
                });
                let deploy = Deploy::new(
                    config.owner(),
                    config.tx_handler(),
                    JavaContracts::default(),
                    reporter,
                );
                deploy.run(&contract, to.as_ref(), &params).await?;
                Ok(())
            }
        }
    }
}
