use std::path::Path;

use anyhow::{anyhow, Result};

use crate::tx_handler::JsonRpcTxHandler;
use crate::wallet::KeyWallet;

const ENDPOINTS: &[(&str, &str, u64)] = &[
    ("gochain", "http://localhost:9082/api/v3", 3),
    ("mainnet", "https://ctz.solidwallet.io/api/v3", 1),
    ("lisbon", "https://lisbon.net.solidwallet.io/api/v3", 2),
    ("berlin", "https://berlin.net.solidwallet.io/api/v3", 7),
];

/// Resolved per-invocation configuration: owner identity plus a transaction
/// handler bound to the target endpoint.
pub struct Config {
    owner: KeyWallet,
    tx_handler: JsonRpcTxHandler,
}

impl Config {
    pub fn new(endpoint: &str, keystore: &Path, password: &str) -> Result<Self> {
        let &(_, url, nid) = ENDPOINTS
            .iter()
            .find(|(name, _, _)| *name == endpoint)
            .ok_or_else(|| anyhow!("unknown endpoint: '{endpoint}'"))?;
        let owner = KeyWallet::load(keystore, password)?;
        Ok(Config {
            owner,
            tx_handler: JsonRpcTxHandler::new(url, nid),
        })
    }

    pub fn owner(&self) -> &KeyWallet {
        &self.owner
    }

    pub fn tx_handler(&self) -> &JsonRpcTxHandler {
        &self.tx_handler
    }
}
