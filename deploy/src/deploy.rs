use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{anyhow, Result};
use serde_json::Value;

use crate::address::Address;
use crate::contracts::{JavaContracts, JAVA_CONTENT_TYPE, ZIP_CONTENT_TYPE};
use crate::package;
use crate::reporter::Reporter;
use crate::tx_handler::TxHandler;
use crate::wallet::KeyWallet;

/// Resolved deploy payload location for a target.
#[derive(Debug, PartialEq, Eq)]
enum Source {
    Jar(PathBuf),
    Dir(PathBuf),
}

impl Source {
    fn content_type(&self) -> &'static str {
        match self {
            Source::Jar(_) => JAVA_CONTENT_TYPE,
            Source::Dir(_) => ZIP_CONTENT_TYPE,
        }
    }
}

fn resolve_source(contracts: &JavaContracts, target: &str) -> Source {
    match contracts.jar_path(target) {
        Some(jar) => Source::Jar(PathBuf::from(jar)),
        None => Source::Dir(Path::new(".").join(target)),
    }
}

pub struct Deploy<'a, T: TxHandler> {
    owner: &'a KeyWallet,
    tx_handler: &'a T,
    contracts: JavaContracts,
    reporter: &'a dyn Reporter,
}

impl<'a, T: TxHandler> Deploy<'a, T> {
    pub fn new(
        owner: &'a KeyWallet,
        tx_handler: &'a T,
        contracts: JavaContracts,
        reporter: &'a dyn Reporter,
    ) -> Self {
        Deploy {
            owner,
            tx_handler,
            contracts,
            reporter,
        }
    }

    /// Package `target`, submit one install (`to` absent) or update (`to`
    /// present) transaction, and return the resulting contract address.
    pub async fn run(&self, target: &str, to: Option<&Address>, params: &Value) -> Result<Address> {
        self.reporter
            .report(&format!(">>> owner address: {}", self.owner.address()));

        let source = resolve_source(&self.contracts, target);
        let content_type = source.content_type();
        let content = match &source {
            Source::Jar(path) => {
                self.reporter
                    .report(&format!(">>> jar path = {}", path.display()));
                package::read_jar(path)?
            }
            Source::Dir(path) => package::zip_directory(path)?,
        };
        self.reporter
            .report(&format!(">>> content size = {}", content.len()));

        let tx_hash = match to {
            None => {
                self.tx_handler
                    .install(self.owner, &content, content_type, params)
                    .await?
            }
            Some(to) => {
                self.reporter.report(&format!(">>> to = {to}"));
                self.tx_handler
                    .update(self.owner, to, &content, content_type, params)
                    .await?
            }
        };
        self.reporter.report(&format!(">>> deploy txHash: {tx_hash}"));

        let tx_result = self
            .tx_handler
            .ensure_tx_result(&tx_hash, self.reporter.enabled())
            .await?;
        let score_address = tx_result
            .get("scoreAddress")
            .and_then(Value::as_str)
            .ok_or_else(|| anyhow!("scoreAddress not found in tx result"))?;
        let score_address = Address::from_str(score_address)?;
        self.reporter
            .report(&format!(">>> scoreAddress: {score_address}"));
        Ok(score_address)
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use serde_json::json;

    use super::*;
    use crate::reporter::Silent;

    const SCORE: &str = "cx26d2757d45ec7aea0b35bc0e63a4e4e2c4e3c9bc";

    #[derive(Debug, PartialEq, Eq)]
    enum Call {
        Install {
            content_type: String,
            content_len: usize,
            params: Value,
        },
        Update {
            to: Address,
            content_type: String,
        },
        EnsureResult {
            tx_hash: String,
        },
    }

    struct MockTxHandler {
        calls: Mutex<Vec<Call>>,
        result: Value,
    }

    impl MockTxHandler {
        fn returning(result: Value) -> Self {
            MockTxHandler {
                calls: Mutex::new(Vec::new()),
                result,
            }
        }

        fn calls(self) -> Vec<Call> {
            self.calls.into_inner().unwrap()
        }
    }

    #[async_trait]
    impl TxHandler for MockTxHandler {
        async fn install(
            &self,
            _owner: &KeyWallet,
            content: &[u8],
            content_type: &str,
            params: &Value,
        ) -> Result<String> {
            self.calls.lock().unwrap().push(Call::Install {
                content_type: content_type.to_string(),
                content_len: content.len(),
                params: params.clone(),
            });
            Ok("0xbeef".to_string())
        }

        async fn update(
            &self,
            _owner: &KeyWallet,
            to: &Address,
            _content: &[u8],
            content_type: &str,
            _params: &Value,
        ) -> Result<String> {
            self.calls.lock().unwrap().push(Call::Update {
                to: to.clone(),
                content_type: content_type.to_string(),
            });
            Ok("0xbeef".to_string())
        }

        async fn ensure_tx_result(&self, tx_hash: &str, _wait_notice: bool) -> Result<Value> {
            self.calls.lock().unwrap().push(Call::EnsureResult {
                tx_hash: tx_hash.to_string(),
            });
            Ok(self.result.clone())
        }
    }

    fn owner() -> KeyWallet {
        KeyWallet::from_private_key(&[0x11; 32]).unwrap()
    }

    fn score_dir() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("package.json"), b"{}").unwrap();
        dir
    }

    #[test]
    fn registry_target_resolves_to_versioned_jar() {
        let source = resolve_source(&JavaContracts::default(), "app");
        assert_eq!(
            source,
            Source::Jar(PathBuf::from("./app/build/libs/app-0.1.0-optimized.jar"))
        );
        assert_eq!(source.content_type(), "application/java");
    }

    #[test]
    fn unregistered_target_resolves_to_score_directory() {
        let source = resolve_source(&JavaContracts::default(), "my_score");
        assert_eq!(source, Source::Dir(PathBuf::from("./my_score")));
        assert_eq!(source.content_type(), "application/zip");
    }

    #[tokio::test]
    async fn missing_to_installs() {
        let dir = score_dir();
        let owner = owner();
        let handler = MockTxHandler::returning(json!({"status": "0x1", "scoreAddress": SCORE}));
        let params = json!({"MAX_PRESALES": 1000});

        let deploy = Deploy::new(&owner, &handler, JavaContracts::default(), &Silent);
        let address = deploy
            .run(dir.path().to_str().unwrap(), None, &params)
            .await
            .unwrap();

        assert_eq!(address.as_str(), SCORE);
        let calls = handler.calls();
        assert_eq!(calls.len(), 2);
        match &calls[0] {
            Call::Install {
                content_type,
                content_len,
                params: seen,
            } => {
                assert_eq!(content_type, "application/zip");
                assert!(*content_len > 0);
                assert_eq!(seen, &params);
            }
            other => panic!("expected install, got {other:?}"),
        }
        assert_eq!(
            calls[1],
            Call::EnsureResult {
                tx_hash: "0xbeef".to_string()
            }
        );
    }

    #[tokio::test]
    async fn present_to_updates_that_address() {
        let dir = score_dir();
        let owner = owner();
        let handler = MockTxHandler::returning(json!({"status": "0x1", "scoreAddress": SCORE}));
        let to = Address::from_str(SCORE).unwrap();

        let deploy = Deploy::new(&owner, &handler, JavaContracts::default(), &Silent);
        deploy
            .run(dir.path().to_str().unwrap(), Some(&to), &json!({}))
            .await
            .unwrap();

        assert_eq!(
            handler.calls()[0],
            Call::Update {
                to,
                content_type: "application/zip".to_string()
            }
        );
    }

    #[tokio::test]
    async fn missing_score_address_fails() {
        let dir = score_dir();
        let owner = owner();
        let handler = MockTxHandler::returning(json!({"status": "0x1"}));

        let deploy = Deploy::new(&owner, &handler, JavaContracts::default(), &Silent);
        let err = deploy
            .run(dir.path().to_str().unwrap(), None, &json!({}))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("scoreAddress"));
    }

    #[tokio::test]
    async fn unreadable_target_fails_before_submission() {
        let owner = owner();
        let handler = MockTxHandler::returning(json!({"status": "0x1", "scoreAddress": SCORE}));

        let deploy = Deploy::new(&owner, &handler, JavaContracts::default(), &Silent);
        let result = deploy.run("no_such_score", None, &json!({})).await;

        assert!(result.is_err());
        assert!(handler.calls().is_empty());
    }
}
