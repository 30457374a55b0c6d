//! Testnet manifest
//!
//! ```toml
//! [harness]
//! commit_timeout_secs = 30
//!
//! [local]
//! block_time_ms = 100
//!
//! [[node]]
//! name = "validator01"
//! mode = "validator"
//! rpc_addr = "http://127.0.0.1:26657"
//! ```

use e2e_harness::{HarnessConfig, HarnessError};
use e2e_types::{NodeDescriptor, NodeMode};
use local_node::{BlockProducerConfig, BLOCK_TIME_MS, MAX_TXS_PER_BLOCK};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("Cannot read manifest {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid manifest {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid manifest: {0}")]
    Invalid(String),

    #[error(transparent)]
    Harness(#[from] HarnessError),
}

/// Settings for the in-process testnet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocalConfig {
    pub block_time_ms: u64,
    pub max_txs_per_block: usize,
}

impl Default for LocalConfig {
    fn default() -> Self {
        Self {
            block_time_ms: BLOCK_TIME_MS,
            max_txs_per_block: MAX_TXS_PER_BLOCK,
        }
    }
}

impl LocalConfig {
    pub fn producer_config(&self, verbose: bool) -> BlockProducerConfig {
        BlockProducerConfig {
            block_time_ms: self.block_time_ms,
            max_txs_per_block: self.max_txs_per_block,
            verbose,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub harness: HarnessConfig,
    #[serde(default)]
    pub local: LocalConfig,
    #[serde(default, rename = "node")]
    pub nodes: Vec<NodeDescriptor>,
}

impl Manifest {
    pub fn load(path: &Path) -> Result<Self, ManifestError> {
        let text = std::fs::read_to_string(path).map_err(|source| ManifestError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let manifest: Manifest = toml::from_str(&text).map_err(|source| ManifestError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        manifest.validate()?;
        Ok(manifest)
    }

    /// Topology used by `--local` when no manifest is given
    pub fn local_default(validators: usize) -> Self {
        let mut nodes = vec![NodeDescriptor::new("seed01", NodeMode::Seed)];
        nodes.extend(
            (1..=validators.max(1))
                .map(|i| NodeDescriptor::new(format!("validator{:02}", i), NodeMode::Validator)),
        );
        nodes.push(NodeDescriptor::new("full01", NodeMode::Full));
        nodes.push(NodeDescriptor::new("light01", NodeMode::Light));

        Self {
            nodes,
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<(), ManifestError> {
        if self.nodes.is_empty() {
            return Err(ManifestError::Invalid("no nodes defined".to_string()));
        }

        let mut seen = HashSet::new();
        for node in &self.nodes {
            if node.name.is_empty() {
                return Err(ManifestError::Invalid("node without a name".to_string()));
            }
            if !seen.insert(node.name.as_str()) {
                return Err(ManifestError::Invalid(format!("duplicate node {}", node.name)));
            }
        }

        if self.local.block_time_ms == 0 {
            return Err(ManifestError::Invalid("block_time_ms must be > 0".to_string()));
        }

        self.harness.validate()?;
        Ok(())
    }

    /// Nodes that need an RPC address to be tested remotely
    pub fn missing_rpc_addrs(&self) -> Vec<&str> {
        self.nodes
            .iter()
            .filter(|n| !n.mode.is_stateless() && n.rpc_addr.is_empty())
            .map(|n| n.name.as_str())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_manifest(text: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(text.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_manifest() {
        let file = write_manifest(
            r#"
[harness]
test_id = "ci-tx"
commit_timeout_secs = 60

[[node]]
name = "validator01"
mode = "validator"
rpc_addr = "127.0.0.1:26657"

[[node]]
name = "light01"
mode = "light"
rpc_addr = "127.0.0.1:26667"

[[node]]
name = "seed01"
mode = "seed"
"#,
        );

        let manifest = Manifest::load(file.path()).unwrap();
        assert_eq!(manifest.harness.test_id, "ci-tx");
        assert_eq!(manifest.harness.commit_timeout_secs, 60);
        assert_eq!(manifest.harness.poll_interval_ms, 1000);
        assert_eq!(manifest.local, LocalConfig::default());
        assert_eq!(manifest.nodes.len(), 3);
        assert_eq!(manifest.nodes[1].mode, NodeMode::Light);
        assert!(manifest.missing_rpc_addrs().is_empty());
    }

    #[test]
    fn test_mode_defaults_to_validator() {
        let file = write_manifest("[[node]]\nname = \"node0\"\n");
        let manifest = Manifest::load(file.path()).unwrap();
        assert_eq!(manifest.nodes[0].mode, NodeMode::Validator);
        assert_eq!(manifest.missing_rpc_addrs(), vec!["node0"]);
    }

    #[test]
    fn test_rejects_duplicates_and_bad_mode() {
        let dup = write_manifest("[[node]]\nname = \"a\"\n[[node]]\nname = \"a\"\n");
        assert!(matches!(
            Manifest::load(dup.path()),
            Err(ManifestError::Invalid(_))
        ));

        let bad = write_manifest("[[node]]\nname = \"a\"\nmode = \"archive\"\n");
        assert!(matches!(
            Manifest::load(bad.path()),
            Err(ManifestError::Parse { .. })
        ));
    }

    #[test]
    fn test_rejects_bad_harness_settings() {
        let file = write_manifest("[harness]\npoll_interval_ms = 0\n[[node]]\nname = \"a\"\n");
        assert!(matches!(
            Manifest::load(file.path()),
            Err(ManifestError::Harness(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = Manifest::load(&dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, ManifestError::Io { .. }));
    }

    #[test]
    fn test_local_default_topology() {
        let manifest = Manifest::local_default(3);
        manifest.validate().unwrap();
        let names: Vec<_> = manifest.nodes.iter().map(|n| n.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["seed01", "validator01", "validator02", "validator03", "full01", "light01"]
        );
    }
}
