//! Node descriptors from the testnet topology

use serde::{Deserialize, Serialize};
use std::fmt;

/// Role a node plays in the testnet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeMode {
    /// Participates in consensus, holds full application state
    #[default]
    Validator,
    /// Follows the chain and holds full application state
    Full,
    /// Verifies headers only, does not answer application queries
    Light,
    /// Peer-exchange only, stateless
    Seed,
}

impl NodeMode {
    /// Whether the node can answer application-level state queries
    pub fn serves_app_state(self) -> bool {
        matches!(self, NodeMode::Validator | NodeMode::Full)
    }

    /// Stateless nodes never see transactions
    pub fn is_stateless(self) -> bool {
        self == NodeMode::Seed
    }
}

impl fmt::Display for NodeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            NodeMode::Validator => "validator",
            NodeMode::Full => "full",
            NodeMode::Light => "light",
            NodeMode::Seed => "seed",
        };
        f.write_str(s)
    }
}

/// A node as described by the testnet manifest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeDescriptor {
    /// Node name, also used to namespace test keys
    pub name: String,
    /// Node mode
    #[serde(default)]
    pub mode: NodeMode,
    /// RPC endpoint (e.g. `http://127.0.0.1:26657`)
    #[serde(default)]
    pub rpc_addr: String,
}

impl NodeDescriptor {
    pub fn new(name: impl Into<String>, mode: NodeMode) -> Self {
        Self {
            name: name.into(),
            mode,
            rpc_addr: String::new(),
        }
    }

    pub fn with_rpc_addr(mut self, addr: impl Into<String>) -> Self {
        self.rpc_addr = addr.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_capabilities() {
        assert!(NodeMode::Validator.serves_app_state());
        assert!(NodeMode::Full.serves_app_state());
        assert!(!NodeMode::Light.serves_app_state());
        assert!(!NodeMode::Seed.serves_app_state());
        assert!(NodeMode::Seed.is_stateless());
        assert!(!NodeMode::Light.is_stateless());
    }

    #[test]
    fn test_descriptor_defaults_to_validator() {
        let node: NodeDescriptor = serde_json::from_str(r#"{"name":"node0"}"#).unwrap();
        assert_eq!(node.mode, NodeMode::Validator);

        let light: NodeDescriptor =
            serde_json::from_str(r#"{"name":"light0","mode":"light"}"#).unwrap();
        assert_eq!(light.mode, NodeMode::Light);
        assert_eq!(light.mode.to_string(), "light");
    }
}
