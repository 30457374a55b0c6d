//! Mode gate - decides whether state verification applies to a node

use e2e_types::NodeMode;

/// What to do after a transaction has been committed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    /// Query application state and compare
    Verify,
    /// The node holds no application state; verification is vacuous
    Skip { reason: String },
}

pub fn mode_gate(mode: NodeMode) -> GateDecision {
    if mode.serves_app_state() {
        GateDecision::Verify
    } else {
        GateDecision::Skip {
            reason: format!("{} nodes do not serve application queries", mode),
        }
    }
}
