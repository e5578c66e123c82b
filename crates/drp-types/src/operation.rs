// Path: crates/drp-types/src/operation.rs
use serde::{Deserialize, Serialize};

use drp_codec::Value;

/// Which state machine a vertex's [`Operation`] belongs to.
///
/// A `HashGraph` carries two interleaved causal histories per object:
/// the governing ACL and the application-level `Drp`. Every non-root
/// vertex tags which one it mutates so the replay pipeline can resolve
/// and apply the two layers independently, with ACL vertices always
/// resolved ahead of DRP vertices within a concurrent batch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DrpType {
    /// Mutates the object's access-control state.
    Acl,
    /// Mutates the object's application-level state.
    Drp,
}

/// The user-defined mutation carried by a non-root vertex.
///
/// `op_type` names which operation of the target (ACL or business)
/// implementation to invoke (e.g. `"add"`, `"delete"`, `"grant"`);
/// `value` is its argument list, already flattened into the wire value
/// tree so that `drp-hashgraph` never needs to know the concrete `Drp`
/// type to hash or store a vertex. `drp_type` says which of the two
/// layers `op_type` is dispatched against.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    /// Which state machine this operation targets.
    pub drp_type: DrpType,
    /// The name of the operation to apply.
    pub op_type: String,
    /// The operation's positional arguments.
    pub value: Vec<Value>,
}

impl Operation {
    /// Builds an operation from a layer tag, operation name, and
    /// argument list.
    pub fn new(drp_type: DrpType, op_type: impl Into<String>, value: Vec<Value>) -> Self {
        Self {
            drp_type,
            op_type: op_type.into(),
            value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn construction_preserves_fields() {
        let op = Operation::new(DrpType::Drp, "add", vec![Value::Int(1)]);
        assert_eq!(op.drp_type, DrpType::Drp);
        assert_eq!(op.op_type, "add");
        assert_eq!(op.value, vec![Value::Int(1)]);
    }
}
