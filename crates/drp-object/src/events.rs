// Path: crates/drp-object/src/events.rs
//! Replaces the original design's inline subscriber callbacks with a
//! bounded broadcast channel: callers `subscribe()` and poll a
//! `Receiver` instead of registering a closure the object holds
//! forever.

/// An event emitted by a [`crate::DRPObject`] as it processes local
/// writes and remote merges.
#[derive(Clone, Debug, PartialEq)]
pub enum ObjectEvent {
    /// A locally authored vertex was created and applied.
    Applied {
        /// The new vertex's hash.
        vertex_hash: String,
    },
    /// A batch of remote vertices was merged.
    Merged {
        /// Hashes that were validated, inserted, and replayed.
        accepted: Vec<String>,
        /// Hashes that referenced dependencies this object doesn't
        /// have yet; the caller should fetch and retry them.
        missing: Vec<String>,
    },
}
