// Path: crates/drp-network/src/message.rs
use parity_scale_codec::{Decode, Encode};

/// The kind of a [`Message`], and therefore which handler on the
/// receiving node's object dispatches it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Encode, Decode)]
pub enum MessageType {
    /// Reserved; never sent.
    Unspecified = 0,
    /// Requests a peer's ACL and DRP state at a given vertex hash.
    FetchState = 1,
    /// Carries the ACL/DRP state a `FetchState` asked for.
    FetchStateResponse = 2,
    /// Announces newly locally-applied vertices and attestations.
    Update = 3,
    /// Requests the vertices a peer is missing, given its frontier.
    Sync = 4,
    /// Carries the vertices and hashes a `Sync` asked for.
    SyncAccept = 5,
    /// Declines a `Sync` request.
    SyncReject = 6,
    /// Carries newly collected finality attestations.
    AttestationUpdate = 7,
    /// Asks who else is subscribed to an object's topic.
    DrpDiscovery = 8,
    /// Carries the multiaddrs of an object topic's known subscribers.
    DrpDiscoveryResponse = 9,
    /// An application-defined message outside the built-in protocol.
    Custom = 10,
}

/// The wire envelope every message crosses the network as.
///
/// `data` is opaque at this layer: its shape depends on `message_type`
/// and is decoded separately, typically as one or more
/// [`drp_codec::Value`]s or serialized [`drp_types::Vertex`]es. Only
/// the envelope itself — `sender`, `message_type`, `object_id`, and
/// the `data` length — is on the SCALE-encoded hot path every message
/// pays for; the payload is handled by whichever layer understands
/// this particular `message_type`.
#[derive(Clone, Debug, PartialEq, Eq, Encode, Decode)]
pub struct Message {
    /// The authoring peer's id.
    pub sender: String,
    /// What kind of message this is.
    pub message_type: MessageType,
    /// The object this message concerns, or the empty string for
    /// discovery messages routed to the shared discovery topic.
    pub object_id: String,
    /// The type-specific payload.
    pub data: Vec<u8>,
}

impl Message {
    /// Builds a new message envelope.
    pub fn new(sender: impl Into<String>, message_type: MessageType, object_id: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            sender: sender.into(),
            message_type,
            object_id: object_id.into(),
            data,
        }
    }

    /// SCALE-encodes this envelope for the wire.
    pub fn encode_envelope(&self) -> Vec<u8> {
        self.encode()
    }

    /// Decodes an envelope received off the wire.
    pub fn decode_envelope(bytes: &[u8]) -> Result<Self, crate::error::NetworkError> {
        let mut slice = bytes;
        Message::decode(&mut slice).map_err(|e| crate::error::NetworkError::Decode(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_round_trips_through_scale() {
        let message = Message::new("peer-a", MessageType::Update, "obj-1", vec![1, 2, 3]);
        let bytes = message.encode_envelope();
        let decoded = Message::decode_envelope(&bytes).unwrap();
        assert_eq!(decoded, message);
    }

    #[test]
    fn truncated_bytes_fail_to_decode() {
        let message = Message::new("peer-a", MessageType::Sync, "obj-1", vec![9; 16]);
        let mut bytes = message.encode_envelope();
        bytes.truncate(bytes.len() - 4);
        assert!(Message::decode_envelope(&bytes).is_err());
    }
}
