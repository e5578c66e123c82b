// Path: crates/drp-acl/src/view.rs
use std::collections::BTreeMap;

use drp_types::PeerId;

pub use drp_object::AclView;

impl AclView for crate::ObjectAcl {
    fn finality_signer_keys(&self) -> BTreeMap<PeerId, Vec<u8>> {
        self.finality_signer_keys()
    }

    fn is_writer(&self, peer_id: &str) -> bool {
        self.is_writer(peer_id)
    }
}
