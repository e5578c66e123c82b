// Path: crates/drp-acl/src/group.rs
use std::fmt;

/// A permission group an `ObjectAcl` peer can belong to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Group {
    /// Can grant and revoke membership in any group.
    Admin,
    /// Can author non-ACL operations on the object.
    Writer,
    /// Can sign finality attestations.
    Finality,
}

impl Group {
    /// Parses a group from its wire name.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "admin" => Some(Group::Admin),
            "writer" => Some(Group::Writer),
            "finality" => Some(Group::Finality),
            _ => None,
        }
    }

    /// The wire name for this group.
    pub fn as_str(&self) -> &'static str {
        match self {
            Group::Admin => "admin",
            Group::Writer => "writer",
            Group::Finality => "finality",
        }
    }
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
