use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// The capability an access-control entry governs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RightType {
    Create,
    Query,
    Update,
    Delete,
    Provide,
    Subscribe,
}

impl fmt::Display for RightType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RightType::Create => write!(f, "CREATE"),
            RightType::Query => write!(f, "QUERY"),
            RightType::Update => write!(f, "UPDATE"),
            RightType::Delete => write!(f, "DELETE"),
            RightType::Provide => write!(f, "PROVIDE"),
            RightType::Subscribe => write!(f, "SUBSCRIBE"),
        }
    }
}

/// Whether a capability is granted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RightValue {
    Permitted,
    Rejected,
    Supported,
}

/// Typed access-control list keyed by [`RightType`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Rights(HashMap<RightType, RightValue>);

impl Rights {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, right: RightType, value: RightValue) -> Self {
        self.0.insert(right, value);
        self
    }

    pub fn set(&mut self, right: RightType, value: RightValue) {
        self.0.insert(right, value);
    }

    /// `None` when the descriptor carries no entry for `right`.
    pub fn get(&self, right: RightType) -> Option<RightValue> {
        self.0.get(&right).copied()
    }

    /// `true` only for an explicit, non-rejected entry.
    pub fn allows(&self, right: RightType) -> bool {
        match self.get(right) {
            Some(RightValue::Permitted) | Some(RightValue::Supported) => true,
            Some(RightValue::Rejected) | None => false,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Grants every CRUD right. Handy for pre-provisioned environments.
    pub fn all_crud() -> Self {
        Self::new()
            .with(RightType::Create, RightValue::Permitted)
            .with(RightType::Query, RightValue::Permitted)
            .with(RightType::Update, RightValue::Permitted)
            .with(RightType::Delete, RightValue::Permitted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_right_is_not_allowed() {
        let rights = Rights::new().with(RightType::Query, RightValue::Permitted);
        assert_eq!(rights.get(RightType::Create), None);
        assert!(!rights.allows(RightType::Create));
        assert!(rights.allows(RightType::Query));
    }

    #[test]
    fn rejected_right_is_not_allowed() {
        let rights = Rights::all_crud().with(RightType::Delete, RightValue::Rejected);
        assert_eq!(rights.get(RightType::Delete), Some(RightValue::Rejected));
        assert!(!rights.allows(RightType::Delete));
        assert!(rights.allows(RightType::Update));
    }

    #[test]
    fn rights_serialize_as_plain_map() {
        let rights = Rights::new().with(RightType::Create, RightValue::Rejected);
        let json = serde_json::to_string(&rights).unwrap();
        assert_eq!(json, r#"{"CREATE":"REJECTED"}"#);
        let parsed: Rights = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, rights);
    }
}
