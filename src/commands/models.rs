use serde::Serialize;

use crate::types::Identity;

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct IdentitySummary {
    pub key: i64,
    pub name: Option<String>,
    pub has_face: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
}

impl From<&Identity> for IdentitySummary {
    fn from(identity: &Identity) -> Self {
        Self {
            key: identity.key,
            name: identity.name.clone(),
            has_face: identity.has_face(),
            width: identity.image.as_ref().map(|img| img.width()),
            height: identity.image.as_ref().map(|img| img.height()),
        }
    }
}
