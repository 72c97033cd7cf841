//! Record types held in the local store.

use serde::{Deserialize, Serialize};

/// Placement of one dynamic text field on a template background.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DynamicField {
    /// Field name; unique within a template.
    pub name: String,
    /// Horizontal anchor in pixels.
    pub x: i32,
    /// Vertical anchor in pixels.
    pub y: i32,
}

/// A visual certificate template owned by an institution.
///
/// Immutable after creation: there is no update operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialTemplate {
    pub id: u64,
    pub institution_id: u64,
    pub name: String,
    pub description: Option<String>,
    /// Content identifier of the background image.
    pub background_cid: String,
    /// Ordered overlay fields; order is the compositing order.
    pub dynamic_fields: Vec<DynamicField>,
}

/// Confirmation state of an indexed issuance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssuanceStatus {
    Confirmed,
}

/// Mirror of one on-chain `CredentialIssued` event.
///
/// Written only by the indexer; the issuance pipeline never creates these.
/// At most one row exists per transaction hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuanceLog {
    /// Chain-assigned token identifier, decimal string.
    pub credential_id: String,
    /// Holder address, 0x-prefixed hex.
    pub recipient_address: String,
    /// Mint transaction hash; the de-duplication key.
    pub transaction_hash: String,
    pub status: IssuanceStatus,
    /// The chain event carries no template reference, so this stays `None`
    /// for indexed rows.
    pub template_id: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_serializes_lowercase() {
        let json = serde_json::to_string(&IssuanceStatus::Confirmed).unwrap();
        assert_eq!(json, r#""confirmed""#);
    }

    #[test]
    fn template_round_trips() {
        let template = CredentialTemplate {
            id: 1,
            institution_id: 7,
            name: "Course Completion".to_string(),
            description: None,
            background_cid: "Qbg".to_string(),
            dynamic_fields: vec![DynamicField {
                name: "Nama Lengkap".to_string(),
                x: 100,
                y: 200,
            }],
        };
        let json = serde_json::to_string(&template).unwrap();
        let back: CredentialTemplate = serde_json::from_str(&json).unwrap();
        assert_eq!(back, template);
    }
}
