//! Credential metadata document.
//!
//! The document shape is part of the external contract and must be produced
//! exactly: `{name, description, image, attributes: [{trait_type, value}]}`
//! with the image and token URIs using the `cid://` scheme.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::store::records::CredentialTemplate;

/// URI scheme prefix for content identifiers.
pub const CID_SCHEME: &str = "cid://";

/// Field whose value, when present, names the credential holder.
const HOLDER_NAME_FIELD: &str = "Full Name";

/// One metadata attribute; mirrors an entry of the issuance request's
/// dynamic data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialAttribute {
    pub trait_type: String,
    pub value: String,
}

/// The metadata document pinned next to the rendered artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialMetadata {
    pub name: String,
    pub description: Option<String>,
    pub image: String,
    pub attributes: Vec<CredentialAttribute>,
}

/// Build the metadata document for one issuance.
///
/// The credential name is `"<template name> for <holder>"`, where the holder
/// is the `Full Name` field value when supplied, else the recipient address.
pub fn build_metadata(
    template: &CredentialTemplate,
    recipient_address: &str,
    dynamic_data: &BTreeMap<String, String>,
    artifact_cid: &str,
) -> CredentialMetadata {
    let holder = dynamic_data
        .get(HOLDER_NAME_FIELD)
        .map(String::as_str)
        .filter(|v| !v.is_empty())
        .unwrap_or(recipient_address);

    CredentialMetadata {
        name: format!("{} for {}", template.name, holder),
        description: template.description.clone(),
        image: format!("{}{}", CID_SCHEME, artifact_cid),
        attributes: dynamic_data
            .iter()
            .map(|(key, value)| CredentialAttribute {
                trait_type: key.clone(),
                value: value.clone(),
            })
            .collect(),
    }
}

impl CredentialMetadata {
    /// Serialize for upload.
    pub fn to_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }
}
