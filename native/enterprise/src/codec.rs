//! JSON interchange for records handed to string-typed callbacks.
//!
//! Lists travel as a JSON array of objects, one object per record. An empty
//! text decodes to an empty list.

use crate::{
    error::Result,
    models::{MarkerInfo, WifiDisplayModel},
};

pub fn wifi_display_models_to_json(models: &[WifiDisplayModel]) -> Result<String> {
    Ok(serde_json::to_string(models)?)
}

pub fn wifi_display_models_from_json(json: &str) -> Result<Vec<WifiDisplayModel>> {
    if json.trim().is_empty() {
        return Ok(Vec::new());
    }
    Ok(serde_json::from_str(json)?)
}

pub fn wifi_display_model_to_json(model: &WifiDisplayModel) -> Result<String> {
    Ok(serde_json::to_string(model)?)
}

/// Parses a single model, as sent by callers of `connect_wifi_display`.
pub fn wifi_display_model_from_json(json: &str) -> Result<WifiDisplayModel> {
    Ok(serde_json::from_str(json)?)
}

pub fn marker_infos_to_json(markers: &[MarkerInfo]) -> Result<String> {
    Ok(serde_json::to_string(markers)?)
}

pub fn marker_infos_from_json(json: &str) -> Result<Vec<MarkerInfo>> {
    if json.trim().is_empty() {
        return Ok(Vec::new());
    }
    Ok(serde_json::from_str(json)?)
}
