use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelInfo {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// RFC 3339 timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub r#type: Option<String>,
}

impl ModelInfo {
    /// Unix seconds of `created_at`, or 0 when missing or unparsable.
    pub fn created_unix(&self) -> i64 {
        self.created_at
            .as_deref()
            .and_then(|value| OffsetDateTime::parse(value, &Rfc3339).ok())
            .map(|at| at.unix_timestamp())
            .unwrap_or(0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListModelsResponse {
    pub data: Vec<ModelInfo>,
    #[serde(default)]
    pub has_more: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn created_at_parses_rfc3339() {
        let info = ModelInfo {
            id: "claude-3-haiku-20240307".to_string(),
            display_name: None,
            created_at: Some("2024-03-07T00:00:00Z".to_string()),
            r#type: Some("model".to_string()),
        };
        assert_eq!(info.created_unix(), 1_709_769_600);

        let broken = ModelInfo {
            created_at: Some("yesterday".to_string()),
            ..info
        };
        assert_eq!(broken.created_unix(), 0);
    }
}
