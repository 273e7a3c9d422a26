//! Structured AI summary content.

use serde::{Deserialize, Serialize};

/// One compliance gap and how to close it.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SummaryIssue {
    #[serde(default)]
    pub area: String,
    #[serde(default)]
    pub problem: String,
    #[serde(default)]
    pub improvement: String,
    #[serde(default, rename = "where")]
    pub location: String,
    #[serde(default)]
    pub how: String,
}

/// Summary stored as JSON text in a report's `aiSummary` field.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AiSummary {
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub issues: Vec<SummaryIssue>,
    #[serde(default)]
    pub next_steps: Vec<String>,
}

impl AiSummary {
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn is_empty(&self) -> bool {
        self.strengths.is_empty() && self.issues.is_empty() && self.next_steps.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_service_shape() {
        let text = r#"{
            "strengths": ["Exits are marked"],
            "issues": [{"area": "Storage", "problem": "Blocked extinguisher",
                        "improvement": "Clear access", "where": "Warehouse B", "how": "Move pallets"}],
            "next_steps": ["Schedule re-inspection"]
        }"#;
        let summary = AiSummary::from_json(text).unwrap();
        assert_eq!(summary.issues[0].location, "Warehouse B");
        assert_eq!(summary.next_steps, vec!["Schedule re-inspection"]);
    }

    #[test]
    fn missing_sections_default_to_empty() {
        let summary = AiSummary::from_json(r#"{"strengths": []}"#).unwrap();
        assert!(summary.is_empty());
    }

    #[test]
    fn serializes_where_key() {
        let summary = AiSummary {
            issues: vec![SummaryIssue {
                location: "Dock".to_string(),
                ..Default::default()
            }],
            ..Default::default()
        };
        assert!(summary.to_json().unwrap().contains("\"where\":\"Dock\""));
    }
}
