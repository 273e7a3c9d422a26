//! Immutable description of what is being assessed.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::ValidationError;

/// Where an assessment takes place and what it is called.
///
/// Set once when a session starts and never changed afterwards. Serialized
/// with the persisted field names so it can be flattened into stored
/// documents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionMetadata {
    pub domain_id: String,
    pub domain_name: String,
    pub sub_domain_id: String,
    pub sub_domain_name: String,
    pub facility_id: String,
    pub facility_name: String,
    pub assessment_name: String,
    #[serde(default)]
    pub is_custom_assessment: bool,
}

impl SessionMetadata {
    /// Checks the fields a session cannot work without.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.sub_domain_id.trim().is_empty() {
            return Err(ValidationError::empty_field("sub_domain_id"));
        }
        if self.assessment_name.trim().is_empty() {
            return Err(ValidationError::empty_field("assessment_name"));
        }
        Ok(())
    }

    /// Identity used to match a saved session with a new one.
    pub fn key(&self) -> SessionKey {
        if self.is_custom_assessment {
            SessionKey::Custom {
                sub_domain_id: self.sub_domain_id.clone(),
                assessment_name: self.assessment_name.clone(),
            }
        } else {
            SessionKey::Standard {
                sub_domain_id: self.sub_domain_id.clone(),
                facility_id: self.facility_id.clone(),
            }
        }
    }
}

/// The per-user uniqueness tuple of an in-progress assessment.
///
/// Standard assessments are unique per `(sub-domain, facility)`; custom ones
/// per `(sub-domain, assessment name)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SessionKey {
    Standard {
        sub_domain_id: String,
        facility_id: String,
    },
    Custom {
        sub_domain_id: String,
        assessment_name: String,
    },
}

impl SessionKey {
    pub fn sub_domain_id(&self) -> &str {
        match self {
            SessionKey::Standard { sub_domain_id, .. } | SessionKey::Custom { sub_domain_id, .. } => {
                sub_domain_id
            }
        }
    }

    pub fn is_custom(&self) -> bool {
        matches!(self, SessionKey::Custom { .. })
    }
}
