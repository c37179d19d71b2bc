use serde::{Deserialize, Serialize};
use std::fmt;

/// Length of a hyphenated UUID, the format of persisted service ids
const PERSISTED_ID_LEN: usize = 36;

/// Opaque identifier of a marketplace service
///
/// Any string is accepted so cached ids mirror exactly what the backend
/// returns. Only ids in the persisted-record format can be favorited.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ServiceId(String);

impl ServiceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True when the id refers to a persisted record rather than a
    /// placeholder (listing mocks use short numeric ids such as "1")
    pub fn is_recognized(&self) -> bool {
        self.0.len() == PERSISTED_ID_LEN && uuid::Uuid::try_parse(&self.0).is_ok()
    }
}

impl fmt::Display for ServiceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ServiceId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for ServiceId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Display data for a favorited service (the "my favorites" list)
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Service {
    pub id: ServiceId,
    pub title: String,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub category: Option<String>,
    pub delivery_days: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uuid_ids_are_recognized() {
        let id = ServiceId::from("3f2b8c1e-9a4d-4e6f-8b2a-1c3d5e7f9a0b");
        assert!(id.is_recognized());
        assert!(ServiceId::from("3F2B8C1E-9A4D-4E6F-8B2A-1C3D5E7F9A0B").is_recognized());
    }

    #[test]
    fn placeholder_ids_are_not_recognized() {
        for raw in ["", "1", "mock-service", "3f2b8c1e9a4d4e6f8b2a1c3d5e7f9a0b"] {
            assert!(!ServiceId::from(raw).is_recognized(), "{raw:?}");
        }
        // right length, wrong alphabet
        assert!(!ServiceId::from("zzzzzzzz-9a4d-4e6f-8b2a-1c3d5e7f9a0b").is_recognized());
    }

    #[test]
    fn service_row_tolerates_missing_optional_fields() {
        let json = r#"{"id":"3f2b8c1e-9a4d-4e6f-8b2a-1c3d5e7f9a0b","title":"Logo design"}"#;
        let service: Service = serde_json::from_str(json).unwrap();
        assert_eq!(service.title, "Logo design");
        assert_eq!(service.price, None);
    }
}
