use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MarshalError {
    #[error("failed to encode {what}: {reason}")]
    Encode { what: &'static str, reason: String },

    #[error("failed to decode {what}: {reason}")]
    Decode { what: &'static str, reason: String },
}

/// Converts wire records to and from request/response bodies.
///
/// Implementations must be symmetric: decoding what was encoded yields
/// an equal record.
pub trait Marshaller {
    /// Media type sent as both `Content-Type` and `Accept`.
    fn media_type(&self) -> &str;

    fn serialize<T: Serialize>(&self, value: &T) -> Result<String, MarshalError>;

    fn deserialize<T: DeserializeOwned>(&self, body: &str) -> Result<T, MarshalError>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct JsonMarshaller;

impl Marshaller for JsonMarshaller {
    fn media_type(&self) -> &str {
        "application/json"
    }

    fn serialize<T: Serialize>(&self, value: &T) -> Result<String, MarshalError> {
        serde_json::to_string(value).map_err(|e| MarshalError::Encode {
            what: std::any::type_name::<T>(),
            reason: e.to_string(),
        })
    }

    fn deserialize<T: DeserializeOwned>(&self, body: &str) -> Result<T, MarshalError> {
        serde_json::from_str(body).map_err(|e| MarshalError::Decode {
            what: std::any::type_name::<T>(),
            reason: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::functional::types::{DeleteId, DeleteRequest};

    #[test]
    fn delete_request_wire_shape() {
        let request = DeleteRequest {
            deletes: vec![DeleteId { id: "a".into() }, DeleteId { id: "b".into() }],
        };
        let body = JsonMarshaller.serialize(&request).unwrap();
        assert_eq!(body, r#"{"deletes":[{"id":"a"},{"id":"b"}]}"#);
    }

    #[test]
    fn decode_failure_names_target_type() {
        let err = JsonMarshaller
            .deserialize::<DeleteRequest>("<xml/>")
            .unwrap_err();
        assert!(matches!(err, MarshalError::Decode { .. }));
        assert!(err.to_string().contains("DeleteRequest"));
    }
}
