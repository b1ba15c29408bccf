//! The result type shared by every service call, and its wire rendering.

use serde::ser::{Serialize, SerializeStruct, Serializer};

use super::ErrorInfo;

/// Outcome of a service call: the backend payload or a normalized error.
pub type ServiceResult<T> = Result<T, ErrorInfo>;

/// `{"success": true, "data": ...}` / `{"success": false, "error": {...}}`
#[derive(Debug, Clone, PartialEq)]
pub enum Envelope<T> {
    Success(T),
    Failure(ErrorInfo),
}

impl<T> Envelope<T> {
    pub fn is_success(&self) -> bool {
        matches!(self, Envelope::Success(_))
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            Envelope::Success(data) => Some(data),
            Envelope::Failure(_) => None,
        }
    }

    pub fn error(&self) -> Option<&ErrorInfo> {
        match self {
            Envelope::Success(_) => None,
            Envelope::Failure(error) => Some(error),
        }
    }

    pub fn into_result(self) -> ServiceResult<T> {
        match self {
            Envelope::Success(data) => Ok(data),
            Envelope::Failure(error) => Err(error),
        }
    }
}

impl<T> From<ServiceResult<T>> for Envelope<T> {
    fn from(result: ServiceResult<T>) -> Self {
        match result {
            Ok(data) => Envelope::Success(data),
            Err(error) => Envelope::Failure(error),
        }
    }
}

impl<T: Serialize> Serialize for Envelope<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Envelope", 2)?;
        match self {
            Envelope::Success(data) => {
                state.serialize_field("success", &true)?;
                state.serialize_field("data", data)?;
            }
            Envelope::Failure(error) => {
                state.serialize_field("success", &false)?;
                state.serialize_field("error", error)?;
            }
        }
        state.end()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_success_envelope_has_only_data() {
        let envelope: Envelope<_> = Ok::<_, ErrorInfo>(json!({"projects": []})).into();
        let value = serde_json::to_value(&envelope).expect("serialize");
        assert_eq!(value, json!({"success": true, "data": {"projects": []}}));
        assert!(value.get("error").is_none());
    }

    #[test]
    fn test_failure_envelope_has_only_error() {
        let envelope: Envelope<serde_json::Value> = Err(ErrorInfo::local("nope")).into();
        assert!(!envelope.is_success());
        assert!(envelope.data().is_none());

        let value = serde_json::to_value(&envelope).expect("serialize");
        assert_eq!(value["success"], json!(false));
        assert_eq!(value["error"]["message"], json!("nope"));
        assert!(value.get("data").is_none());
    }

    #[test]
    fn test_into_result_round_trip() {
        let envelope = Envelope::Success(3);
        assert_eq!(envelope.clone().into_result(), Ok(3));
        assert_eq!(envelope.data(), Some(&3));
        assert!(envelope.error().is_none());
    }
}
