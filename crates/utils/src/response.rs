use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Envelope shared by every JSON endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
        }
    }

    pub fn error(message: &str) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_sets_data_and_no_message() {
        let resp = ApiResponse::success(7);
        assert!(resp.success);
        assert_eq!(resp.data, Some(7));
        assert!(resp.message.is_none());
    }

    #[test]
    fn error_sets_message_and_no_data() {
        let resp = ApiResponse::<()>::error("nope");
        assert!(!resp.success);
        assert!(resp.data.is_none());
        assert_eq!(resp.message.as_deref(), Some("nope"));
    }
}
