use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// JSON envelope shared by the REST handlers.
///
/// Successful writes without a payload serialize as `{ "success": true }`,
/// failures as `{ "success": false, "error": "..." }`.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    /// Success without a payload.
    pub fn ok() -> Self {
        Self {
            success: true,
            data: None,
            error: None,
        }
    }

    pub fn error(message: &str) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.to_string()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.success
    }
}
