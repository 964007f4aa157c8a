//! Uniform JSON envelope shared by every response

use serde::Serialize;

/// `{ success, message, data }` body of every API response
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub message: String,
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Some(data),
        }
    }

    pub fn failure(message: impl Into<String>, data: Option<T>) -> Self {
        Self {
            success: false,
            message: message.into(),
            data,
        }
    }
}

impl ApiResponse<()> {
    /// Successful response with `data: null`
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: None,
        }
    }
}
