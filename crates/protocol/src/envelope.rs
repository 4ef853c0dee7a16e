use serde::{Deserialize, Serialize};

/// Response envelope for every endpoint.
///
/// `msg` and `data` are omitted from the JSON when absent, matching what the
/// browser client already parses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct ApiResponse<T> {
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub msg: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    /// Successful response carrying only a message.
    pub fn success(msg: impl Into<String>) -> Self {
        Self {
            ok: true,
            msg: Some(msg.into()),
            data: None,
        }
    }

    /// Successful response carrying a payload.
    pub fn with_data(data: T) -> Self {
        Self {
            ok: true,
            msg: None,
            data: Some(data),
        }
    }

    /// Failed response with a human-readable reason.
    pub fn failure(msg: impl Into<String>) -> Self {
        Self {
            ok: false,
            msg: Some(msg.into()),
            data: None,
        }
    }
}
