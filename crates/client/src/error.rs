/// Errors from the catalog REST layer.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The HTTP request itself failed (network, DNS, TLS, body decoding).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The catalog returned a non-2xx status.
    #[error("Catalog API error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Message suitable for showing to the user.
        message: String,
    },
}

impl ClientError {
    /// Text for an error toast.
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Api { message, .. } => message.clone(),
            ClientError::Request(e) if e.is_decode() => {
                format!("The catalog service sent an unreadable response: {e}")
            }
            ClientError::Request(e) => format!("Could not reach the catalog service: {e}"),
        }
    }

    /// HTTP status of an API error.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            ClientError::Request(e) => e.status().map(|s| s.as_u16()),
        }
    }
}
