use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Process not found: {0}")]
    ProcessNotFound(String),

    #[error("Access denied to process: {0}")]
    AccessDenied(String),

    #[error("Failed to read process memory at address {address:#x}: {message}")]
    MemoryReadFailed { address: u64, message: String },

    #[error("Failed to write process memory at address {address:#x}: {message}")]
    MemoryWriteFailed { address: u64, message: String },

    #[error("Request for {document} failed: {message}")]
    Http { document: String, message: String },

    #[error("{document} request failed (status: {status})")]
    HttpStatus { document: String, status: u16 },

    #[error("Feature could not start: {0}")]
    NotStartable(String),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML decode error: {0}")]
    TomlDecode(#[from] toml::de::Error),

    #[error("TOML encode error: {0}")]
    TomlEncode(#[from] toml::ser::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Memory I/O errors a polling loop retries on its next tick
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Error::ProcessNotFound(_)
                | Error::AccessDenied(_)
                | Error::MemoryReadFailed { .. }
                | Error::MemoryWriteFailed { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_is_transient() {
        let err = Error::MemoryWriteFailed {
            address: 0x1000,
            message: "partial copy".to_string(),
        };
        assert!(err.is_transient());
        assert!(Error::ProcessNotFound("cs2.exe".to_string()).is_transient());
        assert!(!Error::NotStartable("no offsets".to_string()).is_transient());
    }

    #[test]
    fn test_http_status_message_names_document() {
        let err = Error::HttpStatus {
            document: "buttons.json".to_string(),
            status: 404,
        };
        assert_eq!(err.to_string(), "buttons.json request failed (status: 404)");
    }
}
