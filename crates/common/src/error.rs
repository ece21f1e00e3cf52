/// Shout error types
#[derive(Debug, thiserror::Error)]
pub enum ShoutError {
    /// Network retrieval of a string-referenced model failed
    #[error("Fetch error: {0}")]
    Fetch(String),

    /// Reading bytes from a model file handle failed
    #[error("File read error: {0}")]
    FileRead(String),

    /// Native module reported a failure
    #[error("Module error: {0}")]
    Module(String),

    /// Lifecycle misuse or failed bootstrap
    #[error("Initialization error: {0}")]
    Initialization(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// General error (anyhow integration)
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ShoutError {
    /// Create fetch error
    pub fn fetch<S: Into<String>>(msg: S) -> Self {
        Self::Fetch(msg.into())
    }

    /// Create file read error
    pub fn file_read<S: Into<String>>(msg: S) -> Self {
        Self::FileRead(msg.into())
    }

    /// Create module error
    pub fn module<S: Into<String>>(msg: S) -> Self {
        Self::Module(msg.into())
    }

    /// Create initialization error
    pub fn initialization<S: Into<String>>(msg: S) -> Self {
        Self::Initialization(msg.into())
    }

    /// Create config error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ShoutError::fetch("status 404");
        assert_eq!(err.to_string(), "Fetch error: status 404");

        let err = ShoutError::initialization("instance is destroyed");
        assert_eq!(
            err.to_string(),
            "Initialization error: instance is destroyed"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: ShoutError = io.into();
        assert!(matches!(err, ShoutError::Io(_)));
    }
}
