pub mod error;
pub mod logger;

// Re-export commonly used types
pub use error::ShoutError;
pub type Result<T> = std::result::Result<T, ShoutError>;
