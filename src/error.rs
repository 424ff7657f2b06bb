use thiserror::Error;

/// Failures inside the bridge. None of these cross the document-engine
/// callback boundary; callbacks turn them into sentinels and log them.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BridgeError {
    #[error("resource not found: {0}")]
    ResourceNotFound(String),

    #[error("invalid {kind} handle {handle}")]
    InvalidHandle { kind: &'static str, handle: u64 },

    #[error("custom element tag `{0}` is already registered")]
    DuplicateRegistration(String),

    #[error("unsupported operation: {0}")]
    UnsupportedOperation(&'static str),

    #[error("index {index} out of range for {vertices} vertices")]
    InvalidGeometry { index: u32, vertices: usize },

    #[error("pixel buffer of {actual} bytes does not match {width}x{height} RGBA8 ({expected} bytes)")]
    InvalidPixelBuffer {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },
}
