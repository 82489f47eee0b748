/// Convenience result type used across ambientfx.
pub type AmbientResult<T> = Result<T, AmbientError>;

/// Error taxonomy for the fallible edges of the crate.
///
/// Engine operations (`start`, `stop`, event and timer callbacks) never surface these; they degrade
/// to a no-op instead. Errors only come out of configuration decoding, SVG parsing and
/// rasterization.
#[derive(thiserror::Error, Debug)]
pub enum AmbientError {
    /// Invalid user-provided data.
    #[error("validation error: {0}")]
    Validation(String),

    /// Markup that could not be parsed into a render tree.
    #[error("markup error: {0}")]
    Markup(String),

    /// Errors while rasterizing a snapshot.
    #[error("render error: {0}")]
    Render(String),

    /// Errors when serializing or deserializing configuration.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl AmbientError {
    /// Build an [`AmbientError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build an [`AmbientError::Markup`] value.
    pub fn markup(msg: impl Into<String>) -> Self {
        Self::Markup(msg.into())
    }

    /// Build an [`AmbientError::Render`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build an [`AmbientError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

impl From<serde_json::Error> for AmbientError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serde(err.to_string())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
