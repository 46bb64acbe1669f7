/// Convenience result type used across slicecast.
pub type SlicecastResult<T> = Result<T, SlicecastError>;

/// Top-level error taxonomy used by renderer APIs.
#[derive(thiserror::Error, Debug)]
pub enum SlicecastError {
    /// Invalid configuration or caller-provided arguments.
    #[error("validation error: {0}")]
    Validation(String),

    /// A per-frame resource (scratch arena, worker pool) could not be satisfied.
    #[error("resource error: {0}")]
    Resource(String),

    /// A pipeline stage raised a fatal condition; the frame is aborted.
    #[error("stage error: {0}")]
    Stage(String),

    /// Errors when serializing or deserializing configuration.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SlicecastError {
    /// Build a [`SlicecastError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`SlicecastError::Resource`] value.
    pub fn resource(msg: impl Into<String>) -> Self {
        Self::Resource(msg.into())
    }

    /// Build a [`SlicecastError::Stage`] value.
    pub fn stage(msg: impl Into<String>) -> Self {
        Self::Stage(msg.into())
    }

    /// Build a [`SlicecastError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors_map_to_variants() {
        assert!(matches!(
            SlicecastError::validation("x"),
            SlicecastError::Validation(_)
        ));
        assert!(matches!(
            SlicecastError::resource("x"),
            SlicecastError::Resource(_)
        ));
        assert!(matches!(SlicecastError::stage("x"), SlicecastError::Stage(_)));
    }

    #[test]
    fn display_includes_category_prefix() {
        let e = SlicecastError::resource("frame arena exhausted");
        assert_eq!(e.to_string(), "resource error: frame arena exhausted");
    }
}
