//! Engine error type.
//!
//! Every fallible engine operation returns [`EngineResult`]. None of these
//! errors halt the frame loop: callers log them and keep ticking.

pub type EngineResult<T> = Result<T, EngineError>;

#[derive(thiserror::Error, Debug)]
pub enum EngineError {
    /// The scene manifest could not be fetched or parsed.
    #[error("manifest load failed: {0}")]
    ManifestLoad(String),

    /// No implementation is registered under this type name and none could be loaded.
    #[error("object type '{0}' is not registered")]
    Unregistered(String),

    /// A type definition exists but could not be loaded.
    #[error("failed to load object type '{name}': {reason}")]
    TypeLoad { name: String, reason: String },

    /// Metadata for an object did not validate against its kind.
    #[error("invalid metadata for '{name}': {reason}")]
    InvalidMetadata { name: String, reason: String },

    #[error("animation '{0}' not found")]
    AnimationNotFound(String),

    #[error("config error: {0}")]
    Config(String),

    #[cfg(feature = "lua")]
    #[error("script error: {0}")]
    Script(#[from] mlua::Error),
}

impl EngineError {
    pub fn manifest(msg: impl Into<String>) -> Self {
        Self::ManifestLoad(msg.into())
    }

    pub fn type_load(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::TypeLoad {
            name: name.into(),
            reason: reason.into(),
        }
    }

    pub fn invalid(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidMetadata {
            name: name.into(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_the_offending_item() {
        assert_eq!(
            EngineError::Unregistered("Hero".into()).to_string(),
            "object type 'Hero' is not registered"
        );
        assert!(
            EngineError::type_load("Hero", "no such file")
                .to_string()
                .contains("no such file")
        );
        assert!(
            EngineError::invalid("Sprite", "cols must be >= 1")
                .to_string()
                .starts_with("invalid metadata for 'Sprite'")
        );
    }
}
