//! Error types for the armature factory.
//!
//! Only fatal failures are errors. Unknown datasets, definitions, slots or
//! displays are resolution misses and surface as `None`.

/// Fatal failures raised while loading data or building armatures.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum FactoryError {
    /// The generic document could not be interpreted as the expected kind.
    #[error("Malformed {kind} document: {reason}")]
    MalformedDocument { kind: &'static str, reason: String },

    /// No name override, embedded name, or load path was available.
    #[error("Skeleton document has no resolvable name")]
    UnnamedSkeleton,

    /// The atlas's backing image is not known to the resource provider.
    #[error("Source image '{image}' for dataset '{dataset}' could not be located")]
    MissingImage { dataset: String, image: String },

    /// A nested armature refers back to a definition already being built.
    #[error("Cyclic armature definition: {}", path.join(" -> "))]
    CyclicDefinition { path: Vec<String> },
}

impl FactoryError {
    pub(crate) fn malformed(kind: &'static str, reason: impl Into<String>) -> Self {
        Self::MalformedDocument {
            kind,
            reason: reason.into(),
        }
    }

    /// Whether the caller can fix the input and retry the same call.
    #[inline]
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::MissingImage { .. })
    }

    /// Get error category for logging
    #[inline]
    pub fn category(&self) -> &'static str {
        match self {
            Self::MalformedDocument { .. } | Self::UnnamedSkeleton => "data",
            Self::MissingImage { .. } => "resource",
            Self::CyclicDefinition { .. } => "build",
        }
    }
}

pub type Result<T> = std::result::Result<T, FactoryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cyclic_message_lists_path() {
        let err = FactoryError::CyclicDefinition {
            path: vec!["A/Root".into(), "A/Child".into(), "A/Root".into()],
        };
        assert_eq!(
            err.to_string(),
            "Cyclic armature definition: A/Root -> A/Child -> A/Root"
        );
        assert_eq!(err.category(), "build");
        assert!(!err.is_recoverable());
    }
}
