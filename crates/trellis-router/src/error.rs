//! Pattern validation errors.

use thiserror::Error;

/// Reasons a route pattern is rejected at registration time.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatternError {
    /// A `*name` segment was followed by further segments.
    #[error("wildcard segment `{segment}` must be the last segment of `{pattern}`")]
    WildcardNotLast {
        /// The offending pattern.
        pattern: String,
        /// The wildcard segment.
        segment: String,
    },

    /// A `:` or `*` segment without a name.
    #[error("segment `{segment}` in `{pattern}` has no capture name")]
    EmptyName {
        /// The offending pattern.
        pattern: String,
        /// The nameless segment.
        segment: String,
    },

    /// The same capture name was used twice in one pattern.
    #[error("capture name `{name}` is used more than once in `{pattern}`")]
    DuplicateName {
        /// The offending pattern.
        pattern: String,
        /// The repeated name.
        name: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = PatternError::WildcardNotLast {
            pattern: "/a/*rest/b".to_string(),
            segment: "*rest".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "wildcard segment `*rest` must be the last segment of `/a/*rest/b`"
        );

        let err = PatternError::DuplicateName {
            pattern: "/:id/:id".to_string(),
            name: "id".to_string(),
        };
        assert!(err.to_string().contains("`id`"));
    }
}
