//! Error kinds for dot2bgraph operations

use strum_macros::{Display, IntoStaticStr};

/// The kind of error that occurred.
///
/// This enum categorizes errors to help callers write clear error handling
/// logic. The layout core itself only ever produces `MalformedInput` and
/// `InvariantViolation`; the DOT parser and CLI add their own kinds on top
/// of the same type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, IntoStaticStr, Display)]
#[non_exhaustive]
pub enum Kind {
    // =========================================================================
    // Layout core errors
    // =========================================================================
    /// The input graph violates a collaborator contract: unknown edge
    /// endpoint, duplicate node name within a region, or similar.
    MalformedInput,

    /// An internal invariant the layout core relies on did not hold.
    InvariantViolation,

    // =========================================================================
    // DOT parsing errors
    // =========================================================================
    /// The DOT source could not be parsed.
    DotSyntax,

    // =========================================================================
    // CLI / collaborator-layer errors
    // =========================================================================
    /// Reading or writing a file failed.
    Io,

    /// Serializing the layout output failed.
    SerializationFailed,
}

impl Kind {
    /// Returns the error kind as a static string.
    pub fn as_str(&self) -> &'static str {
        (*self).into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_display_matches_variant_name() {
        assert_eq!(Kind::MalformedInput.to_string(), "MalformedInput");
        assert_eq!(Kind::InvariantViolation.to_string(), "InvariantViolation");
    }

    #[test]
    fn as_str_is_static() {
        assert_eq!(Kind::DotSyntax.as_str(), "DotSyntax");
    }
}
