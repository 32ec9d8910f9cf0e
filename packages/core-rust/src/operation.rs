//! Operation tags selected by a payload's `operation` field.

use std::fmt;

/// The processing routine a delivery is routed to.
///
/// Unknown or missing operation names are not an error: they route to
/// [`OperationKind::Generic`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    /// Resize an image to explicit dimensions.
    Resize,
    /// Produce a thumbnail for an image.
    Thumbnail,
    /// Always fails. Exercises the dispatcher's redelivery path.
    Fail,
    /// Catch-all for any other (or absent) operation name.
    Generic,
}

impl OperationKind {
    /// All variants, in dispatch-table order.
    pub const ALL: [OperationKind; 4] = [
        OperationKind::Resize,
        OperationKind::Thumbnail,
        OperationKind::Fail,
        OperationKind::Generic,
    ];

    /// Maps an operation name to its tag. Matching is exact and case-sensitive.
    #[must_use]
    pub fn from_name(name: Option<&str>) -> Self {
        match name {
            Some("resize") => Self::Resize,
            Some("thumbnail") => Self::Thumbnail,
            Some("fail") => Self::Fail,
            _ => Self::Generic,
        }
    }

    /// Returns the wire name of this operation (`"generic"` for the fallback).
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Resize => "resize",
            Self::Thumbnail => "thumbnail",
            Self::Fail => "fail",
            Self::Generic => "generic",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
