//! Target sizing precedence.

/// Width applied when the caller supplies neither dimension.
pub const DEFAULT_WIDTH: u32 = 1200;
/// Height applied when the caller supplies neither dimension.
pub const DEFAULT_HEIGHT: u32 = 630;

/// Resolved sizing instruction handed to the renderer.
///
/// Deliberately a closed set of shapes rather than two nullable fields: the
/// renderer infers aspect ratio from the missing axis, so which shape applies
/// must be decided in exactly one place.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DimensionDirective {
    Both { width: u32, height: u32 },
    WidthOnly { width: u32 },
    HeightOnly { height: u32 },
    Defaulted,
}

impl DimensionDirective {
    pub fn width(&self) -> Option<u32> {
        match self {
            Self::Both { width, .. } | Self::WidthOnly { width } => Some(*width),
            Self::HeightOnly { .. } => None,
            Self::Defaulted => Some(DEFAULT_WIDTH),
        }
    }

    pub fn height(&self) -> Option<u32> {
        match self {
            Self::Both { height, .. } | Self::HeightOnly { height } => Some(*height),
            Self::WidthOnly { .. } => None,
            Self::Defaulted => Some(DEFAULT_HEIGHT),
        }
    }
}

/// Apply the fixed precedence: both, width only, height only, defaults.
///
/// No range validation happens here; out-of-range values are forwarded to the
/// renderer, which owns that check.
pub fn resolve_dimensions(width: Option<u32>, height: Option<u32>) -> DimensionDirective {
    match (width, height) {
        (Some(width), Some(height)) => DimensionDirective::Both { width, height },
        (Some(width), None) => DimensionDirective::WidthOnly { width },
        (None, Some(height)) => DimensionDirective::HeightOnly { height },
        (None, None) => DimensionDirective::Defaulted,
    }
}
