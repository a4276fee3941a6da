use thiserror::Error;

use crate::format::Format;
use crate::tile::TileMode;

pub type Result<T> = std::result::Result<T, LayoutError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    /// No tile, alignment or aux rule exists for the requested combination.
    #[error("unsupported combination: {0}")]
    UnsupportedCombination(String),

    #[error("invalid resource descriptor: {0}")]
    InvalidDescriptor(String),

    #[error("format {format:?} has no layout for tile mode {tile_mode:?}")]
    UnsupportedTilingForFormat { format: Format, tile_mode: TileMode },

    #[error("{what} index {index} out of range (limit {limit})")]
    OffsetOutOfRange {
        what: &'static str,
        index: u32,
        limit: u32,
    },

    #[error("size overflow while computing {0}")]
    SizeOverflow(&'static str),

    #[error("invalid override: {0}")]
    InvalidOverride(String),
}

impl LayoutError {
    pub(crate) fn unsupported(msg: impl Into<String>) -> Self {
        Self::UnsupportedCombination(msg.into())
    }

    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidDescriptor(msg.into())
    }
}
