use shared::domain::{PositionId, RegionId};
use thiserror::Error;

/// Why an intent dispatched nothing.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum IntentDeclined {
    #[error("timestamp is not finite")]
    NonFiniteTimestamp,
    #[error("no position id given")]
    MissingPosition,
    #[error("region width {width}ms is below the minimum")]
    BelowMinimumWidth { width: f64 },
    #[error("no region is selected")]
    NoRegionSelected,
    #[error("modifier combination does not apply")]
    ModifierNotApplicable,
    #[error("key {0:?} is not a navigation key")]
    UnknownKey(String),
    #[error("region {0} does not exist")]
    UnknownRegion(RegionId),
    #[error("region belongs to position {expected}, not {actual}")]
    PositionMismatch {
        expected: PositionId,
        actual: PositionId,
    },
    #[error("cannot merge region {0} into itself")]
    SameRegion(RegionId),
    #[error("no region is targeted for adding areas")]
    NoAddAreaTarget,
    #[error("no tap is active")]
    NoActiveTap,
    #[error("comparison mode is not active")]
    NotInComparisonMode,
    #[error("comparison mode is already active")]
    AlreadyInComparisonMode,
    #[error("no comparison slice is selected")]
    NoComparisonSlice,
    #[error("no positions are included in the comparison")]
    NoIncludedPositions,
    #[error("playback rate {0} is not a positive number")]
    InvalidPlaybackRate(f64),
}

/// Why a play command could not be built from the current transition.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AudioContextMissing {
    #[error("no position to play")]
    NoPosition,
    #[error("no tap timestamp to start playback from")]
    NoTimestamp,
    #[error("adjusted timestamp for position {position_id} is not finite")]
    NonFiniteAdjustedTimestamp { position_id: PositionId },
}
