//! Engine error taxonomy.
//!
//! Structural violations (bounds, configuration, occupied cells) abort the operation and
//! surface to the caller. `AlreadyRemoved` is produced by strict board access and
//! downgraded to a `RemovalIgnored` notification by [`GridState`](crate::GridState).

use thiserror::Error;

use crate::types::Position;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GridError {
    #[error("position {position} is outside the {width}x{height} board")]
    OutOfBounds {
        position: Position,
        width: u16,
        height: u16,
    },

    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("no tile to remove at {0}")]
    AlreadyRemoved(Position),

    #[error("resolution batch closed without a matching open")]
    UnbalancedBatch,

    #[error("cell {0} is already occupied")]
    CellOccupied(Position),
}

impl GridError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        GridError::InvalidConfiguration(msg.into())
    }
}
