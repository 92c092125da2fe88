use super::event::QueueEvent;
use super::model::QueueState;
use crate::storage::StorageError;
use thiserror::Error;

pub type QueueResult<T> = std::result::Result<T, QueueError>;

#[derive(Debug, Error)]
pub enum QueueError {
    #[error("invalid queue transition: from {from:?} using event {event:?}")]
    InvalidTransition { from: QueueState, event: QueueEvent },
    #[error(transparent)]
    Storage(#[from] StorageError),
}
