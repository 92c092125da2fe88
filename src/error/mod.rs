use crate::exchange::ImportError;
use crate::host::HostError;
use crate::queue::QueueError;
use crate::storage::{StorageError, UserId};
use thiserror::Error;

pub type AppResult<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Host(#[from] HostError),
    #[error(transparent)]
    Import(#[from] ImportError),
    #[error(transparent)]
    Queue(#[from] QueueError),
    #[error("user {user_id} is not allowed to manage design tokens")]
    PermissionDenied { user_id: UserId },
}
