pub mod bulk;
pub mod cli;
pub mod config;
pub mod error;
pub mod exchange;
pub mod host;
pub mod kit;
pub mod logging;
pub mod manager;
pub mod merge;
pub mod normalize;
pub mod notification;
pub mod queue;
pub mod sanitize;
pub mod section;
pub mod storage;
pub mod tokens;
pub use error::{AppError, AppResult};
pub use manager::{Caller, TokenManager};
