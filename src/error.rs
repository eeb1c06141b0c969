use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("feed error: {0}")]
    Feed(String),
    #[error("tracker command channel closed")]
    CommandSend,
    #[error("watch channel send failed")]
    WatchSend,
    #[error("state lock poisoned")]
    StateLock,
}
