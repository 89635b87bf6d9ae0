#[derive(Debug, thiserror::Error)]
pub enum LinkError {
    #[error("a vehicle connection is already active")]
    AlreadyConnected,
    #[error("connection refused by remote endpoint")]
    Refused,
    #[error("connection reset by peer")]
    Reset,
    #[error("connection aborted")]
    Aborted,
    #[error("transport failure: {0}")]
    Transport(String),
}
