use thiserror::Error;

use crate::oracle::OracleError;

#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("transport failure: {0}")]
    Transport(#[source] std::io::Error),

    #[error("simulation failure: {0}")]
    Oracle(#[from] OracleError),

    #[error("failed to encode message for vehicle {vehicle}: {source}")]
    Encode {
        vehicle: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("the bridge is not connected to a visualisation")]
    NotConnected,

    #[error("the bridge is already connected")]
    AlreadyConnected,

    #[error("the bridge has been stopped")]
    Stopped,
}

pub type BridgeResult<T> = Result<T, BridgeError>;
