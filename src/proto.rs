use std::{num::ParseFloatError, time::Duration};

pub mod codec;
pub mod command;

#[cfg(test)]
pub mod fake;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProtoError {
    #[error("I/O error: {:?}", _0)]
    Io(#[from] std::io::Error),

    #[error("Serial I/O error: {:?}", _0)]
    Serial(#[from] tokio_serial::Error),

    #[error("Unable to open resource {resource}: {reason}")]
    Connection { resource: String, reason: String },
    #[error("No response within {} ms", .0.as_millis())]
    Timeout(Duration),
    #[error("Connection was closed")]
    Abort,
    #[error("Session is already closed")]
    Closed,

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error("Unable to parse response {response:?} as a number")]
    Parse {
        response: String,
        #[source]
        source: ParseFloatError,
    },
}

impl ProtoError {
    /// True for every failure of the transport itself, as opposed to
    /// rejected input or an unparseable reply.
    pub fn is_connection_error(&self) -> bool {
        matches!(
            self,
            Self::Io(_)
                | Self::Serial(_)
                | Self::Connection { .. }
                | Self::Timeout(_)
                | Self::Abort
                | Self::Closed
        )
    }

    pub(crate) fn connection(resource: impl Into<String>, reason: impl ToString) -> Self {
        Self::Connection {
            resource: resource.into(),
            reason: reason.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ProtoError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        assert!(ProtoError::Abort.is_connection_error());
        assert!(ProtoError::Timeout(Duration::from_secs(5)).is_connection_error());
        assert!(ProtoError::connection("USB0::1::INSTR", "no such device").is_connection_error());
        assert!(!ProtoError::InvalidArgument("kW".into()).is_connection_error());

        let source = "abc".parse::<f64>().unwrap_err();
        let err = ProtoError::Parse {
            response: "abc".into(),
            source,
        };
        assert!(!err.is_connection_error());
        assert_eq!(err.to_string(), "Unable to parse response \"abc\" as a number");
    }

    #[test]
    fn test_timeout_message() {
        assert_eq!(
            ProtoError::Timeout(Duration::from_millis(5000)).to_string(),
            "No response within 5000 ms"
        );
    }
}
