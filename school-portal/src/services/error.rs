use school_core::error::AppError;
use thiserror::Error;

use crate::models::MalformedRecord;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Error, Debug)]
pub enum RosterError {
    /// The data source could not be read, after retries.
    #[error("lookup of '{sheet}' failed after {attempts} attempt(s): {source}")]
    Lookup {
        sheet: String,
        attempts: u32,
        source: BoxError,
    },

    #[error(transparent)]
    MalformedRecord(#[from] MalformedRecord),

    /// Write paths the spreadsheet roster does not implement.
    #[error("{0} is not supported by this roster")]
    NotSupported(&'static str),
}

impl RosterError {
    pub fn lookup(sheet: impl Into<String>, attempts: u32, source: impl Into<BoxError>) -> Self {
        RosterError::Lookup {
            sheet: sheet.into(),
            attempts,
            source: source.into(),
        }
    }
}

impl From<RosterError> for AppError {
    fn from(err: RosterError) -> Self {
        match err {
            err @ RosterError::Lookup { .. } => AppError::UpstreamUnavailable(anyhow::Error::new(err)),
            RosterError::MalformedRecord(e) => AppError::BadGateway(e.to_string()),
            RosterError::NotSupported(operation) => AppError::NotSupported(operation.to_string()),
        }
    }
}
