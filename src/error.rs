use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// The stream is missing and the handler was not allowed to create it.
    #[error("Log stream {stream} not found in log group {group}")]
    StreamNotFound { group: String, stream: String },

    #[error("Failed provisioning log stream {group}:{stream}")]
    Provisioning {
        group: String,
        stream: String,
        #[source]
        source: eyre::Report,
    },

    #[error("Failed delivering {records} records to {sink}")]
    Delivery {
        sink: String,
        records: usize,
        #[source]
        source: eyre::Report,
    },

    #[error("Delivery stream {stream} rejected {failed} of {total} records")]
    PartialDelivery {
        stream: String,
        failed: usize,
        total: usize,
    },

    #[error("Batch size must be at least 1")]
    InvalidBatchSize,

    #[error("Handler for {sink} is closed")]
    Closed { sink: String },
}

impl Error {
    pub fn is_delivery(&self) -> bool {
        matches!(self, Error::Delivery { .. } | Error::PartialDelivery { .. })
    }

    pub fn is_provisioning(&self) -> bool {
        matches!(
            self,
            Error::StreamNotFound { .. } | Error::Provisioning { .. }
        )
    }

    pub(crate) fn delivery(sink: impl Into<String>, records: usize, source: eyre::Report) -> Self {
        Error::Delivery {
            sink: sink.into(),
            records,
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
