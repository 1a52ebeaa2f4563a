use tracing::debug;

use super::{
    client::{DeliveryStreamClient, PutRecordBatch},
    SinkAdapter,
};
use crate::{
    error::{Error, Result},
    record::Batch,
};

/// Default number of records per `PutRecordBatch` call.
pub const DEFAULT_BULK_BATCH_SIZE: usize = 100;

/// Delivers batches to a Firehose style delivery stream. The stream is
/// expected to exist already.
pub struct BulkStreamAdapter<C> {
    client: C,
    stream_name: String,
}

impl<C: DeliveryStreamClient> BulkStreamAdapter<C> {
    pub fn new(client: C, stream_name: impl Into<String>) -> Self {
        Self {
            client,
            stream_name: stream_name.into(),
        }
    }

    pub fn stream_name(&self) -> &str {
        &self.stream_name
    }

    pub fn client(&self) -> &C {
        &self.client
    }
}

impl<C: DeliveryStreamClient> SinkAdapter for BulkStreamAdapter<C> {
    fn sink_name(&self) -> String {
        self.stream_name.clone()
    }

    fn deliver(&mut self, batch: Batch) -> Result<()> {
        let total = batch.len();
        let request = PutRecordBatch {
            stream_name: self.stream_name.clone(),
            records: batch
                .into_iter()
                .map(|record| record.into_message().into_bytes())
                .collect(),
        };

        let output = self
            .client
            .put_record_batch(request)
            .map_err(|source| Error::delivery(&self.stream_name, total, source))?;

        if output.failed_count > 0 {
            if let Some(entry) = output.responses.iter().find(|r| r.error_code.is_some()) {
                debug!(
                    stream = %self.stream_name,
                    error_code = entry.error_code.as_deref().unwrap_or_default(),
                    error_message = entry.error_message.as_deref().unwrap_or_default(),
                    "record rejected by delivery stream"
                );
            }
            return Err(Error::PartialDelivery {
                stream: self.stream_name.clone(),
                failed: output.failed_count,
                total,
            });
        }

        debug!(stream = %self.stream_name, records = total, "delivered record batch");
        Ok(())
    }
}
