mod bulk;
mod client;
mod ordered;

pub use bulk::{BulkStreamAdapter, DEFAULT_BULK_BATCH_SIZE};
pub use client::{
    DeliveryStreamClient, InputLogEvent, LogGroupSummary, LogStreamClient, LogStreamSummary,
    PutLogEvents, PutLogEventsOutput, PutRecordBatch, PutRecordBatchOutput, RecordResult,
};
pub use ordered::{OrderedStreamAdapter, StreamIdentity, DEFAULT_ORDERED_BATCH_SIZE};

use crate::{error::Result, record::Batch};

/// Translates a batch into a sink specific request and interprets the answer.
///
/// A [`crate::BatchBuffer`] owns exactly one adapter and never calls
/// [`SinkAdapter::deliver`] while another delivery is running.
pub trait SinkAdapter {
    /// Human readable name of the destination, used in errors and logs.
    fn sink_name(&self) -> String;

    fn deliver(&mut self, batch: Batch) -> Result<()>;

    /// Called once when the owning buffer is closed.
    fn teardown(&mut self) {}
}

impl<A: SinkAdapter + ?Sized> SinkAdapter for Box<A> {
    fn sink_name(&self) -> String {
        (**self).sink_name()
    }

    fn deliver(&mut self, batch: Batch) -> Result<()> {
        (**self).deliver(batch)
    }

    fn teardown(&mut self) {
        (**self).teardown()
    }
}
