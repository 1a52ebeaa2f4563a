//! Narrow views of the remote sinks. The AWS backed implementations live in
//! [`crate::aws`]; tests substitute in-memory doubles.

use std::{rc::Rc, sync::Arc};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogGroupSummary {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogStreamSummary {
    pub name: String,
    pub upload_sequence_token: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputLogEvent {
    pub timestamp: i64,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PutLogEvents {
    pub group_name: String,
    pub stream_name: String,
    pub events: Vec<InputLogEvent>,
    /// Left out on the very first delivery to a fresh stream.
    pub sequence_token: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PutLogEventsOutput {
    pub next_sequence_token: Option<String>,
}

/// Ordered, sequence token protected log streams (CloudWatch Logs).
pub trait LogStreamClient {
    fn describe_log_groups(&self, name_prefix: &str) -> eyre::Result<Vec<LogGroupSummary>>;

    fn create_log_group(&self, name: &str) -> eyre::Result<()>;

    fn describe_log_streams(
        &self,
        group_name: &str,
        name_prefix: &str,
    ) -> eyre::Result<Vec<LogStreamSummary>>;

    fn create_log_stream(&self, group_name: &str, name: &str) -> eyre::Result<()>;

    fn put_log_events(&self, request: PutLogEvents) -> eyre::Result<PutLogEventsOutput>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PutRecordBatch {
    pub stream_name: String,
    /// Opaque payloads, one per record.
    pub records: Vec<Vec<u8>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordResult {
    pub record_id: Option<String>,
    pub error_code: Option<String>,
    pub error_message: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PutRecordBatchOutput {
    pub failed_count: usize,
    pub responses: Vec<RecordResult>,
}

/// Order insensitive bulk delivery streams (Kinesis Firehose).
pub trait DeliveryStreamClient {
    fn put_record_batch(&self, request: PutRecordBatch) -> eyre::Result<PutRecordBatchOutput>;
}

macro_rules! forward_log_stream_client {
    ($($ptr:ident),*) => {$(
        impl<C: LogStreamClient + ?Sized> LogStreamClient for $ptr<C> {
            fn describe_log_groups(&self, name_prefix: &str) -> eyre::Result<Vec<LogGroupSummary>> {
                (**self).describe_log_groups(name_prefix)
            }

            fn create_log_group(&self, name: &str) -> eyre::Result<()> {
                (**self).create_log_group(name)
            }

            fn describe_log_streams(
                &self,
                group_name: &str,
                name_prefix: &str,
            ) -> eyre::Result<Vec<LogStreamSummary>> {
                (**self).describe_log_streams(group_name, name_prefix)
            }

            fn create_log_stream(&self, group_name: &str, name: &str) -> eyre::Result<()> {
                (**self).create_log_stream(group_name, name)
            }

            fn put_log_events(&self, request: PutLogEvents) -> eyre::Result<PutLogEventsOutput> {
                (**self).put_log_events(request)
            }
        }

        impl<C: DeliveryStreamClient + ?Sized> DeliveryStreamClient for $ptr<C> {
            fn put_record_batch(
                &self,
                request: PutRecordBatch,
            ) -> eyre::Result<PutRecordBatchOutput> {
                (**self).put_record_batch(request)
            }
        }
    )*};
}

forward_log_stream_client!(Box, Rc, Arc);
