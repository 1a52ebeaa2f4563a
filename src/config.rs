use crate::{
    buffer::{BatchBuffer, BatchPolicy},
    error::Result,
    sink::{
        BulkStreamAdapter, DeliveryStreamClient, LogStreamClient, OrderedStreamAdapter,
        StreamIdentity, DEFAULT_BULK_BATCH_SIZE, DEFAULT_ORDERED_BATCH_SIZE,
    },
};

pub type OrderedStreamHandler<C> = BatchBuffer<OrderedStreamAdapter<C>>;
pub type BulkStreamHandler<C> = BatchBuffer<BulkStreamAdapter<C>>;

/// Configures a handler shipping to a CloudWatch Logs stream.
#[derive(Debug, Clone)]
pub struct OrderedStreamBuilder {
    identity: StreamIdentity,
    batch_size: Option<usize>,
    auto_provision: bool,
    catch_delivery_errors: bool,
}

impl OrderedStreamBuilder {
    pub fn new(group_name: impl Into<String>, stream_name: impl Into<String>) -> Self {
        OrderedStreamBuilder {
            identity: StreamIdentity::new(group_name, stream_name),
            batch_size: None,
            auto_provision: true,
            catch_delivery_errors: false,
        }
    }

    pub fn use_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = Some(batch_size);
        self
    }

    /// Create the group and stream when they don't exist yet. On by default.
    pub fn use_auto_provision(mut self, auto_provision: bool) -> Self {
        self.auto_provision = auto_provision;
        self
    }

    pub fn use_catch_delivery_errors(mut self, catch_delivery_errors: bool) -> Self {
        self.catch_delivery_errors = catch_delivery_errors;
        self
    }

    /// Validates the policy, then bootstraps the stream. Fails when the
    /// stream can't be found or provisioned.
    pub fn build<C: LogStreamClient>(self, client: C) -> Result<OrderedStreamHandler<C>> {
        let policy = BatchPolicy::new(
            self.batch_size.unwrap_or(DEFAULT_ORDERED_BATCH_SIZE),
            self.catch_delivery_errors,
        )?;
        let adapter = OrderedStreamAdapter::bootstrap(client, self.identity, self.auto_provision)?;

        Ok(BatchBuffer::new(adapter, policy))
    }
}

/// Configures a handler shipping to a Firehose delivery stream.
#[derive(Debug, Clone)]
pub struct BulkStreamBuilder {
    stream_name: String,
    batch_size: Option<usize>,
    catch_delivery_errors: bool,
}

impl BulkStreamBuilder {
    pub fn new(stream_name: impl Into<String>) -> Self {
        BulkStreamBuilder {
            stream_name: stream_name.into(),
            batch_size: None,
            catch_delivery_errors: true,
        }
    }

    pub fn use_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = Some(batch_size);
        self
    }

    pub fn use_catch_delivery_errors(mut self, catch_delivery_errors: bool) -> Self {
        self.catch_delivery_errors = catch_delivery_errors;
        self
    }

    pub fn build<C: DeliveryStreamClient>(self, client: C) -> Result<BulkStreamHandler<C>> {
        let policy = BatchPolicy::new(
            self.batch_size.unwrap_or(DEFAULT_BULK_BATCH_SIZE),
            self.catch_delivery_errors,
        )?;

        Ok(BatchBuffer::new(
            BulkStreamAdapter::new(client, self.stream_name),
            policy,
        ))
    }
}
