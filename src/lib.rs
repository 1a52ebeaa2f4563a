//! Buffers log records in memory and ships them in batches to CloudWatch Logs
//! (ordered, sequence token protected streams) or Kinesis Firehose (bulk
//! delivery streams).
//!
//! ```no_run
//! use cw_batch::{aws::AwsClientBuilder, LogRecord, OrderedStreamBuilder};
//!
//! # fn main() -> eyre::Result<()> {
//! let client = AwsClientBuilder::new().build_cloudwatch_logs()?;
//! let mut handler = OrderedStreamBuilder::new("my-app", "worker-1").build(client)?;
//!
//! handler.append(LogRecord::new("hello"))?;
//! handler.close()?;
//! # Ok(())
//! # }
//! ```

pub mod aws;
mod buffer;
mod config;
mod error;
pub mod logging;
mod record;
pub mod sink;

pub use buffer::{BatchBuffer, BatchPolicy};
pub use config::{BulkStreamBuilder, BulkStreamHandler, OrderedStreamBuilder, OrderedStreamHandler};
pub use error::{Error, Result};
pub use record::{Batch, LogRecord, RecordTime};
pub use sink::{BulkStreamAdapter, OrderedStreamAdapter, SinkAdapter, StreamIdentity};
