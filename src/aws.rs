//! AWS SDK backed sink clients.
//!
//! The SDK is async while the handlers are not, so every client owns a small
//! current-thread runtime and blocks on each request. Don't call these from
//! inside another tokio runtime.

use std::future::Future;

use aws_config::{retry::RetryConfig, Region, SdkConfig};
use aws_sdk_cloudwatchlogs as cloudwatchlogs;
use aws_sdk_firehose as firehose;
use aws_smithy_types::Blob;
use eyre::WrapErr;
use tokio::runtime::Runtime;

use crate::sink::{
    DeliveryStreamClient, LogGroupSummary, LogStreamClient, LogStreamSummary, PutLogEvents,
    PutLogEventsOutput, PutRecordBatch, PutRecordBatchOutput, RecordResult,
};

pub struct AwsClientBuilder {
    profile_name: Option<String>,
    region: Option<String>,
    retry_config: RetryConfig,
}

impl AwsClientBuilder {
    pub fn new() -> Self {
        AwsClientBuilder {
            profile_name: None,
            region: None,
            retry_config: RetryConfig::standard(),
        }
    }

    pub fn use_profile_name(mut self, profile_name: Option<String>) -> Self {
        self.profile_name = profile_name;
        self
    }

    pub fn use_region(mut self, region: Option<String>) -> Self {
        self.region = region;
        self
    }

    pub fn use_retry_config(mut self, retry_config: RetryConfig) -> Self {
        self.retry_config = retry_config;
        self
    }

    pub fn build_cloudwatch_logs(&self) -> eyre::Result<CloudWatchLogsClient> {
        let runtime = self.runtime()?;
        let config = runtime.block_on(self.load_config());

        Ok(CloudWatchLogsClient {
            client: cloudwatchlogs::Client::new(&config),
            runtime,
        })
    }

    pub fn build_firehose(&self) -> eyre::Result<FirehoseClient> {
        let runtime = self.runtime()?;
        let config = runtime.block_on(self.load_config());

        Ok(FirehoseClient {
            client: firehose::Client::new(&config),
            runtime,
        })
    }

    fn runtime(&self) -> eyre::Result<Runtime> {
        tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .wrap_err("Failed creating runtime for AWS client")
    }

    async fn load_config(&self) -> SdkConfig {
        let mut builder = aws_config::from_env().retry_config(self.retry_config.clone());
        if let Some(profile_name) = &self.profile_name {
            builder = builder.profile_name(profile_name);
        }

        if let Some(region) = &self.region {
            builder = builder.region(Region::new(region.clone()));
        }

        builder.load().await
    }
}

impl Default for AwsClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

pub struct CloudWatchLogsClient {
    client: cloudwatchlogs::Client,
    runtime: Runtime,
}

impl CloudWatchLogsClient {
    fn block_on<F: Future>(&self, future: F) -> F::Output {
        self.runtime.block_on(future)
    }
}

impl LogStreamClient for CloudWatchLogsClient {
    fn describe_log_groups(&self, name_prefix: &str) -> eyre::Result<Vec<LogGroupSummary>> {
        self.block_on(async {
            let mut groups = Vec::new();
            let mut next_token: Option<String> = None;

            loop {
                let response = self
                    .client
                    .describe_log_groups()
                    .log_group_name_prefix(name_prefix)
                    .set_next_token(next_token.take())
                    .send()
                    .await
                    .wrap_err("Failed describing log groups")?;

                groups.extend(response.log_groups().iter().filter_map(|group| {
                    group.log_group_name().map(|name| LogGroupSummary {
                        name: name.to_string(),
                    })
                }));

                next_token = response.next_token().map(|t| t.to_string());

                if next_token.is_none() {
                    break;
                }
            }

            Ok::<_, eyre::Report>(groups)
        })
    }

    fn create_log_group(&self, name: &str) -> eyre::Result<()> {
        self.block_on(
            self.client
                .create_log_group()
                .log_group_name(name)
                .send(),
        )
        .wrap_err_with(|| format!("Failed creating log group {}", name))?;

        Ok(())
    }

    #[allow(deprecated)]
    fn describe_log_streams(
        &self,
        group_name: &str,
        name_prefix: &str,
    ) -> eyre::Result<Vec<LogStreamSummary>> {
        self.block_on(async {
            let mut streams = Vec::new();
            let mut next_token: Option<String> = None;

            loop {
                let response = self
                    .client
                    .describe_log_streams()
                    .log_group_name(group_name)
                    .log_stream_name_prefix(name_prefix)
                    .set_next_token(next_token.take())
                    .send()
                    .await
                    .wrap_err("Failed describing log streams")?;

                streams.extend(response.log_streams().iter().filter_map(|stream| {
                    stream.log_stream_name().map(|name| LogStreamSummary {
                        name: name.to_string(),
                        upload_sequence_token: stream.upload_sequence_token().map(String::from),
                    })
                }));

                next_token = response.next_token().map(|t| t.to_string());

                if next_token.is_none() {
                    break;
                }
            }

            Ok::<_, eyre::Report>(streams)
        })
    }

    fn create_log_stream(&self, group_name: &str, name: &str) -> eyre::Result<()> {
        self.block_on(
            self.client
                .create_log_stream()
                .log_group_name(group_name)
                .log_stream_name(name)
                .send(),
        )
        .wrap_err_with(|| format!("Failed creating log stream {}:{}", group_name, name))?;

        Ok(())
    }

    #[allow(deprecated)]
    fn put_log_events(&self, request: PutLogEvents) -> eyre::Result<PutLogEventsOutput> {
        let events = request
            .events
            .into_iter()
            .map(|event| {
                cloudwatchlogs::types::InputLogEvent::builder()
                    .timestamp(event.timestamp)
                    .message(event.message)
                    .build()
            })
            .collect::<Result<Vec<_>, _>>()
            .wrap_err("Failed building log events")?;

        let response = self
            .block_on(
                self.client
                    .put_log_events()
                    .log_group_name(request.group_name)
                    .log_stream_name(request.stream_name)
                    .set_log_events(Some(events))
                    .set_sequence_token(request.sequence_token)
                    .send(),
            )
            .wrap_err("Failed putting log events")?;

        Ok(PutLogEventsOutput {
            next_sequence_token: response.next_sequence_token().map(String::from),
        })
    }
}

pub struct FirehoseClient {
    client: firehose::Client,
    runtime: Runtime,
}

impl DeliveryStreamClient for FirehoseClient {
    fn put_record_batch(&self, request: PutRecordBatch) -> eyre::Result<PutRecordBatchOutput> {
        let records = request
            .records
            .into_iter()
            .map(|data| firehose::types::Record::builder().data(Blob::new(data)).build())
            .collect::<Result<Vec<_>, _>>()
            .wrap_err("Failed building firehose records")?;

        let response = self
            .runtime
            .block_on(
                self.client
                    .put_record_batch()
                    .delivery_stream_name(request.stream_name)
                    .set_records(Some(records))
                    .send(),
            )
            .wrap_err("Failed putting record batch")?;

        Ok(PutRecordBatchOutput {
            failed_count: usize::try_from(response.failed_put_count()).unwrap_or_default(),
            responses: response
                .request_responses()
                .iter()
                .map(|entry| RecordResult {
                    record_id: entry.record_id().map(String::from),
                    error_code: entry.error_code().map(String::from),
                    error_message: entry.error_message().map(String::from),
                })
                .collect(),
        })
    }
}
