use eyre::WrapErr;
use tracing::debug;

use super::{
    client::{InputLogEvent, LogStreamClient, PutLogEvents},
    SinkAdapter,
};
use crate::{
    error::{Error, Result},
    record::Batch,
};

/// Default number of records per `PutLogEvents` call.
pub const DEFAULT_ORDERED_BATCH_SIZE: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamIdentity {
    pub group_name: String,
    pub stream_name: String,
}

impl StreamIdentity {
    pub fn new(group_name: impl Into<String>, stream_name: impl Into<String>) -> Self {
        Self {
            group_name: group_name.into(),
            stream_name: stream_name.into(),
        }
    }
}

impl std::fmt::Display for StreamIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.group_name, self.stream_name)
    }
}

/// Delivers batches to a single CloudWatch style log stream, threading the
/// sequence token returned by each accepted batch into the next request.
pub struct OrderedStreamAdapter<C> {
    client: C,
    // None once the adapter has been torn down.
    identity: Option<StreamIdentity>,
    sequence_token: Option<String>,
    needs_rediscovery: bool,
}

impl<C: LogStreamClient> OrderedStreamAdapter<C> {
    /// Makes sure the stream is usable and discovers its current token.
    ///
    /// With `auto_provision` the group and stream are created when no exact
    /// name match exists. Without it a missing stream fails construction.
    pub fn bootstrap(client: C, identity: StreamIdentity, auto_provision: bool) -> Result<Self> {
        let mut adapter = Self {
            client,
            identity: None,
            sequence_token: None,
            needs_rediscovery: false,
        };

        if auto_provision {
            adapter
                .provision(&identity)
                .map_err(|source| Error::Provisioning {
                    group: identity.group_name.clone(),
                    stream: identity.stream_name.clone(),
                    source,
                })?;
        } else {
            match adapter.find_stream(&identity) {
                Ok(Some(token)) => adapter.sequence_token = token,
                Ok(None) => {
                    return Err(Error::StreamNotFound {
                        group: identity.group_name,
                        stream: identity.stream_name,
                    })
                }
                Err(source) => {
                    return Err(Error::Provisioning {
                        group: identity.group_name,
                        stream: identity.stream_name,
                        source,
                    })
                }
            }
        }

        debug!(
            stream = %identity,
            has_token = adapter.sequence_token.is_some(),
            "log stream ready"
        );
        adapter.identity = Some(identity);

        Ok(adapter)
    }

    pub fn identity(&self) -> Option<&StreamIdentity> {
        self.identity.as_ref()
    }

    pub fn sequence_token(&self) -> Option<&str> {
        self.sequence_token.as_deref()
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    fn provision(&mut self, identity: &StreamIdentity) -> eyre::Result<()> {
        self.ensure_group(&identity.group_name)?;

        // A failing lookup usually means the group was only just created.
        let existing = self.find_stream(identity).unwrap_or_else(|err| {
            debug!(stream = %identity, error = %err, "log stream lookup failed, creating it");
            None
        });

        match existing {
            Some(token) => self.sequence_token = token,
            None => {
                debug!(stream = %identity, "creating log stream");
                self.client
                    .create_log_stream(&identity.group_name, &identity.stream_name)
                    .wrap_err_with(|| format!("Failed creating log stream {}", identity))?;
            }
        }

        Ok(())
    }

    fn ensure_group(&self, group_name: &str) -> eyre::Result<()> {
        let groups = self
            .client
            .describe_log_groups(group_name)
            .wrap_err_with(|| format!("Failed describing log group {}", group_name))?;

        // The lookup is by prefix, so other groups may come back as well.
        if groups.iter().any(|g| g.name == group_name) {
            return Ok(());
        }

        debug!(group = group_name, "creating log group");
        self.client
            .create_log_group(group_name)
            .wrap_err_with(|| format!("Failed creating log group {}", group_name))
    }

    /// `Ok(Some(token))` when the stream exists, the token itself may be absent.
    fn find_stream(&self, identity: &StreamIdentity) -> eyre::Result<Option<Option<String>>> {
        let streams = self
            .client
            .describe_log_streams(&identity.group_name, &identity.stream_name)
            .wrap_err_with(|| format!("Failed describing log stream {}", identity))?;

        Ok(streams
            .into_iter()
            .find(|s| s.name == identity.stream_name)
            .map(|s| s.upload_sequence_token))
    }

    fn rediscover(&mut self, identity: &StreamIdentity) -> eyre::Result<()> {
        match self.find_stream(identity)? {
            Some(token) => {
                debug!(stream = %identity, "refreshed sequence token");
                self.sequence_token = token;
                self.needs_rediscovery = false;
                Ok(())
            }
            None => Err(eyre::eyre!("Log stream {} no longer exists", identity)),
        }
    }
}

impl<C: LogStreamClient> SinkAdapter for OrderedStreamAdapter<C> {
    fn sink_name(&self) -> String {
        match &self.identity {
            Some(identity) => identity.to_string(),
            None => "closed log stream".to_string(),
        }
    }

    fn deliver(&mut self, batch: Batch) -> Result<()> {
        let identity = match self.identity.clone() {
            Some(identity) => identity,
            None => {
                return Err(Error::Closed {
                    sink: self.sink_name(),
                })
            }
        };
        let records = batch.len();

        if self.needs_rediscovery {
            self.rediscover(&identity)
                .map_err(|source| Error::delivery(identity.to_string(), records, source))?;
        }

        let request = PutLogEvents {
            group_name: identity.group_name.clone(),
            stream_name: identity.stream_name.clone(),
            events: batch
                .into_iter()
                .map(|record| InputLogEvent {
                    timestamp: record.timestamp_millis(),
                    message: record.into_message(),
                })
                .collect(),
            sequence_token: self.sequence_token.clone(),
        };

        match self.client.put_log_events(request) {
            Ok(output) => {
                debug!(stream = %identity, records, "delivered log events");
                self.sequence_token = output.next_sequence_token;
                Ok(())
            }
            Err(source) => {
                // Keep the last accepted token, but confirm it with the sink
                // before it is used again.
                debug!(
                    stream = %identity,
                    records,
                    "log events rejected, token will be rediscovered"
                );
                self.needs_rediscovery = true;
                Err(Error::delivery(identity.to_string(), records, source))
            }
        }
    }

    fn teardown(&mut self) {
        self.identity = None;
    }
}
