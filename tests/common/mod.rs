#![allow(dead_code)]

use std::{cell::RefCell, collections::VecDeque};

use cw_batch::sink::{
    DeliveryStreamClient, LogGroupSummary, LogStreamClient, LogStreamSummary, PutLogEvents,
    PutLogEventsOutput, PutRecordBatch, PutRecordBatchOutput,
};

#[derive(Debug, Clone, PartialEq)]
pub enum LogsCall {
    DescribeGroups(String),
    CreateGroup(String),
    DescribeStreams(String, String),
    CreateStream(String, String),
    Put(PutLogEvents),
}

/// In-memory CloudWatch Logs double. Put results are consumed in order,
/// an exhausted queue answers with a fresh `tokN` token.
#[derive(Default)]
pub struct MockLogs {
    pub groups: RefCell<Vec<String>>,
    pub streams: RefCell<Vec<LogStreamSummary>>,
    pub put_results: RefCell<VecDeque<eyre::Result<PutLogEventsOutput>>>,
    pub calls: RefCell<Vec<LogsCall>>,
}

impl MockLogs {
    pub fn with_stream(group: &str, stream: &str, token: Option<&str>) -> Self {
        let logs = Self::default();
        logs.groups.borrow_mut().push(group.to_string());
        logs.streams.borrow_mut().push(LogStreamSummary {
            name: stream.to_string(),
            upload_sequence_token: token.map(String::from),
        });
        logs
    }

    pub fn fail_next_put(&self, message: &'static str) {
        self.put_results
            .borrow_mut()
            .push_back(Err(eyre::eyre!(message)));
    }

    pub fn calls(&self) -> Vec<LogsCall> {
        self.calls.borrow().clone()
    }

    pub fn puts(&self) -> Vec<PutLogEvents> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                LogsCall::Put(put) => Some(put),
                _ => None,
            })
            .collect()
    }

    pub fn creates(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, LogsCall::CreateGroup(_) | LogsCall::CreateStream(..)))
            .count()
    }
}

impl LogStreamClient for MockLogs {
    fn describe_log_groups(&self, name_prefix: &str) -> eyre::Result<Vec<LogGroupSummary>> {
        self.calls
            .borrow_mut()
            .push(LogsCall::DescribeGroups(name_prefix.to_string()));

        Ok(self
            .groups
            .borrow()
            .iter()
            .filter(|g| g.starts_with(name_prefix))
            .map(|g| LogGroupSummary { name: g.clone() })
            .collect())
    }

    fn create_log_group(&self, name: &str) -> eyre::Result<()> {
        self.calls
            .borrow_mut()
            .push(LogsCall::CreateGroup(name.to_string()));
        self.groups.borrow_mut().push(name.to_string());
        Ok(())
    }

    fn describe_log_streams(
        &self,
        group_name: &str,
        name_prefix: &str,
    ) -> eyre::Result<Vec<LogStreamSummary>> {
        self.calls.borrow_mut().push(LogsCall::DescribeStreams(
            group_name.to_string(),
            name_prefix.to_string(),
        ));

        if !self.groups.borrow().iter().any(|g| g == group_name) {
            return Err(eyre::eyre!("ResourceNotFoundException: {}", group_name));
        }

        Ok(self
            .streams
            .borrow()
            .iter()
            .filter(|s| s.name.starts_with(name_prefix))
            .cloned()
            .collect())
    }

    fn create_log_stream(&self, group_name: &str, name: &str) -> eyre::Result<()> {
        self.calls.borrow_mut().push(LogsCall::CreateStream(
            group_name.to_string(),
            name.to_string(),
        ));
        self.streams.borrow_mut().push(LogStreamSummary {
            name: name.to_string(),
            upload_sequence_token: None,
        });
        Ok(())
    }

    fn put_log_events(&self, request: PutLogEvents) -> eyre::Result<PutLogEventsOutput> {
        self.calls.borrow_mut().push(LogsCall::Put(request));
        let puts = self.puts().len();

        self.put_results.borrow_mut().pop_front().unwrap_or_else(|| {
            Ok(PutLogEventsOutput {
                next_sequence_token: Some(format!("tok{}", puts)),
            })
        })
    }
}

#[derive(Default)]
pub struct MockFirehose {
    pub fail: bool,
    pub requests: RefCell<Vec<PutRecordBatch>>,
}

impl DeliveryStreamClient for MockFirehose {
    fn put_record_batch(&self, request: PutRecordBatch) -> eyre::Result<PutRecordBatchOutput> {
        let records = request.records.len();
        self.requests.borrow_mut().push(request);

        if self.fail {
            return Err(eyre::eyre!("ResourceNotFoundException"));
        }

        Ok(PutRecordBatchOutput {
            failed_count: 0,
            responses: vec![Default::default(); records],
        })
    }
}
