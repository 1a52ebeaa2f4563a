use tracing::warn;

use crate::{
    error::{Error, Result},
    record::{Batch, LogRecord},
    sink::SinkAdapter,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchPolicy {
    max_batch_size: usize,
    catch_delivery_errors: bool,
}

impl BatchPolicy {
    pub fn new(max_batch_size: usize, catch_delivery_errors: bool) -> Result<Self> {
        if max_batch_size == 0 {
            return Err(Error::InvalidBatchSize);
        }

        Ok(Self {
            max_batch_size,
            catch_delivery_errors,
        })
    }

    pub fn max_batch_size(&self) -> usize {
        self.max_batch_size
    }

    pub fn catch_delivery_errors(&self) -> bool {
        self.catch_delivery_errors
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Open,
    Closed,
}

/// Accumulates records and hands them to a [`SinkAdapter`] once the batch is
/// full, on a forced flush, or on close.
///
/// Records are held in memory only. Whatever the outcome of a delivery, the
/// records it carried are gone from the buffer afterwards.
pub struct BatchBuffer<A: SinkAdapter> {
    adapter: A,
    policy: BatchPolicy,
    records: Vec<LogRecord>,
    state: State,
}

impl<A: SinkAdapter> BatchBuffer<A> {
    pub fn new(adapter: A, policy: BatchPolicy) -> Self {
        Self {
            adapter,
            policy,
            records: Vec::with_capacity(policy.max_batch_size()),
            state: State::Open,
        }
    }

    pub fn append(&mut self, record: LogRecord) -> Result<()> {
        self.ensure_open()?;
        self.records.push(record);
        self.flush(false)
    }

    /// Delivers the buffered records when the batch is full, or whenever
    /// something is buffered if `force` is set.
    pub fn flush(&mut self, force: bool) -> Result<()> {
        self.ensure_open()?;

        if !force && self.records.len() < self.policy.max_batch_size() {
            return Ok(());
        }

        let capacity = self.policy.max_batch_size();
        let batch = match Batch::new(std::mem::replace(
            &mut self.records,
            Vec::with_capacity(capacity),
        )) {
            Some(batch) => batch,
            None => return Ok(()),
        };

        let records = batch.len();
        match self.adapter.deliver(batch) {
            Ok(()) => Ok(()),
            Err(err) if err.is_delivery() && self.policy.catch_delivery_errors() => {
                warn!(
                    sink = %self.adapter.sink_name(),
                    records,
                    error = %err,
                    "dropping batch after failed delivery"
                );
                Ok(())
            }
            Err(err) => Err(err),
        }
    }

    /// Flushes whatever is left and makes the handler inert. Closing an
    /// already closed buffer does nothing.
    pub fn close(&mut self) -> Result<()> {
        if self.state == State::Closed {
            return Ok(());
        }

        let result = self.flush(true);
        self.adapter.teardown();
        self.state = State::Closed;
        result
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn is_closed(&self) -> bool {
        self.state == State::Closed
    }

    pub fn policy(&self) -> &BatchPolicy {
        &self.policy
    }

    pub fn adapter(&self) -> &A {
        &self.adapter
    }

    fn ensure_open(&self) -> Result<()> {
        match self.state {
            State::Open => Ok(()),
            State::Closed => Err(Error::Closed {
                sink: self.adapter.sink_name(),
            }),
        }
    }
}

impl<A: SinkAdapter> Drop for BatchBuffer<A> {
    fn drop(&mut self) {
        if let Err(err) = self.close() {
            warn!(error = %err, "failed flushing log records on drop");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, rc::Rc};

    use super::*;

    #[derive(Default)]
    struct Recorded {
        batches: Vec<Vec<String>>,
        torn_down: bool,
    }

    struct RecordingAdapter {
        recorded: Rc<RefCell<Recorded>>,
        fail: bool,
    }

    impl RecordingAdapter {
        fn new(fail: bool) -> (Self, Rc<RefCell<Recorded>>) {
            let recorded = Rc::new(RefCell::new(Recorded::default()));
            (
                Self {
                    recorded: recorded.clone(),
                    fail,
                },
                recorded,
            )
        }
    }

    impl SinkAdapter for RecordingAdapter {
        fn sink_name(&self) -> String {
            "recording".to_string()
        }

        fn deliver(&mut self, batch: Batch) -> Result<()> {
            let records = batch.len();
            self.recorded
                .borrow_mut()
                .batches
                .push(batch.into_iter().map(|r| r.message().to_string()).collect());

            if self.fail {
                return Err(Error::delivery("recording", records, eyre::eyre!("boom")));
            }
            Ok(())
        }

        fn teardown(&mut self) {
            self.recorded.borrow_mut().torn_down = true;
        }
    }

    fn buffer(
        max: usize,
        catch: bool,
        fail: bool,
    ) -> (BatchBuffer<RecordingAdapter>, Rc<RefCell<Recorded>>) {
        let (adapter, recorded) = RecordingAdapter::new(fail);
        let policy = BatchPolicy::new(max, catch).unwrap();
        (BatchBuffer::new(adapter, policy), recorded)
    }

    #[test]
    fn zero_batch_size_is_rejected() {
        assert!(matches!(
            BatchPolicy::new(0, false),
            Err(Error::InvalidBatchSize)
        ));
    }

    #[test]
    fn full_batch_is_delivered_once() {
        let (mut buffer, recorded) = buffer(3, false, false);

        for message in ["a", "b", "c"] {
            buffer.append(LogRecord::new(message)).unwrap();
        }

        assert_eq!(recorded.borrow().batches, vec![vec!["a", "b", "c"]]);
        assert!(buffer.is_empty());
    }

    #[test]
    fn partial_batch_waits_for_close() {
        let (mut buffer, recorded) = buffer(3, false, false);

        buffer.append(LogRecord::new("a")).unwrap();
        buffer.append(LogRecord::new("b")).unwrap();
        buffer.flush(false).unwrap();
        assert!(recorded.borrow().batches.is_empty());
        assert_eq!(buffer.len(), 2);

        buffer.close().unwrap();
        assert_eq!(recorded.borrow().batches, vec![vec!["a", "b"]]);
        assert!(buffer.is_empty());
        assert!(recorded.borrow().torn_down);
    }

    #[test]
    fn forced_flush_on_empty_buffer_is_a_noop() {
        let (mut buffer, recorded) = buffer(3, false, false);

        buffer.flush(true).unwrap();
        buffer.close().unwrap();

        assert!(recorded.borrow().batches.is_empty());
    }

    #[test]
    fn failures_propagate_and_clear_the_buffer() {
        let (mut buffer, recorded) = buffer(2, false, true);

        buffer.append(LogRecord::new("a")).unwrap();
        let err = buffer.append(LogRecord::new("b")).unwrap_err();

        assert!(err.is_delivery());
        assert!(buffer.is_empty());
        assert_eq!(recorded.borrow().batches.len(), 1);

        buffer.append(LogRecord::new("c")).unwrap();
        assert!(buffer.close().is_err());
        assert!(buffer.is_empty());
        assert!(buffer.is_closed());
    }

    #[test]
    fn caught_failures_are_dropped() {
        let (mut buffer, recorded) = buffer(1, true, true);

        buffer.append(LogRecord::new("a")).unwrap();
        buffer.append(LogRecord::new("b")).unwrap();

        assert!(buffer.is_empty());
        assert_eq!(recorded.borrow().batches, vec![vec!["a"], vec!["b"]]);
    }

    #[test]
    fn closed_buffer_refuses_records() {
        let (mut buffer, recorded) = buffer(1, false, false);

        buffer.close().unwrap();
        buffer.close().unwrap();

        assert!(matches!(
            buffer.append(LogRecord::new("late")),
            Err(Error::Closed { .. })
        ));
        assert!(matches!(buffer.flush(true), Err(Error::Closed { .. })));
        assert!(recorded.borrow().batches.is_empty());
    }

    #[test]
    fn dropping_flushes_residual_records() {
        let (mut buffer, recorded) = buffer(10, false, false);

        buffer.append(LogRecord::new("a")).unwrap();
        drop(buffer);

        assert_eq!(recorded.borrow().batches, vec![vec!["a"]]);
        assert!(recorded.borrow().torn_down);
    }
}
