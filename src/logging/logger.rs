use std::{
    cell::Cell,
    sync::{Mutex, MutexGuard},
};

use eyre::WrapErr;
use log::{LevelFilter, Log};

use super::{formatters::TextFormatter, LogFormatter};
use crate::{buffer::BatchBuffer, error::Result, record::LogRecord, sink::SinkAdapter};

const OWN_TARGET: &str = env!("CARGO_CRATE_NAME");

thread_local! {
    // Set while this thread holds a buffer, so records logged by the sink
    // client during a delivery don't wait on a lock this thread already owns.
    static SHIPPING: Cell<bool> = const { Cell::new(false) };
}

struct ShippingGuard;

impl ShippingGuard {
    fn enter() -> Option<Self> {
        SHIPPING.with(|shipping| {
            if shipping.replace(true) {
                None
            } else {
                Some(ShippingGuard)
            }
        })
    }
}

impl Drop for ShippingGuard {
    fn drop(&mut self) {
        SHIPPING.with(|shipping| shipping.set(false));
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub enabled: bool,
    pub datetime_format: String,
}

impl Config {
    pub fn new() -> Self {
        Self {
            enabled: true,
            datetime_format: "%Y-%m-%d %H:%M:%S%.3f".to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

/// Records logged from inside a delivery on the same thread are dropped.
pub struct Logger<A: SinkAdapter> {
    filter: LevelFilter,
    formatter: Box<dyn LogFormatter>,
    buffer: Mutex<BatchBuffer<A>>,
    config: Config,
}

impl<A: SinkAdapter> Logger<A> {
    pub fn new(
        filter: LevelFilter,
        formatter: Box<dyn LogFormatter>,
        buffer: BatchBuffer<A>,
        config: Config,
    ) -> Self {
        Self {
            filter,
            formatter,
            buffer: Mutex::new(buffer),
            config,
        }
    }

    /// Flushes what is left and stops shipping records.
    pub fn close(&self) -> Result<()> {
        match ShippingGuard::enter() {
            Some(_guard) => self.lock().close(),
            None => Ok(()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, BatchBuffer<A>> {
        // A panicking sink must not take logging down with it.
        self.buffer
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn with_buffer<F>(&self, action: &str, f: F)
    where
        F: FnOnce(&mut BatchBuffer<A>) -> Result<()>,
    {
        let _guard = match ShippingGuard::enter() {
            Some(guard) => guard,
            None => return,
        };
        let mut buffer = self.lock();
        let result = f(&mut *buffer);
        drop(buffer);

        if let Err(err) = result {
            tracing::error!(error = %err, "failed {} log records", action);
        }
    }
}

impl<A: SinkAdapter + Send + 'static> Logger<A> {
    /// Registers the logger globally. The returned handle stays valid for the
    /// rest of the program; call [`Logger::close`] on it before exiting so the
    /// last partial batch is delivered.
    pub fn init(self) -> eyre::Result<&'static Self> {
        let filter = self.filter;
        let logger: &'static Self = Box::leak(Box::new(self));

        log::set_logger(logger).wrap_err("Failed registering logger")?;
        log::set_max_level(filter);

        Ok(logger)
    }
}

fn is_own_record(target: &str) -> bool {
    target == OWN_TARGET
        || target
            .strip_prefix(OWN_TARGET)
            .is_some_and(|rest| rest.starts_with("::"))
}

impl<A: SinkAdapter + Send> Log for Logger<A> {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        self.config.enabled && self.filter >= metadata.level() && !is_own_record(metadata.target())
    }

    fn log(&self, record: &log::Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let line = self.formatter.format(record);
        self.with_buffer("shipping", |buffer| buffer.append(LogRecord::new(line)));
    }

    fn flush(&self) {
        self.with_buffer("flushing", |buffer| buffer.flush(true));
    }
}

pub struct Builder {
    filter: LevelFilter,
    formatter_builder: Box<dyn Fn(Config) -> Box<dyn LogFormatter + 'static>>,
    config: Config,
}

impl Builder {
    pub fn new() -> Self {
        Self {
            filter: LevelFilter::Info,
            formatter_builder: Box::new(|config| Box::new(TextFormatter::new(config))),
            config: Config::new(),
        }
    }

    pub fn with_level(self, filter: LevelFilter) -> Self {
        Self { filter, ..self }
    }

    pub fn with_config(self, config: Config) -> Self {
        Self { config, ..self }
    }

    pub fn with_formatter<F, B>(self, builder: B) -> Self
    where
        F: LogFormatter + 'static,
        B: Fn(Config) -> F + 'static,
    {
        Self {
            formatter_builder: Box::new(move |config| Box::new(builder(config))),
            ..self
        }
    }

    pub fn build<A: SinkAdapter>(&self, buffer: BatchBuffer<A>) -> Logger<A> {
        let formatter = (self.formatter_builder)(self.config.clone());
        Logger::new(self.filter, formatter, buffer, self.config.clone())
    }
}

impl Default for Builder {
    fn default() -> Self {
        Self::new()
    }
}
