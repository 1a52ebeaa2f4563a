//! `log` front-end that renders records and ships them through a
//! [`crate::BatchBuffer`].

mod formatters;
mod logger;

pub use formatters::{JsonFormatter, TextFormatter};
pub use logger::{Builder, Config, Logger};

pub trait LogFormatter: Sync + Send {
    fn format(&self, record: &log::Record) -> String;
}
