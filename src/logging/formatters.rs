use serde_json::json;

use super::{logger::Config, LogFormatter};

/// `2024-01-01 10:00:00 WARN app::db: message`, one line per record.
pub struct TextFormatter {
    config: Config,
}

impl TextFormatter {
    pub fn new(config: Config) -> Self {
        Self { config }
    }
}

impl LogFormatter for TextFormatter {
    fn format(&self, record: &log::Record) -> String {
        let time = chrono::Utc::now().format(&self.config.datetime_format);
        let mut line = format!("{} {:<5} {}", time, record.level(), record.target());

        if let (Some(file), Some(number)) = (record.file(), record.line()) {
            line.push_str(&format!(" ({}:{})", file, number));
        }

        line.push_str(&format!(": {}", record.args()));
        line
    }
}

/// One JSON object per record, handy for Logs Insights queries.
pub struct JsonFormatter {
    config: Config,
}

impl JsonFormatter {
    pub fn new(config: Config) -> Self {
        Self { config }
    }
}

impl LogFormatter for JsonFormatter {
    fn format(&self, record: &log::Record) -> String {
        let time = chrono::Utc::now().format(&self.config.datetime_format);
        let mut json = json!({
            "timestamp": time.to_string(),
            "level": record.level().as_str(),
            "target": record.target(),
            "message": record.args().to_string(),
        });

        if let Some(module) = record.module_path() {
            json["module"] = module.into();
        }

        if let (Some(file), Some(line)) = (record.file(), record.line()) {
            json["location"] = format!("{}:{}", file, line).into();
        }

        json.to_string()
    }
}
