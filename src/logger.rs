use crate::cli::{LogConfig, OutputFormat};
use crate::store::TagField;
use serde::Serialize;
use std::path::Path;

/// Line-oriented logger handed to each entity at construction. Cloning
/// is cheap; there is no process-global logging state.
#[derive(Clone)]
pub struct Logger {
    config: LogConfig,
}

#[derive(Serialize)]
struct JsonEvent {
    #[serde(rename = "type")]
    event_type: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<serde_json::Value>,
}

impl Logger {
    pub fn new(config: LogConfig) -> Self {
        Self { config }
    }

    pub fn info(&self, message: &str) {
        if self.config.quiet {
            return;
        }
        self.output("info", message, None);
    }

    pub fn warn(&self, message: &str) {
        self.output("warn", message, None);
    }

    pub fn error(&self, message: &str) {
        self.output("error", message, None);
    }

    pub fn debug(&self, message: &str) {
        if !self.config.verbose {
            return;
        }
        self.output("debug", message, None);
    }

    /// A tag value is being written.
    pub fn tag_set(&self, path: &Path, field: TagField, value: &str) {
        if !self.config.verbose {
            return;
        }
        let data = serde_json::json!({
            "path": path.display().to_string(),
            "field": field.to_string(),
            "value": value,
        });
        self.output(
            "tag_set",
            &format!("{}: setting {} to {}", path.display(), field, value),
            Some(data),
        );
    }

    /// A file is being moved to its canonical name.
    pub fn rename(&self, from: &Path, to: &Path) {
        if self.config.quiet {
            return;
        }
        let data = serde_json::json!({
            "from": from.display().to_string(),
            "to": to.display().to_string(),
        });
        self.output(
            "rename",
            &format!("renaming {} to {}", from.display(), to.display()),
            Some(data),
        );
    }

    fn output(&self, event_type: &str, message: &str, data: Option<serde_json::Value>) {
        match self.config.format {
            OutputFormat::Json => {
                let event = JsonEvent {
                    event_type: event_type.to_string(),
                    message: message.to_string(),
                    data,
                };
                if let Ok(json) = serde_json::to_string(&event) {
                    println!("{}", json);
                }
            }
            OutputFormat::Text => {
                let prefix = match event_type {
                    "error" => "[ERROR]",
                    "warn" => "[WARN]",
                    "debug" | "tag_set" => "[DEBUG]",
                    "rename" => "[...]",
                    _ => "[INFO]",
                };
                println!("{} {}", prefix, message);
            }
        }
    }
}
