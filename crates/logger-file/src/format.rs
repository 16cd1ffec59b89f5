use chrono::SecondsFormat;
use logpipe_logger::{Level, LogFormat, LogRecord};
use serde::Serialize;

/// One JSON object per record.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonLineFormat;

#[derive(Serialize)]
struct Entry<'a> {
    time: String,
    level: Level,
    tag: &'a str,
    thread: &'a str,
    location: String,
    message: &'a str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    error: Vec<String>,
}

impl LogFormat for JsonLineFormat {
    fn format(&self, record: &LogRecord) -> String {
        let message = record.content_text();
        let error = record
            .throwable
            .as_ref()
            .map(|throwable| {
                std::iter::once(throwable.to_string())
                    .chain(throwable.causes().map(ToString::to_string))
                    .collect()
            })
            .unwrap_or_default();
        let entry = Entry {
            time: record.time.to_rfc3339_opts(SecondsFormat::Millis, false),
            level: record.level,
            tag: &record.tag,
            thread: &record.thread_name,
            location: record.location_string(),
            message: &message,
            error,
        };
        serde_json::to_string(&entry).unwrap_or_else(|_| message.to_string())
    }
}
