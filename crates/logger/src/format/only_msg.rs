use super::LogFormat;
use crate::LogRecord;

/// Prints the content and nothing else.
#[derive(Debug, Clone, Copy, Default)]
pub struct OnlyMsgFormat;

impl LogFormat for OnlyMsgFormat {
    fn format(&self, record: &LogRecord) -> String {
        record.content_text().into_owned()
    }
}
