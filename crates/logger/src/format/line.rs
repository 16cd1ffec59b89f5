use super::{LogFormat, format_time};
use crate::LogRecord;

/// One line per record: `time [LEVEL|tag|thread] (file:line) content`.
///
/// An attached error follows on its own lines. When built with
/// [`LineFormat::colored`] and the `color` feature is enabled, the fields are
/// wrapped in ANSI color codes.
#[derive(Debug, Clone, Copy, Default)]
pub struct LineFormat {
    colored: bool,
}

impl LineFormat {
    /// Plain text output
    #[must_use]
    pub const fn plain() -> Self {
        Self { colored: false }
    }

    /// ANSI colored output
    #[must_use]
    pub const fn colored() -> Self {
        Self { colored: true }
    }

    /// Whether ANSI colors are emitted
    #[must_use]
    pub const fn is_colored(&self) -> bool {
        self.colored && cfg!(feature = "color")
    }
}

struct Fields {
    time: String,
    location: String,
}

impl Fields {
    fn of(record: &LogRecord) -> Self {
        Self {
            time: format_time(record),
            location: record.location.map_or_else(
                || "unknown".to_string(),
                |location| format!("{}:{}", location.file(), location.line()),
            ),
        }
    }
}

fn push_throwable(line: &mut String, record: &LogRecord) {
    if let Some(throwable) = &record.throwable {
        for entry in throwable.render_lines() {
            line.push('\n');
            line.push_str(&entry);
        }
    }
}

impl LogFormat for LineFormat {
    fn format(&self, record: &LogRecord) -> String {
        let fields = Fields::of(record);

        #[cfg(feature = "color")]
        if self.colored {
            return paint(record, &fields);
        }

        let mut line = format!(
            "{} [{}|{}|{}] ({}) {}",
            fields.time,
            record.level,
            record.tag,
            record.thread_name,
            fields.location,
            record.content_text()
        );
        push_throwable(&mut line, record);
        line
    }
}

#[cfg(feature = "color")]
fn paint(record: &LogRecord, fields: &Fields) -> String {
    use std::io::Write;
    use termcolor::{Buffer, Color, ColorSpec, WriteColor};

    let mut buffer = Buffer::ansi();

    // Writes into an in-memory buffer cannot fail.
    let _ = buffer.set_color(ColorSpec::new().set_dimmed(true));
    let _ = write!(buffer, "{}", fields.time);
    let _ = buffer.reset();

    let _ = write!(buffer, " [");
    let _ = buffer.set_color(
        ColorSpec::new()
            .set_fg(Some(super::level_color(record.level)))
            .set_bold(true),
    );
    let _ = write!(buffer, "{}", record.level);
    let _ = buffer.reset();
    let _ = write!(buffer, "|");
    let _ = buffer.set_color(ColorSpec::new().set_fg(Some(Color::Cyan)));
    let _ = write!(buffer, "{}", record.tag);
    let _ = buffer.reset();
    let _ = write!(buffer, "|{}] ", record.thread_name);

    let _ = buffer.set_color(ColorSpec::new().set_dimmed(true));
    let _ = write!(buffer, "({})", fields.location);
    let _ = buffer.reset();
    let _ = write!(buffer, " {}", record.content_text());

    let mut line = String::from_utf8_lossy(buffer.as_slice()).into_owned();
    push_throwable(&mut line, record);
    line
}
