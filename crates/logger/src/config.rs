//! Declarative configuration loaded from TOML
//!
//! ```toml
//! default_tag = "App"
//! open = true
//! json = "pretty"
//! pretty = true
//! levels = ["WARN", "ERROR"]
//! format = "table"
//!
//! [table]
//! max_single_log_length = 200
//! max_print_times = 5
//! ellipsis = "..."
//!
//! [table.header]
//! thread = false
//! ```

use crate::factory::DEFAULT_TAG;
use crate::{
    Converter, JsonConverter, Level, LineFormat, LogFactory, LogFactoryBuilder, LogHeader,
    LogJson, LogJsonConfig, LogPretty, LogPrettyConfig, LogPrinter, LogPrinterConfig, LogSwitch,
    LogSwitchConfig, OnlyMsgFormat, Result, StdoutLogger, TableConfig, TableFormat,
};
use crate::format::DEFAULT_MAX_SINGLE_LOG_LENGTH;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

/// How structured content is rendered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JsonMode {
    /// No conversion; structured values print as compact JSON
    #[default]
    None,
    /// Single-line JSON
    Compact,
    /// Indented JSON
    Pretty,
}

/// Format of the console printer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrintFormat {
    /// [`TableFormat`]
    #[default]
    Table,
    /// [`LineFormat`], colored when the `color` feature is enabled
    Line,
    /// [`OnlyMsgFormat`]
    OnlyMsg,
}

/// `[table]` section of [`LogConfig`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableSection {
    /// See [`TableConfig::max_single_log_length`]
    pub max_single_log_length: usize,
    /// See [`TableConfig::max_print_times`]; unlimited when absent
    pub max_print_times: Option<usize>,
    /// Header fields
    pub header: LogHeader,
    /// See [`TableConfig::ellipsis`]
    pub ellipsis: Option<String>,
}

impl Default for TableSection {
    fn default() -> Self {
        Self {
            max_single_log_length: DEFAULT_MAX_SINGLE_LOG_LENGTH,
            max_print_times: None,
            header: LogHeader::default(),
            ellipsis: None,
        }
    }
}

impl TableSection {
    /// The equivalent [`TableConfig`].
    #[must_use]
    pub fn to_table_config(&self) -> TableConfig {
        TableConfig {
            max_single_log_length: self.max_single_log_length,
            max_print_times: self.max_print_times.unwrap_or(usize::MAX),
            header: self.header,
            ellipsis: self.ellipsis.clone(),
        }
    }
}

/// Console logging setup that can be read from a TOML document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Tag of the default logcat
    pub default_tag: String,
    /// State of the [`LogSwitch`]
    pub open: bool,
    /// Installs [`LogJson`] with the chosen converter
    pub json: JsonMode,
    /// Installs [`LogPretty`]
    pub pretty: bool,
    /// Printer threshold, used when `levels` is empty
    pub level: Level,
    /// Exact set of printed levels
    pub levels: Vec<Level>,
    /// Printer format
    pub format: PrintFormat,
    /// Table format options
    pub table: TableSection,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            default_tag: DEFAULT_TAG.to_string(),
            open: true,
            json: JsonMode::None,
            pretty: false,
            level: Level::Verbose,
            levels: Vec::new(),
            format: PrintFormat::Table,
            table: TableSection::default(),
        }
    }
}

impl LogConfig {
    /// Parses a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Config`] if the document is malformed.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Reads and parses a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Io`] if the file cannot be read and
    /// [`crate::Error::Config`] if it is malformed.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// A builder with the configured plugins installed and a
    /// [`StdoutLogger`] sink.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidEllipsis`] or
    /// [`crate::Error::InvalidConfig`] if the table options are invalid.
    pub fn to_builder(&self) -> Result<LogFactoryBuilder> {
        let mut builder = LogFactory::builder()
            .default_tag(self.default_tag.clone())
            .install::<LogSwitch>(LogSwitchConfig { open: self.open })?;

        let converter: Option<Arc<dyn Converter>> = match self.json {
            JsonMode::None => None,
            JsonMode::Compact => Some(Arc::new(JsonConverter::compact())),
            JsonMode::Pretty => Some(Arc::new(JsonConverter::pretty())),
        };
        if converter.is_some() {
            builder = builder.install::<LogJson>(LogJsonConfig { converter })?;
        }
        if self.pretty {
            builder = builder.install::<LogPretty>(LogPrettyConfig {
                converter: Some(Arc::new(JsonConverter::pretty())),
            })?;
        }

        let logger = match self.format {
            PrintFormat::Table => {
                StdoutLogger::with_format(TableFormat::new(self.table.to_table_config())?)
            }
            PrintFormat::Line => StdoutLogger::with_format(LineFormat::colored()),
            PrintFormat::OnlyMsg => StdoutLogger::with_format(OnlyMsgFormat),
        };
        builder.install::<LogPrinter>(LogPrinterConfig {
            level: self.level,
            level_set: self.levels.iter().copied().collect(),
            logger: Arc::new(logger),
        })
    }
}

impl LogFactory {
    /// Builds a console logging factory from `config`.
    ///
    /// # Errors
    ///
    /// Returns the first configuration error.
    pub fn from_config(config: &LogConfig) -> Result<Self> {
        Ok(config.to_builder()?.build())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use std::io::Write;

    #[test]
    fn test_empty_document_is_default() {
        let config = LogConfig::from_toml_str("").unwrap();
        assert_eq!(config, LogConfig::default());
        assert!(config.open);
        assert_eq!(config.table.to_table_config(), TableConfig::default());
    }

    #[test]
    fn test_parse_full_document() {
        let config = LogConfig::from_toml_str(
            r#"
            default_tag = "App"
            open = false
            json = "pretty"
            pretty = true
            levels = ["WARN", "ERROR"]
            format = "only_msg"

            [table]
            max_single_log_length = 200
            max_print_times = 5
            ellipsis = "..."

            [table.header]
            thread = false
            "#,
        )
        .unwrap();

        assert_eq!(config.default_tag, "App");
        assert!(!config.open);
        assert_eq!(config.json, JsonMode::Pretty);
        assert_eq!(config.levels, vec![Level::Warn, Level::Error]);
        assert_eq!(config.format, PrintFormat::OnlyMsg);

        let table = config.table.to_table_config();
        assert_eq!(table.max_single_log_length, 200);
        assert_eq!(table.max_print_times, 5);
        assert_eq!(table.ellipsis.as_deref(), Some("..."));
        assert!(!table.header.thread);
        assert!(table.header.tag);
    }

    #[test]
    fn test_malformed_document() {
        let result = LogConfig::from_toml_str("open = \"maybe\"");
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "default_tag = \"FromFile\"").unwrap();

        let config = LogConfig::from_file(file.path()).unwrap();
        assert_eq!(config.default_tag, "FromFile");

        let missing = LogConfig::from_file(file.path().with_extension("missing"));
        assert!(matches!(missing, Err(Error::Io(_))));
    }

    #[test]
    fn test_from_config_installs_plugins() {
        let config = LogConfig {
            json: JsonMode::Compact,
            pretty: true,
            ..LogConfig::default()
        };
        let factory = LogFactory::from_config(&config).unwrap();

        assert!(factory.plugin::<LogSwitch>().is_some());
        assert!(factory.plugin::<LogJson>().is_some());
        assert!(factory.plugin::<LogPretty>().is_some());
        assert!(factory.plugin::<LogPrinter>().is_some());
    }

    #[test]
    fn test_from_config_rejects_long_ellipsis() {
        let mut config = LogConfig::default();
        config.table.ellipsis = Some("............".to_string());
        assert!(matches!(
            LogFactory::from_config(&config),
            Err(Error::InvalidEllipsis(_))
        ));
    }
}
