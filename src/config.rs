use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::data::source::Format;
use crate::error::{Error, Result};
use crate::fit::FitOptions;
use crate::simulate::SimulationParams;

/// Environment variable pointing at an explicit config file.
pub const CONFIG_ENV_VAR: &str = "LIFETIME_VIEWER_CONFIG";

// ---------------------------------------------------------------------------
// Ingestion options
// ---------------------------------------------------------------------------

/// How the first record of a table is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeaderMode {
    /// Header iff the first record holds at least one non-numeric field.
    #[default]
    Auto,
    Present,
    Absent,
}

/// Parsing knobs shared by the reader and the writer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestOptions {
    pub csv_delimiter: char,
    pub tdf_delimiter: char,
    pub header: HeaderMode,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self {
            csv_delimiter: ',',
            tdf_delimiter: '\t',
            header: HeaderMode::Auto,
        }
    }
}

impl IngestOptions {
    /// The byte delimiter used for `format`.
    pub fn delimiter_for(&self, format: Format) -> Result<u8> {
        let c = match format {
            Format::Csv => self.csv_delimiter,
            Format::Tdf => self.tdf_delimiter,
        };
        // '#' is the comment byte, so it cannot separate fields.
        if !c.is_ascii() || matches!(c, '"' | '#' | '\n' | '\r') {
            return Err(Error::Config(format!(
                "{format} delimiter must be a single ASCII character other than quote, '#' or newline, got {c:?}"
            )));
        }
        Ok(c as u8)
    }
}

// ---------------------------------------------------------------------------
// Fetch options
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchOptions {
    /// Whole-request timeout for URL sources.
    pub timeout_secs: u64,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self { timeout_secs: 30 }
    }
}

// ---------------------------------------------------------------------------
// Top-level viewer configuration
// ---------------------------------------------------------------------------

/// Everything the viewer reads from its JSON config file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub ingest: IngestOptions,
    pub fetch: FetchOptions,
    pub fit: FitOptions,
    pub simulation: SimulationParams,
}

impl ViewerConfig {
    /// Load from `$LIFETIME_VIEWER_CONFIG`, then the per-user config file,
    /// falling back to defaults when neither exists.
    pub fn load() -> Result<Self> {
        if let Some(path) = std::env::var_os(CONFIG_ENV_VAR) {
            return Self::from_path(Path::new(&path));
        }
        match default_config_path() {
            Some(path) if path.is_file() => Self::from_path(&path),
            _ => {
                log::debug!("No config file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Parse and validate a JSON config file.
    pub fn from_path(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        let config: ViewerConfig = serde_json::from_str(&text)
            .map_err(|e| Error::Config(format!("{}: {e}", path.display())))?;
        config.validate()?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        self.ingest.delimiter_for(Format::Csv)?;
        self.ingest.delimiter_for(Format::Tdf)?;
        self.simulation.validate()?;
        if self.fit.max_iterations == 0 {
            return Err(Error::Config("fit.max_iterations must be positive".into()));
        }
        Ok(())
    }
}

/// `<config_dir>/lifetime-viewer/config.json`, if the platform has one.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("lifetime-viewer").join("config.json"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_fills_defaults() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "ingest": { "csv_delimiter": "|" } }"#).unwrap();

        let config = ViewerConfig::from_path(&path).unwrap();
        assert_eq!(config.ingest.csv_delimiter, '|');
        assert_eq!(config.ingest.tdf_delimiter, '\t');
        assert_eq!(config.ingest.header, HeaderMode::Auto);
        assert_eq!(config.fetch, FetchOptions::default());
    }

    #[test]
    fn test_non_ascii_delimiter_rejected() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "ingest": { "tdf_delimiter": "§" } }"#).unwrap();

        let err = ViewerConfig::from_path(&path).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_reserved_delimiters_rejected() {
        for c in ['#', '"', '\n'] {
            let options = IngestOptions {
                csv_delimiter: c,
                ..IngestOptions::default()
            };
            assert!(
                matches!(options.delimiter_for(Format::Csv), Err(Error::Config(_))),
                "{c:?}"
            );
        }

        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r##"{ "ingest": { "csv_delimiter": "#" } }"##).unwrap();
        assert!(matches!(ViewerConfig::from_path(&path), Err(Error::Config(_))));
    }

    #[test]
    fn test_invalid_json_is_config_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();

        assert!(matches!(
            ViewerConfig::from_path(&path),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = ViewerConfig::from_path(Path::new("/nonexistent/lifetime.json")).unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }

    #[test]
    fn test_header_mode_serde_names() {
        let mode: HeaderMode = serde_json::from_str("\"absent\"").unwrap();
        assert_eq!(mode, HeaderMode::Absent);
    }
}
