//! MetadataReader: typed lookups into an app's `metadata/local.meta`.
//!
//! `local.meta` records per-object metadata (owner, export scope, version,
//! modification time) in sections named `<conf>/<stanza>`:
//!
//! ```text
//! [savedsearches/Errors in the last hour]
//! owner = admin
//! modtime = 1476731234.123456
//! ```
//!
//! The file is read once at construction; lookups never touch the disk.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use solnlib_core::conf::{ConfFile, ConfParseError};
use thiserror::Error;
use tracing::debug;

use crate::infrastructure::splunkenv::{EnvError, SplunkEnv};

/// Error type for metadata loading and lookups.
#[derive(Debug, Error)]
pub enum MetadataError {
    /// The metadata file is missing or unreadable.
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: ConfParseError,
    },

    /// The app's metadata path could not be resolved.
    #[error(transparent)]
    Env(#[from] EnvError),

    /// The `[conf/stanza]` section or its option is absent.
    #[error("the metadata value could not be determined: [{section}] {option}")]
    ValueNotDetermined { section: String, option: String },

    /// The option exists but is not a number.
    #[error("metadata value [{section}] {option} = {value:?} is not a number")]
    NotANumber {
        section: String,
        option: String,
        value: String,
    },
}

impl MetadataError {
    /// `true` for lookup failures a caller may replace with a default.
    pub fn is_value_error(&self) -> bool {
        matches!(
            self,
            MetadataError::ValueNotDetermined { .. } | MetadataError::NotANumber { .. }
        )
    }
}

/// Read-only view of one app's `local.meta`.
#[derive(Debug, Clone)]
pub struct MetadataReader {
    conf: ConfFile,
}

impl MetadataReader {
    /// Loads `$SPLUNK_HOME/etc/apps/<app>/metadata/local.meta`.
    ///
    /// # Errors
    ///
    /// Returns [`MetadataError::Io`] if the file does not exist and
    /// [`MetadataError::Parse`] if it is malformed.
    pub fn new(env: &SplunkEnv, app: &str) -> Result<Self, MetadataError> {
        let path = env.local_meta_path(app)?;
        Self::from_path(&path)
    }

    /// Loads metadata from an explicit file path.
    pub fn from_path(path: &Path) -> Result<Self, MetadataError> {
        let text = std::fs::read_to_string(path).map_err(|source| MetadataError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let conf = ConfFile::parse(&text).map_err(|source| MetadataError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), sections = conf.section_names().count(), "loaded metadata");
        Ok(Self { conf })
    }

    /// Wraps already-parsed metadata.
    pub fn from_conf(conf: ConfFile) -> Self {
        Self { conf }
    }

    /// Returns `option` of section `[conf/stanza]`.
    ///
    /// # Errors
    ///
    /// Returns [`MetadataError::ValueNotDetermined`] when the section or the
    /// option does not exist.
    pub fn get(&self, conf: &str, stanza: &str, option: &str) -> Result<&str, MetadataError> {
        let section = section_name(conf, stanza);
        self.conf
            .get(&section, option)
            .ok_or_else(|| MetadataError::ValueNotDetermined {
                section,
                option: option.to_string(),
            })
    }

    /// Returns `option` of section `[conf/stanza]` as a float.
    ///
    /// # Errors
    ///
    /// Same as [`Self::get`], plus [`MetadataError::NotANumber`] when the
    /// value does not parse.
    pub fn get_float(&self, conf: &str, stanza: &str, option: &str) -> Result<f64, MetadataError> {
        let value = self.get(conf, stanza, option)?;
        value
            .trim()
            .parse::<f64>()
            .map_err(|_| MetadataError::NotANumber {
                section: section_name(conf, stanza),
                option: option.to_string(),
                value: value.to_string(),
            })
    }
}

impl FromStr for MetadataReader {
    type Err = ConfParseError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        ConfFile::parse(text).map(Self::from_conf)
    }
}

fn section_name(conf: &str, stanza: &str) -> String {
    format!("{conf}/{stanza}")
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn reader(text: &str) -> MetadataReader {
        text.parse().expect("parse")
    }

    const META: &str = "\
[conf/stanza]
option = value
modtime = 1476731234.5
bad = one point five
";

    #[test]
    fn test_get_returns_exact_value() {
        assert_eq!(reader(META).get("conf", "stanza", "option").unwrap(), "value");
    }

    #[test]
    fn test_get_float_parses_modtime() {
        let value = reader(META).get_float("conf", "stanza", "modtime").unwrap();
        assert_eq!(value, 1476731234.5);
    }

    #[test]
    fn test_get_float_on_non_numeric_is_value_error() {
        let err = reader(META).get_float("conf", "stanza", "bad").unwrap_err();
        assert!(matches!(err, MetadataError::NotANumber { ref value, .. } if value == "one point five"));
        assert!(err.is_value_error());
    }

    #[test]
    fn test_missing_section_is_value_error() {
        let err = reader(META).get("conf", "other", "option").unwrap_err();
        assert!(matches!(err, MetadataError::ValueNotDetermined { ref section, .. } if section == "conf/other"));
        assert!(err.is_value_error());
    }

    #[test]
    fn test_missing_option_is_value_error() {
        let err = reader(META).get("conf", "stanza", "absent").unwrap_err();
        assert!(err.is_value_error());

        let err = reader(META).get_float("conf", "stanza", "absent").unwrap_err();
        assert!(matches!(err, MetadataError::ValueNotDetermined { .. }));
    }

    #[test]
    fn test_option_before_header_fails_to_parse() {
        let result = "owner = admin\n".parse::<MetadataReader>();
        assert!(matches!(result, Err(ConfParseError::MissingSectionHeader { line: 1, .. })));
    }

    #[test]
    fn test_missing_file_is_io_error_not_value_error() {
        let env = SplunkEnv::new(std::env::temp_dir().join(format!("solnlib_no_home_{}", uuid::Uuid::new_v4())));

        let err = MetadataReader::new(&env, "missing_app").unwrap_err();

        assert!(matches!(err, MetadataError::Io { .. }));
        assert!(!err.is_value_error());
    }
}
