//! Paths and settings of the local Splunk installation.
//!
//! The installation root comes from `SPLUNK_HOME`; `SPLUNK_ETC` relocates the
//! `etc` tree.  [`SplunkEnv::from_env`] reads both once, after which the value
//! is passed explicitly to whoever needs it (the metadata reader, config
//! lookups), keeping process environment reads in one place.

use std::path::{Component, Path, PathBuf};

use solnlib_core::conf::{ConfFile, ConfParseError};
use thiserror::Error;
use tracing::debug;

/// Error type for environment and path resolution.
#[derive(Debug, Error)]
pub enum EnvError {
    #[error("SPLUNK_HOME is not set")]
    SplunkHomeNotSet,

    /// The joined path would leave the installation directory.
    #[error("illegal escape from parent directory {base}: {path}")]
    IllegalEscape { base: PathBuf, path: PathBuf },

    #[error("I/O error reading {path}: {source}")]
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

    #[error("invalid mgmtHostPort {0:?}")]
    InvalidHostPort(String),
}

/// How to reach splunkd on this host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplunkdAccessInfo {
    pub scheme: String,
    pub host: String,
    pub port: u16,
}

impl SplunkdAccessInfo {
    pub fn uri(&self) -> String {
        format_uri(&self.scheme, &self.host, self.port)
    }
}

/// `scheme://host:port`, bracketing a bare IPv6 host.
pub(crate) fn format_uri(scheme: &str, host: &str, port: u16) -> String {
    if host.contains(':') && !host.starts_with('[') {
        format!("{scheme}://[{host}]:{port}")
    } else {
        format!("{scheme}://{host}:{port}")
    }
}

/// A Splunk installation root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplunkEnv {
    home: PathBuf,
    etc: PathBuf,
    bind_ip: Option<String>,
}

impl SplunkEnv {
    /// Installation at `home` with `etc` at `home/etc`.
    pub fn new(home: impl Into<PathBuf>) -> Self {
        let home = home.into();
        let etc = home.join("etc");
        Self {
            home,
            etc,
            bind_ip: None,
        }
    }

    /// Relocates the `etc` tree.
    pub fn with_etc(mut self, etc: impl Into<PathBuf>) -> Self {
        self.etc = etc.into();
        self
    }

    /// Overrides the splunkd host (what `SPLUNK_BINDIP` does).  A trailing
    /// `:port` is dropped: `10.0.0.1:8089` and `[::1]:8089` bind to
    /// `10.0.0.1` and `::1`.
    pub fn with_bind_ip(mut self, ip: impl Into<String>) -> Self {
        self.bind_ip = Some(bind_host(&ip.into()));
        self
    }

    /// Reads `SPLUNK_HOME`, `SPLUNK_ETC` and `SPLUNK_BINDIP`.
    ///
    /// # Errors
    ///
    /// Returns [`EnvError::SplunkHomeNotSet`] when `SPLUNK_HOME` is missing.
    pub fn from_env() -> Result<Self, EnvError> {
        let home = std::env::var_os("SPLUNK_HOME").ok_or(EnvError::SplunkHomeNotSet)?;
        let mut env = Self::new(PathBuf::from(home));
        if let Some(etc) = std::env::var_os("SPLUNK_ETC") {
            env = env.with_etc(PathBuf::from(etc));
        }
        if let Ok(ip) = std::env::var("SPLUNK_BINDIP") {
            if !ip.is_empty() {
                env = env.with_bind_ip(ip);
            }
        }
        Ok(env)
    }

    pub fn home(&self) -> &Path {
        &self.home
    }

    pub fn etc(&self) -> &Path {
        &self.etc
    }

    /// Joins `parts` under the installation root.
    ///
    /// A relative path starting with `etc` resolves under [`Self::etc`].
    /// `.` and `..` are normalised lexically.
    ///
    /// # Errors
    ///
    /// Returns [`EnvError::IllegalEscape`] if the result is outside the base.
    ///
    /// ```rust
    /// use solnlib_client::infrastructure::splunkenv::SplunkEnv;
    ///
    /// let env = SplunkEnv::new("/opt/splunk").with_etc("/etc/splunk");
    /// let path = env.make_path(&["etc", "apps", "search", "metadata", "local.meta"]).unwrap();
    /// assert_eq!(path, std::path::PathBuf::from("/etc/splunk/apps/search/metadata/local.meta"));
    /// ```
    pub fn make_path<S: AsRef<str>>(&self, parts: &[S]) -> Result<PathBuf, EnvError> {
        let relative = normalize(parts.iter().map(|p| Path::new(p.as_ref())));
        let (base, relative) = match relative.strip_prefix("etc") {
            Ok(rest) => (self.etc.as_path(), rest.to_path_buf()),
            Err(_) => (self.home.as_path(), relative),
        };
        if relative.as_os_str().is_empty() {
            return Ok(base.to_path_buf());
        }

        // A leftover `..` climbs above `base`; an absolute part replaces it.
        let full = base.join(&relative);
        let climbs = relative.components().next() == Some(Component::ParentDir);
        if climbs || !full.starts_with(base) {
            return Err(EnvError::IllegalEscape {
                base: base.to_path_buf(),
                path: full,
            });
        }
        Ok(full)
    }

    /// Path of an app's `metadata/local.meta`.
    pub fn local_meta_path(&self, app: &str) -> Result<PathBuf, EnvError> {
        self.make_path(&["etc", "apps", app, "metadata", "local.meta"])
    }

    /// Looks `key` up in `[stanza]` of `conf`, checking
    /// `etc/system/local/<conf>.conf` before `etc/system/default/<conf>.conf`.
    /// Missing files are skipped.
    pub fn conf_value(&self, conf: &str, stanza: &str, key: &str) -> Result<Option<String>, EnvError> {
        let file = format!("{conf}.conf");
        for layer in ["local", "default"] {
            let path = self.make_path(&["etc", "system", layer, file.as_str()])?;
            let Some(parsed) = read_conf(&path)? else {
                continue;
            };
            if let Some(value) = parsed.get(stanza, key) {
                debug!(conf, stanza, key, layer, "conf value resolved");
                return Ok(Some(value.to_string()));
            }
        }
        Ok(None)
    }

    /// Scheme, host and port of the local splunkd.
    ///
    /// - scheme: `server.conf [sslConfig] enableSplunkdSSL` (default on)
    /// - host/port: `web.conf [settings] mgmtHostPort` (default `127.0.0.1:8089`)
    /// - a configured bind IP replaces the host.
    pub fn splunkd_access_info(&self) -> Result<SplunkdAccessInfo, EnvError> {
        let ssl = self
            .conf_value("server", "sslConfig", "enableSplunkdSSL")?
            .map(|v| is_true(&v))
            .unwrap_or(true);
        let scheme = if ssl { "https" } else { "http" };

        let host_port = self
            .conf_value("web", "settings", "mgmtHostPort")?
            .unwrap_or_else(|| "127.0.0.1:8089".to_string());
        let (host, port) = split_host_port(&host_port)?;
        let host = self.bind_ip.clone().unwrap_or(host);

        Ok(SplunkdAccessInfo {
            scheme: scheme.to_string(),
            host,
            port,
        })
    }

    /// `scheme://host:port` of the local splunkd.
    pub fn splunkd_uri(&self) -> Result<String, EnvError> {
        Ok(self.splunkd_access_info()?.uri())
    }
}

fn read_conf(path: &Path) -> Result<Option<ConfFile>, EnvError> {
    match std::fs::read_to_string(path) {
        Ok(text) => ConfFile::parse(&text)
            .map(Some)
            .map_err(|source| EnvError::Parse {
                path: path.to_path_buf(),
                source,
            }),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(source) => Err(EnvError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Lexical normalisation: drops `.`, folds `name/..`, keeps leading `..`.
fn normalize<'a>(parts: impl Iterator<Item = &'a Path>) -> PathBuf {
    let mut out: Vec<Component<'a>> = Vec::new();
    for part in parts {
        for component in part.components() {
            match component {
                Component::CurDir => {}
                Component::ParentDir => match out.last() {
                    Some(Component::Normal(_)) => {
                        out.pop();
                    }
                    _ => out.push(component),
                },
                Component::RootDir | Component::Prefix(_) => {
                    out.clear();
                    out.push(component);
                }
                Component::Normal(_) => out.push(component),
            }
        }
    }
    out.iter().collect()
}

/// Splunk's boolean spellings.
fn is_true(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "t" | "yes" | "y" | "on"
    )
}

/// Host part of a `SPLUNK_BINDIP` value.
fn bind_host(value: &str) -> String {
    let value = value.trim();
    if let Some(rest) = value.strip_prefix('[') {
        // `[v6]` or `[v6]:port`
        if let Some((host, _)) = rest.split_once(']') {
            return host.to_string();
        }
    }
    match value.matches(':').count() {
        // `v4:port` or `name:port`; a bare IPv6 address has several colons.
        1 => value
            .split_once(':')
            .map(|(host, _)| host.to_string())
            .unwrap_or_default(),
        _ => value.to_string(),
    }
}

fn split_host_port(value: &str) -> Result<(String, u16), EnvError> {
    let invalid = || EnvError::InvalidHostPort(value.to_string());
    let (host, port) = value.trim().rsplit_once(':').ok_or_else(invalid)?;
    let port = port.parse().map_err(|_| invalid())?;
    let host = host.trim_start_matches('[').trim_end_matches(']');
    if host.is_empty() {
        return Err(invalid());
    }
    Ok((host.to_string(), port))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
