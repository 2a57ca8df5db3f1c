//! Parser for Splunk `.conf` and `.meta` files.
//!
//! Both file kinds are INI-like:
//!
//! ```text
//! # comment
//! [savedsearches/Errors in the last hour]
//! access = read : [ * ], write : [ admin ]
//! modtime = 1476731234.123456
//! ```
//!
//! Section headers are looser than a standard INI grammar: everything between
//! `[` and the first `]` is the header, so `/`, spaces and punctuation are all
//! allowed.  `.meta` files rely on this to encode `category/stanza` pairs.
//!
//! # Value shape
//!
//! Every value is a single `String`.  A value that spans several lines (the
//! continuation lines start with whitespace) is joined with `\n`; the parser
//! never returns a list.  When an option appears twice in the same section,
//! the last occurrence wins.

use std::collections::BTreeMap;

use thiserror::Error;

/// Errors raised while parsing `.conf` text.
#[derive(Debug, Error, PartialEq)]
pub enum ConfParseError {
    /// An option line appeared before any `[section]` header.
    #[error("line {line}: option outside of any section: {text:?}")]
    MissingSectionHeader { line: usize, text: String },

    /// A line that is neither a header, an option, a comment nor a continuation.
    #[error("line {line}: cannot parse {text:?}")]
    Malformed { line: usize, text: String },
}

/// The option/value pairs of one `[section]`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfSection {
    options: BTreeMap<String, String>,
}

impl ConfSection {
    /// Returns the value of `option`, matched case-insensitively.
    pub fn get(&self, option: &str) -> Option<&str> {
        self.options
            .get(&option.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Iterates over `(option, value)` pairs in option-name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.options.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.options.len()
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }
}

/// A parsed `.conf` file: section name to [`ConfSection`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfFile {
    sections: BTreeMap<String, ConfSection>,
}

impl ConfFile {
    /// Parses `.conf` text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfParseError`] on the first line that cannot be parsed.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use solnlib_core::conf::ConfFile;
    ///
    /// let conf = ConfFile::parse("[props/access_combined]\nexport = system\n").unwrap();
    /// assert_eq!(conf.get("props/access_combined", "export"), Some("system"));
    /// ```
    pub fn parse(text: &str) -> Result<Self, ConfParseError> {
        let mut sections: BTreeMap<String, ConfSection> = BTreeMap::new();
        let mut current: Option<String> = None;
        // Option that continuation lines are appended to.
        let mut last_option: Option<String> = None;

        for (idx, raw) in text.lines().enumerate() {
            let line_no = idx + 1;
            let trimmed = raw.trim();

            if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with(';') {
                continue;
            }

            let is_continuation = raw.starts_with(|c: char| c.is_whitespace());
            if is_continuation {
                if let (Some(section), Some(option)) = (&current, &last_option) {
                    if let Some(value) = sections
                        .get_mut(section)
                        .and_then(|s| s.options.get_mut(option))
                    {
                        value.push('\n');
                        value.push_str(trimmed);
                        continue;
                    }
                }
            }

            if let Some(header) = parse_header(trimmed) {
                sections.entry(header.to_string()).or_default();
                current = Some(header.to_string());
                last_option = None;
                continue;
            }

            let Some((name, value)) = parse_option(trimmed) else {
                return Err(ConfParseError::Malformed {
                    line: line_no,
                    text: raw.to_string(),
                });
            };

            let Some(section) = &current else {
                return Err(ConfParseError::MissingSectionHeader {
                    line: line_no,
                    text: raw.to_string(),
                });
            };

            let section = sections.entry(section.clone()).or_default();
            section.options.insert(name.clone(), value);
            last_option = Some(name);
        }

        Ok(Self { sections })
    }

    /// Returns the named section, if present.
    pub fn section(&self, name: &str) -> Option<&ConfSection> {
        self.sections.get(name)
    }

    /// Returns `option` in `section`, if both exist.
    pub fn get(&self, section: &str, option: &str) -> Option<&str> {
        self.section(section).and_then(|s| s.get(option))
    }

    pub fn has_section(&self, name: &str) -> bool {
        self.sections.contains_key(name)
    }

    /// Section names in sorted order.
    pub fn section_names(&self) -> impl Iterator<Item = &str> {
        self.sections.keys().map(String::as_str)
    }
}

/// `[anything but a closing bracket]`, trailing text after `]` is ignored.
fn parse_header(line: &str) -> Option<&str> {
    let rest = line.strip_prefix('[')?;
    let end = rest.find(']')?;
    Some(&rest[..end])
}

/// Splits `name = value` or `name : value` at the first separator.
fn parse_option(line: &str) -> Option<(String, String)> {
    let sep = line.find(|c| c == '=' || c == ':')?;
    let name = line[..sep].trim();
    if name.is_empty() {
        return None;
    }
    let value = strip_inline_comment(line[sep + 1..].trim());
    Some((name.to_ascii_lowercase(), value.to_string()))
}

/// Drops a ` ;comment` suffix.  A `;` not preceded by whitespace is kept.
fn strip_inline_comment(value: &str) -> &str {
    let bytes = value.as_bytes();
    for (i, b) in bytes.iter().enumerate() {
        if *b == b';' && i > 0 && bytes[i - 1].is_ascii_whitespace() {
            return value[..i].trim_end();
        }
    }
    value
}

// ── Tests ─────────────────────────────────────────────────────────────────────
