//! # Template Module
//!
//! Derives the new name for a file from its hash.
//!
//! A template is a plain string with up to four placeholders:
//!
//! | Placeholder | Replaced with                              |
//! |-------------|--------------------------------------------|
//! | `{path}`    | directory of the original file             |
//! | `{name}`    | file name without extension                |
//! | `{hash}`    | the computed hash                          |
//! | `{ext}`     | extension including the dot (may be empty) |
//!
//! Substitution is literal and happens in a single left-to-right pass:
//! substituted text is never rescanned, braces cannot be escaped, and
//! anything that is not one of the four placeholders is copied through
//! unchanged. `{size}` in a template stays `{size}` in the result.
//!
//! ## Example
//! ```rust
//! use imagehash_cli::core::template::{derive_name, Template};
//!
//! assert_eq!(derive_name("/photos/IMG_001.jpg", "ff00", None), "/photos/ff00.jpg");
//!
//! let template = Template::new("/sorted/{name}-{hash}{ext}");
//! assert_eq!(
//!     derive_name("/photos/IMG_001.jpg", "ff00", Some(&template)),
//!     "/sorted/IMG_001-ff00.jpg"
//! );
//! ```

use serde::{Deserialize, Serialize};

/// Template used when none is given
pub const DEFAULT_TEMPLATE: &str = "{path}/{hash}{ext}";

/// An original path split into directory, stem and extension
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathParts<'a> {
    pub directory: &'a str,
    pub stem: &'a str,
    pub extension: &'a str,
}

impl<'a> PathParts<'a> {
    /// Split at the last separator and at the last dot of the basename.
    ///
    /// A basename that only has leading dots (`.bashrc`) has no extension.
    /// Runs of separators between directory and basename are dropped from
    /// the directory unless the directory is nothing but separators (`/`).
    pub fn split(path: &'a str) -> Self {
        let (directory, basename) = match path.rfind(is_separator) {
            Some(index) => {
                let head = &path[..index + 1];
                let trimmed = head.trim_end_matches(is_separator);
                let directory = if trimmed.is_empty() { head } else { trimmed };
                (directory, &path[index + 1..])
            }
            None => ("", path),
        };

        let (stem, extension) = match basename.rfind('.') {
            Some(dot) if basename[..dot].chars().any(|c| c != '.') => {
                (&basename[..dot], &basename[dot..])
            }
            _ => (basename, ""),
        };

        Self {
            directory,
            stem,
            extension,
        }
    }
}

/// A rename template, checked only when it is rendered
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Template(String);

impl Template {
    pub fn new(template: impl Into<String>) -> Self {
        Self(template.into())
    }

    /// Substitute the placeholders in one pass.
    pub fn render(&self, parts: &PathParts<'_>, hash: &str) -> String {
        let mut output = String::with_capacity(self.0.len() + hash.len() + parts.directory.len());
        let mut rest = self.0.as_str();

        while let Some(open) = rest.find('{') {
            output.push_str(&rest[..open]);
            let candidate = &rest[open..];

            let replacement = [
                ("{path}", parts.directory),
                ("{name}", parts.stem),
                ("{hash}", hash),
                ("{ext}", parts.extension),
            ]
            .into_iter()
            .find(|(placeholder, _)| candidate.starts_with(placeholder));

            match replacement {
                Some((placeholder, value)) => {
                    output.push_str(value);
                    rest = &candidate[placeholder.len()..];
                }
                None => {
                    output.push('{');
                    rest = &candidate[1..];
                }
            }
        }

        output.push_str(rest);
        output
    }
}

impl Default for Template {
    fn default() -> Self {
        Self::new(DEFAULT_TEMPLATE)
    }
}

impl std::fmt::Display for Template {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Template {
    fn from(template: &str) -> Self {
        Self::new(template)
    }
}

impl From<String> for Template {
    fn from(template: String) -> Self {
        Self(template)
    }
}

/// Work out the new path for `original_path` given its hash.
///
/// Without a template the file keeps its directory and extension and only
/// the name is replaced by the hash (`{path}/{hash}{ext}`). The default
/// joins like a path: a file with no directory stays relative (`a.jpg`
/// becomes `HASH.jpg`, not `/HASH.jpg`) and a root directory is not
/// doubled.
pub fn derive_name(original_path: &str, hash: &str, template: Option<&Template>) -> String {
    let parts = PathParts::split(original_path);

    match template {
        Some(template) => template.render(&parts, hash),
        None => {
            let mut name = String::with_capacity(original_path.len() + hash.len());
            if !parts.directory.is_empty() {
                name.push_str(parts.directory);
                if !parts.directory.ends_with(is_separator) {
                    name.push('/');
                }
            }
            name.push_str(hash);
            name.push_str(parts.extension);
            name
        }
    }
}

fn is_separator(c: char) -> bool {
    c == '/' || std::path::is_separator(c)
}
