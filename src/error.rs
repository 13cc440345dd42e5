//! Error types for the tex2dtx library.
//!
//! Two distinct types reflect two distinct failure modes:
//!
//! * [`Tex2DtxError`] — **Fatal**: the run cannot proceed at all (resource
//!   directory missing, a file cannot be read, the output cannot be written).
//!   Only the file layer returns it; the parsing and rendering core never does.
//!
//! * [`Diagnostic`] — **Non-fatal**: a line could not be classified, a
//!   parameter reference points nowhere, an auxiliary fragment is missing.
//!   Processing continues with a documented fallback and the diagnostic is
//!   collected into a [`Diagnostics`] sink so callers can report or assert on
//!   it after the run.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;
use tracing::{debug, warn};

/// All fatal errors returned by the tex2dtx library.
///
/// Recoverable anomalies use [`Diagnostic`] and are returned inside
/// [`crate::output::ConversionOutput`] rather than propagated here.
#[derive(Debug, Error)]
pub enum Tex2DtxError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// The resource directory does not exist.
    #[error("Resource directory not found: '{path}'\nCheck the path exists and is readable.")]
    ResourceDirNotFound { path: PathBuf },

    /// The resource path exists but is a file.
    #[error("Resource path is not a directory: '{path}'")]
    NotADirectory { path: PathBuf },

    /// A directory listing or file read failed.
    #[error("Failed to read '{path}': {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Output errors ─────────────────────────────────────────────────────
    /// Could not create or write the output `.dtx` file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// How loudly a [`Diagnostic`] should be reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Expected in normal input; logged at debug level.
    Info,
    /// Probably a mistake in the annotated sources.
    Warning,
}

/// A recoverable anomaly found while converting.
///
/// Every variant carries enough location information (file, line or
/// command name) to point the author at the offending annotation.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    /// A non-blank line outside any comment, banner or command block.
    #[error("{file}:{line}: unprocessed line: {text}")]
    UnprocessedLine {
        file: String,
        line: usize,
        text: String,
    },

    /// Input ended while a command block was still open; the block is dropped.
    #[error("{file}:{line}: command block opened here is never closed and was dropped")]
    UnterminatedBlock { file: String, line: usize },

    /// A definition line without a recognisable macro name.
    #[error("{file}: definition line has no macro name, using 'unknown': {text}")]
    MissingCommandName { file: String, text: String },

    /// A `% #N` line that does not match `#N label, description`.
    #[error("{file}: malformed parameter line in '{command}': {text}")]
    MalformedParameter {
        file: String,
        command: String,
        text: String,
    },

    /// The macro declares a default value but no parameter is annotated.
    #[error("'{command}' declares a default value but documents no parameters")]
    MissingOptionalParameter { command: String },

    /// A `#N` reference beyond the documented parameters.
    #[error("'{command}': parameter #{index} out of range ({available} documented)")]
    ParameterOutOfRange {
        command: String,
        index: usize,
        available: usize,
    },

    /// An auxiliary fragment file is absent; it contributes empty text.
    #[error("fragment '{path}' does not exist")]
    MissingFragment { path: PathBuf },

    /// A template file is absent; it contributes empty text.
    #[error("template '{path}' does not exist")]
    MissingTemplate { path: PathBuf },

    /// A resource entry that is not a source file.
    #[error("skipped '{name}': not a .{extension} file")]
    SkippedFile { name: String, extension: String },

    /// A source file name without an `_`-delimited section token.
    #[error("'{name}' has no '_' section token, using '{section}'")]
    SectionNameFallback { name: String, section: String },
}

impl Diagnostic {
    pub fn severity(&self) -> Severity {
        match self {
            Diagnostic::SkippedFile { .. } | Diagnostic::UnprocessedLine { .. } => Severity::Info,
            _ => Severity::Warning,
        }
    }
}

/// Collects diagnostics for one run and mirrors each one to `tracing`.
#[derive(Debug, Default, Clone)]
pub struct Diagnostics {
    items: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        match diagnostic.severity() {
            Severity::Info => debug!("{}", diagnostic),
            Severity::Warning => warn!("{}", diagnostic),
        }
        self.items.push(diagnostic);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
        self.items.iter()
    }

    /// Number of diagnostics at [`Severity::Warning`].
    pub fn warning_count(&self) -> usize {
        self.items
            .iter()
            .filter(|d| d.severity() == Severity::Warning)
            .count()
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.items
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_range_display() {
        let e = Diagnostic::ParameterOutOfRange {
            command: "addv".into(),
            index: 2,
            available: 1,
        };
        let msg = e.to_string();
        assert!(msg.contains("addv"), "got: {msg}");
        assert!(msg.contains("#2"), "got: {msg}");
    }

    #[test]
    fn unprocessed_line_is_info() {
        let d = Diagnostic::UnprocessedLine {
            file: "a_b.tex".into(),
            line: 3,
            text: "stray".into(),
        };
        assert_eq!(d.severity(), Severity::Info);
        assert!(d.to_string().starts_with("a_b.tex:3:"));
    }

    #[test]
    fn sink_counts_warnings() {
        let mut sink = Diagnostics::new();
        sink.push(Diagnostic::SkippedFile {
            name: "notes.txt".into(),
            extension: "tex".into(),
        });
        sink.push(Diagnostic::MissingOptionalParameter {
            command: "foo".into(),
        });
        assert_eq!(sink.len(), 2);
        assert_eq!(sink.warning_count(), 1);
    }

    #[test]
    fn read_failed_display() {
        let e = Tex2DtxError::ReadFailed {
            path: PathBuf::from("/tmp/x.tex"),
            source: std::io::Error::new(std::io::ErrorKind::Other, "boom"),
        };
        assert!(e.to_string().contains("x.tex"));
        assert!(e.to_string().contains("boom"));
    }

    #[test]
    fn diagnostic_serialises_with_kind_tag() {
        let d = Diagnostic::MissingCommandName {
            file: "m_x.tex".into(),
            text: "\\newcommand{}".into(),
        };
        let json = serde_json::to_string(&d).unwrap();
        assert!(json.contains("\"kind\":\"missing_command_name\""), "got: {json}");
    }
}
