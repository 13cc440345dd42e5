//! Result types returned by a conversion run.

use crate::error::Diagnostic;
use crate::metadata::PackageMetadata;
use crate::model::Sections;
use serde::{Deserialize, Serialize};

/// Everything one run produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionOutput {
    /// The assembled `.dtx` document.
    pub document: String,
    /// `<pkg_name>.dtx`.
    pub file_name: String,
    /// Metadata after defaults, configuration file and overrides.
    pub metadata: PackageMetadata,
    pub sections: Vec<SectionSummary>,
    pub diagnostics: Vec<Diagnostic>,
    pub stats: ConversionStats,
}

/// Per-section overview, in document order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionSummary {
    pub key: String,
    /// Public commands, in document order.
    pub commands: Vec<String>,
    /// Private commands, in implementation order.
    pub private_commands: Vec<String>,
}

impl SectionSummary {
    pub fn from_sections(sections: &Sections) -> Vec<SectionSummary> {
        sections
            .iter()
            .map(|s| SectionSummary {
                key: s.key.clone(),
                commands: s
                    .commands
                    .iter()
                    .filter(|c| !c.is_private)
                    .map(|c| c.name.clone())
                    .collect(),
                private_commands: s
                    .commands
                    .iter()
                    .filter(|c| c.is_private)
                    .map(|c| c.name.clone())
                    .collect(),
            })
            .collect()
    }
}

/// Counters for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionStats {
    /// Entries in the resource directory.
    pub total_files: usize,
    /// Entries parsed as source files.
    pub source_files: usize,
    /// Entries skipped (other extensions, subdirectories).
    pub skipped_files: usize,
    pub sections: usize,
    pub public_commands: usize,
    pub private_commands: usize,
    /// Open TODO annotations across all commands.
    pub todos: usize,
    pub warnings: usize,
    pub total_duration_ms: u64,
}
