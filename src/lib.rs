//! # tex2dtx
//!
//! Turn a directory of annotated LaTeX macro sources into a single docstrip
//! `.dtx` package document.
//!
//! ## What it does
//!
//! Each source file holds `\newcommand` definitions preceded by `% ` comment
//! annotations (description, `#N` parameters, equation, example, error and
//! TODO notes, a `Private` marker). tex2dtx parses those annotations and
//! writes two views of every macro: a documentation part with summary tables
//! and boxed descriptions, and an implementation part wrapping the macro code
//! in `macrocode` environments. Package metadata (`pkg_name`, `pkg_author`,
//! …) fills the `<KEY>` tokens of the header templates.
//!
//! ## Pipeline Overview
//!
//! ```text
//! resource dir
//!  │
//!  ├─ 1. Input     list entries, section key from file name, read docu/ fragments
//!  ├─ 2. Classify  line state machine → command blocks
//!  ├─ 3. Parse     block → Command (name, params, default, annotations, body)
//!  ├─ 4. Assemble  header templates + documentation + implementation
//!  │               (#N references resolved by the substitutor)
//!  └─ 5. Output    <pkg_name>.dtx + diagnostics + stats
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use tex2dtx::{convert, ConversionConfig};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ConversionConfig::builder()
//!         .metadata_override("pkg_name", "glmatrix")
//!         .build()?;
//!     let output = convert("resources", &config)?;
//!     println!("{}", output.document);
//!     for d in &output.diagnostics {
//!         eprintln!("warning: {d}");
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `tex2dtx` binary (clap, anyhow, tracing-subscriber, indicatif, serde_json) |
//!
//! Disable `cli` when using only the library to avoid pulling in CLI-only deps:
//! ```toml
//! tex2dtx = { version = "0.3", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod error;
pub mod metadata;
pub mod model;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod templates;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ConversionConfig, ConversionConfigBuilder};
pub use convert::{convert, convert_to_file, inspect, parse_source, Inspection};
pub use error::{Diagnostic, Diagnostics, Severity, Tex2DtxError};
pub use metadata::PackageMetadata;
pub use model::{Block, BlockKind, Command, Param, Section, Sections};
pub use output::{ConversionOutput, ConversionStats, SectionSummary};
pub use pipeline::assemble::DocumentAssembler;
pub use progress::{
    ConversionProgressCallback, NoopProgressCallback, ProgressCallback, ProgressCounter,
};
pub use templates::TemplateSet;
