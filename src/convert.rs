//! Conversion entry points.
//!
//! [`convert`] runs the whole pipeline for one resource directory and returns
//! the document in memory; [`convert_to_file`] additionally writes it into a
//! target directory. [`inspect`] stops after parsing
//! and reports what a conversion would contain.

use crate::config::ConversionConfig;
use crate::error::{Diagnostic, Diagnostics, Tex2DtxError};
use crate::metadata::PackageMetadata;
use crate::model::{Command, Sections};
use crate::output::{ConversionOutput, ConversionStats, SectionSummary};
use crate::pipeline::assemble::DocumentAssembler;
use crate::pipeline::input::{self, ResourceEntry};
use crate::pipeline::{classify, command};
use crate::templates::TemplateSet;
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info};

/// Result of [`inspect`]: what a conversion would produce, without the
/// rendered document.
#[derive(Debug, Clone, Serialize)]
pub struct Inspection {
    pub metadata: PackageMetadata,
    pub file_name: String,
    pub sections: Vec<SectionSummary>,
    pub diagnostics: Vec<Diagnostic>,
    pub stats: ConversionStats,
}

/// Convert a resource directory to a `.dtx` document.
///
/// This is the primary entry point for the library.
///
/// # Returns
/// `Ok(ConversionOutput)` whenever every file could be read, even if the
/// sources contain irregular annotations (see `output.diagnostics`).
///
/// # Errors
/// Returns `Err(Tex2DtxError)` only for fatal errors:
/// - Resource directory missing or not a directory
/// - A source, fragment, template or configuration file cannot be read
pub fn convert(
    resource_dir: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<ConversionOutput, Tex2DtxError> {
    let total_start = Instant::now();
    let resource_dir = resource_dir.as_ref();
    info!("Starting conversion: {}", resource_dir.display());

    let mut diagnostics = Diagnostics::new();
    let loaded = load(resource_dir, config, &mut diagnostics)?;

    // ── Step 5: Assemble ─────────────────────────────────────────────────
    let assembler = DocumentAssembler::new(loaded.metadata.clone())
        .with_templates(loaded.templates)
        .with_fragments(loaded.fragments);
    let document = assembler.assemble(&loaded.sections, &mut diagnostics);

    // ── Step 6: Stats ────────────────────────────────────────────────────
    let mut stats = loaded.stats;
    stats.warnings = diagnostics.warning_count();
    stats.total_duration_ms = total_start.elapsed().as_millis() as u64;

    info!(
        "Conversion complete: {} sections, {} commands ({} private), {} warnings, {}ms",
        stats.sections,
        stats.public_commands + stats.private_commands,
        stats.private_commands,
        stats.warnings,
        stats.total_duration_ms
    );

    if let Some(ref cb) = config.progress_callback {
        cb.on_conversion_complete(stats.total_files, stats.source_files);
    }

    Ok(ConversionOutput {
        document,
        file_name: loaded.metadata.output_file_name(),
        metadata: assembler.metadata(),
        sections: SectionSummary::from_sections(&loaded.sections),
        diagnostics: diagnostics.into_vec(),
        stats,
    })
}

/// Convert a resource directory and write `<pkg_name>.dtx` into `target_dir`.
///
/// Uses atomic write (temp file in `target_dir` + rename) so a failed run
/// never leaves a truncated document behind. Returns the written path and
/// the full output.
pub fn convert_to_file(
    resource_dir: impl AsRef<Path>,
    target_dir: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<(PathBuf, ConversionOutput), Tex2DtxError> {
    let output = convert(resource_dir, config)?;
    let target_dir = target_dir.as_ref();
    let path = target_dir.join(&output.file_name);
    write_atomic(&path, &output.document)?;
    info!("Wrote {} ({} bytes)", path.display(), output.document.len());
    Ok((path, output))
}

/// Parse a resource directory without rendering the document.
pub fn inspect(
    resource_dir: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<Inspection, Tex2DtxError> {
    let mut diagnostics = Diagnostics::new();
    let loaded = load(resource_dir.as_ref(), config, &mut diagnostics)?;

    let mut stats = loaded.stats;
    stats.warnings = diagnostics.warning_count();

    if let Some(ref cb) = config.progress_callback {
        cb.on_conversion_complete(stats.total_files, stats.source_files);
    }

    Ok(Inspection {
        file_name: loaded.metadata.output_file_name(),
        metadata: loaded.metadata,
        sections: SectionSummary::from_sections(&loaded.sections),
        diagnostics: diagnostics.into_vec(),
        stats,
    })
}

/// Classify and parse one source text.
///
/// `source` names the text in diagnostics (usually the file name).
pub fn parse_source(text: &str, source: &str, diagnostics: &mut Diagnostics) -> Vec<Command> {
    parse_source_lines(&classify::split_lines(text), source, diagnostics)
}

/// Write `contents` to `path` through a temporary file in the same directory.
pub fn write_atomic(path: &Path, contents: &str) -> Result<(), Tex2DtxError> {
    let write_failed = |e: std::io::Error| Tex2DtxError::OutputWriteFailed {
        path: path.to_path_buf(),
        source: e,
    };

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    std::fs::create_dir_all(&dir).map_err(write_failed)?;

    let mut tmp = tempfile::NamedTempFile::new_in(&dir).map_err(write_failed)?;
    tmp.write_all(contents.as_bytes()).map_err(write_failed)?;
    tmp.persist(path).map_err(|e| write_failed(e.error))?;
    Ok(())
}

// ── Internal helpers ─────────────────────────────────────────────────────

/// Everything read from disk for one run.
struct Loaded {
    metadata: PackageMetadata,
    templates: TemplateSet,
    fragments: input::AuxFragments,
    sections: Sections,
    stats: ConversionStats,
}

/// Steps 1–4: resolve, metadata, templates and fragments, sources.
fn load(
    resource_dir: &Path,
    config: &ConversionConfig,
    diagnostics: &mut Diagnostics,
) -> Result<Loaded, Tex2DtxError> {
    // ── Step 1: Resolve input ────────────────────────────────────────────
    let dir = input::resolve_resource_dir(resource_dir)?;

    // ── Step 2: Metadata ─────────────────────────────────────────────────
    let today = config.today();
    let mut metadata = PackageMetadata::with_date(today);
    if let Some(text) = input::read_optional(&dir.join(&config.package_config))? {
        debug!("Applying {}", config.package_config);
        metadata.apply_config(&text, today);
    }
    metadata.apply_overrides(
        config
            .metadata_overrides
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str())),
        today,
    );
    info!(
        "Package '{}' v{} ({})",
        metadata.name(),
        metadata.version(),
        metadata.date()
    );

    // ── Step 3: Templates and fragments ──────────────────────────────────
    let templates = match config.template_dir {
        Some(ref tdir) => TemplateSet::load_dir(tdir, diagnostics)?,
        None => TemplateSet::default(),
    };
    let fragments = input::read_fragments(&dir.join(&config.docu_dir), diagnostics)?;

    // ── Step 4: Sources ──────────────────────────────────────────────────
    let entries = input::list_entries(&dir)?;
    let total = entries.len();
    debug!("{} entries in {}", total, dir.display());

    if let Some(ref cb) = config.progress_callback {
        cb.on_conversion_start(total);
    }

    let mut sections = Sections::new();
    let mut stats = ConversionStats {
        total_files: total,
        ..Default::default()
    };

    for (i, path) in entries.iter().enumerate() {
        let index = i + 1;
        match input::read_entry(path, &config.extension, diagnostics)? {
            ResourceEntry::Source(src) => {
                let commands = parse_source_lines(&src.lines, &src.name, diagnostics);
                debug!(
                    "{} → section '{}': {} commands",
                    src.name,
                    src.section,
                    commands.len()
                );
                if let Some(ref cb) = config.progress_callback {
                    cb.on_file_complete(index, total, &src.name, commands.len());
                }
                stats.source_files += 1;
                sections.insert(src.section, commands);
            }
            ResourceEntry::Other { name } => {
                diagnostics.push(Diagnostic::SkippedFile {
                    name: name.clone(),
                    extension: config.extension.clone(),
                });
                if let Some(ref cb) = config.progress_callback {
                    cb.on_file_skipped(index, total, &name);
                }
                stats.skipped_files += 1;
            }
        }
    }

    stats.sections = sections.len();
    for cmd in sections.iter().flat_map(|s| s.commands.iter()) {
        if cmd.is_private {
            stats.private_commands += 1;
        } else {
            stats.public_commands += 1;
        }
        stats.todos += cmd.todos.len();
    }

    Ok(Loaded {
        metadata,
        templates,
        fragments,
        sections,
        stats,
    })
}

fn parse_source_lines(
    lines: &[String],
    source: &str,
    diagnostics: &mut Diagnostics,
) -> Vec<Command> {
    classify::classify(lines, source, diagnostics)
        .iter()
        .map(|block| command::parse(block, diagnostics))
        .collect()
}
