//! Input resolution: resource directory → source files and fragments.
//!
//! A resource directory looks like this:
//!
//! ```text
//! resources/
//! ├── glm_matrix.tex            → section "matrix"
//! ├── glm_vector.tex            → section "vector"
//! ├── package_config.txt        → metadata overrides (optional)
//! └── docu/
//!     ├── pkg_packages.tex                 → <PKG_PACKAGES>
//!     ├── docu_packages_and_settings.tex   → spliced verbatim
//!     ├── introduction.tex                 → <PKG_INTRODUCTION>
//!     └── example.tex                      → <PKG_EXAMPLE>
//! ```
//!
//! Entries are visited in file-name order so the section order of the
//! generated document does not depend on the file system.

use crate::error::{Diagnostic, Diagnostics, Tex2DtxError};
use crate::pipeline::classify::split_lines;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const PACKAGE_LIST_FRAGMENT: &str = "pkg_packages.tex";
pub const SETTINGS_FRAGMENT: &str = "docu_packages_and_settings.tex";
pub const INTRODUCTION_FRAGMENT: &str = "introduction.tex";
pub const EXAMPLE_FRAGMENT: &str = "example.tex";

/// One entry of the resource directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceEntry {
    /// A source file to classify.
    Source(SourceFile),
    /// Anything else (subdirectories, config, notes); counted, not parsed.
    Other { name: String },
}

/// A source file read into lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub name: String,
    pub path: PathBuf,
    pub section: String,
    pub lines: Vec<String>,
}

/// Auxiliary text spliced into the document header.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuxFragments {
    /// `\RequirePackage` lines of the generated package.
    pub packages: String,
    /// Documentation-only packages and settings, inserted verbatim.
    pub settings: String,
    pub introduction: String,
    pub example: String,
}

/// Validate that `dir` is an existing directory.
pub fn resolve_resource_dir(dir: &Path) -> Result<PathBuf, Tex2DtxError> {
    if !dir.exists() {
        return Err(Tex2DtxError::ResourceDirNotFound {
            path: dir.to_path_buf(),
        });
    }
    if !dir.is_dir() {
        return Err(Tex2DtxError::NotADirectory {
            path: dir.to_path_buf(),
        });
    }
    Ok(dir.to_path_buf())
}

/// List the directory's entries sorted by file name.
pub fn list_entries(dir: &Path) -> Result<Vec<PathBuf>, Tex2DtxError> {
    let read_failed = |e| Tex2DtxError::ReadFailed {
        path: dir.to_path_buf(),
        source: e,
    };
    let mut entries = std::fs::read_dir(dir)
        .map_err(read_failed)?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<Result<Vec<_>, _>>()
        .map_err(read_failed)?;
    entries.sort();
    Ok(entries)
}

/// Section key of a source file: the second `_`-delimited token of its stem.
///
/// `glm_matrix.tex` → `matrix`, `a_b_c.tex` → `b`. Returns `None` when the
/// stem has no second token.
pub fn section_key(stem: &str) -> Option<&str> {
    stem.split('_').nth(1)
}

/// Read one resource entry. Files with the `extension` are read into lines;
/// everything else is returned as [`ResourceEntry::Other`].
pub fn read_entry(
    path: &Path,
    extension: &str,
    diagnostics: &mut Diagnostics,
) -> Result<ResourceEntry, Tex2DtxError> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let is_source = path.is_file()
        && path
            .extension()
            .is_some_and(|ext| ext.to_string_lossy() == extension);
    if !is_source {
        return Ok(ResourceEntry::Other { name });
    }

    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let section = match section_key(&stem) {
        Some(key) => key.to_string(),
        None => {
            diagnostics.push(Diagnostic::SectionNameFallback {
                name: name.clone(),
                section: stem.clone(),
            });
            stem.clone()
        }
    };

    let text = std::fs::read_to_string(path).map_err(|e| Tex2DtxError::ReadFailed {
        path: path.to_path_buf(),
        source: e,
    })?;
    debug!("Read {} ({} bytes) → section '{}'", name, text.len(), section);

    Ok(ResourceEntry::Source(SourceFile {
        name,
        path: path.to_path_buf(),
        section,
        lines: split_lines(&text),
    }))
}

/// Read an optional text file. Missing → `Ok(None)`.
pub fn read_optional(path: &Path) -> Result<Option<String>, Tex2DtxError> {
    if !path.is_file() {
        return Ok(None);
    }
    std::fs::read_to_string(path)
        .map(Some)
        .map_err(|e| Tex2DtxError::ReadFailed {
            path: path.to_path_buf(),
            source: e,
        })
}

/// Read the four auxiliary fragments from `docu_dir`.
///
/// Each missing fragment is reported as [`Diagnostic::MissingFragment`] and
/// left empty.
pub fn read_fragments(
    docu_dir: &Path,
    diagnostics: &mut Diagnostics,
) -> Result<AuxFragments, Tex2DtxError> {
    let mut read = |name: &str| -> Result<String, Tex2DtxError> {
        let path = docu_dir.join(name);
        match read_optional(&path)? {
            Some(text) => Ok(text),
            None => {
                diagnostics.push(Diagnostic::MissingFragment { path });
                Ok(String::new())
            }
        }
    };

    Ok(AuxFragments {
        packages: read(PACKAGE_LIST_FRAGMENT)?,
        settings: read(SETTINGS_FRAGMENT)?,
        introduction: read(INTRODUCTION_FRAGMENT)?,
        example: read(EXAMPLE_FRAGMENT)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_section_key() {
        assert_eq!(section_key("glm_matrix"), Some("matrix"));
        assert_eq!(section_key("a_b_c"), Some("b"));
        assert_eq!(section_key("_lead"), Some("lead"));
        assert_eq!(section_key("plain"), None);
    }

    #[test]
    fn test_resolve_missing_dir() {
        let err = resolve_resource_dir(Path::new("/definitely/not/here")).unwrap_err();
        assert!(matches!(err, Tex2DtxError::ResourceDirNotFound { .. }));
    }

    #[test]
    fn test_resolve_file_is_not_dir() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let err = resolve_resource_dir(file.path()).unwrap_err();
        assert!(matches!(err, Tex2DtxError::NotADirectory { .. }));
    }

    #[test]
    fn test_read_entry_kinds() {
        let dir = tempfile::tempdir().unwrap();
        let tex = dir.path().join("glm_vector.tex");
        let txt = dir.path().join("notes.txt");
        std::fs::write(&tex, "\\newcommand\\v{x\n}\n").unwrap();
        std::fs::write(&txt, "hello").unwrap();

        let mut diags = Diagnostics::new();
        match read_entry(&tex, "tex", &mut diags).unwrap() {
            ResourceEntry::Source(src) => {
                assert_eq!(src.section, "vector");
                assert_eq!(src.lines, vec!["\\newcommand\\v{x\n", "}\n"]);
            }
            other => panic!("expected source, got {other:?}"),
        }
        assert_eq!(
            read_entry(&txt, "tex", &mut diags).unwrap(),
            ResourceEntry::Other {
                name: "notes.txt".into()
            }
        );
        assert!(diags.is_empty());
    }

    #[test]
    fn test_section_fallback_is_diagnosed() {
        let dir = tempfile::tempdir().unwrap();
        let tex = dir.path().join("vector.tex");
        std::fs::write(&tex, "").unwrap();
        let mut diags = Diagnostics::new();
        match read_entry(&tex, "tex", &mut diags).unwrap() {
            ResourceEntry::Source(src) => assert_eq!(src.section, "vector"),
            other => panic!("expected source, got {other:?}"),
        }
        assert_eq!(diags.len(), 1);
    }

    #[test]
    fn test_entries_sorted() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["c_z.tex", "a_x.tex", "b_y.tex"] {
            std::fs::write(dir.path().join(name), "").unwrap();
        }
        let names: Vec<_> = list_entries(dir.path())
            .unwrap()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, ["a_x.tex", "b_y.tex", "c_z.tex"]);
    }

    #[test]
    fn test_missing_fragments_are_empty() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(INTRODUCTION_FRAGMENT), "Intro\n").unwrap();
        let mut diags = Diagnostics::new();
        let f = read_fragments(dir.path(), &mut diags).unwrap();
        assert_eq!(f.introduction, "Intro\n");
        assert!(f.packages.is_empty());
        assert_eq!(diags.len(), 3);
    }
}
