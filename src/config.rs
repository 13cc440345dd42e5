//! Configuration for a tex2dtx conversion run.
//!
//! All conversion behaviour is controlled through [`ConversionConfig`], built
//! via its [`ConversionConfigBuilder`]. The defaults match the conventional
//! resource layout (`*.tex` sources, a `docu/` fragment directory and an
//! optional `package_config.txt`), so most callers only set what differs.

use crate::error::Tex2DtxError;
use crate::progress::ProgressCallback;
use chrono::NaiveDate;
use std::fmt;
use std::path::PathBuf;

pub const DEFAULT_EXTENSION: &str = "tex";
pub const DEFAULT_DOCU_DIR: &str = "docu";
pub const DEFAULT_PACKAGE_CONFIG: &str = "package_config.txt";

/// Configuration for a conversion run.
///
/// # Example
/// ```rust
/// use tex2dtx::ConversionConfig;
///
/// let config = ConversionConfig::builder()
///     .metadata_override("pkg_name", "glmatrix")
///     .metadata_override("pkg_author", "Jane Doe")
///     .build()
///     .unwrap();
/// assert_eq!(config.extension, "tex");
/// ```
#[derive(Clone)]
pub struct ConversionConfig {
    /// Directory holding the six header templates. If None, the built-in
    /// templates are used.
    pub template_dir: Option<PathBuf>,

    /// Subdirectory of the resource directory holding the auxiliary
    /// fragments. Default: `docu`.
    pub docu_dir: String,

    /// File name of the `key=value` package configuration inside the
    /// resource directory. Default: `package_config.txt`.
    pub package_config: String,

    /// Extension (without dot) of the annotated source files. Default: `tex`.
    pub extension: String,

    /// Metadata applied after the package configuration file, in order.
    pub metadata_overrides: Vec<(String, String)>,

    /// Date used for `pkg_date` defaults and `pkg_date=today`. If None, the
    /// local date at conversion time.
    pub today: Option<NaiveDate>,

    /// Per-entry progress events.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            template_dir: None,
            docu_dir: DEFAULT_DOCU_DIR.to_string(),
            package_config: DEFAULT_PACKAGE_CONFIG.to_string(),
            extension: DEFAULT_EXTENSION.to_string(),
            metadata_overrides: Vec::new(),
            today: None,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ConversionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionConfig")
            .field("template_dir", &self.template_dir)
            .field("docu_dir", &self.docu_dir)
            .field("package_config", &self.package_config)
            .field("extension", &self.extension)
            .field("metadata_overrides", &self.metadata_overrides)
            .field("today", &self.today)
            .field(
                "progress_callback",
                &self
                    .progress_callback
                    .as_ref()
                    .map(|_| "<dyn ConversionProgressCallback>"),
            )
            .finish()
    }
}

impl ConversionConfig {
    /// Create a new builder for `ConversionConfig`.
    pub fn builder() -> ConversionConfigBuilder {
        ConversionConfigBuilder {
            config: Self::default(),
        }
    }

    /// The configured date, or today's local date.
    pub fn today(&self) -> NaiveDate {
        self.today.unwrap_or_else(|| chrono::Local::now().date_naive())
    }
}

/// Builder for [`ConversionConfig`].
#[derive(Debug)]
pub struct ConversionConfigBuilder {
    config: ConversionConfig,
}

impl ConversionConfigBuilder {
    pub fn template_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.template_dir = Some(dir.into());
        self
    }

    pub fn docu_dir(mut self, name: impl Into<String>) -> Self {
        self.config.docu_dir = name.into();
        self
    }

    pub fn package_config(mut self, name: impl Into<String>) -> Self {
        self.config.package_config = name.into();
        self
    }

    /// Source extension; a leading dot is ignored.
    pub fn extension(mut self, ext: impl Into<String>) -> Self {
        let ext = ext.into();
        self.config.extension = ext.trim_start_matches('.').to_string();
        self
    }

    pub fn metadata_override(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.config
            .metadata_overrides
            .push((key.into(), value.into()));
        self
    }

    pub fn today(mut self, date: NaiveDate) -> Self {
        self.config.today = Some(date);
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ConversionConfig, Tex2DtxError> {
        let c = &self.config;
        if c.extension.is_empty() {
            return Err(Tex2DtxError::InvalidConfig(
                "Source extension must not be empty".into(),
            ));
        }
        if c.docu_dir.is_empty() {
            return Err(Tex2DtxError::InvalidConfig(
                "Fragment directory name must not be empty".into(),
            ));
        }
        if c.package_config.is_empty() {
            return Err(Tex2DtxError::InvalidConfig(
                "Package configuration file name must not be empty".into(),
            ));
        }
        if let Some((key, _)) = c.metadata_overrides.iter().find(|(k, _)| k.trim().is_empty()) {
            return Err(Tex2DtxError::InvalidConfig(format!(
                "Metadata key must not be empty (got {key:?})"
            )));
        }
        Ok(self.config)
    }
}

/// Parse a `key=value` override as given on the command line.
pub fn parse_override(s: &str) -> Result<(String, String), Tex2DtxError> {
    match s.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.trim().to_string()))
        }
        _ => Err(Tex2DtxError::InvalidConfig(format!(
            "Expected KEY=VALUE, got '{s}'"
        ))),
    }
}
