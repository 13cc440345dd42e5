//! Package metadata and `<KEY>` template substitution.
//!
//! Metadata starts from built-in defaults, is overridden by the optional
//! `package_config.txt` in the resource directory, then by explicit
//! overrides from the caller. Keys are free-form; every key is available to
//! templates as `<KEY>` (upper-cased).

use chrono::{Local, NaiveDate};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const KEY_NAME: &str = "pkg_name";
pub const KEY_DESCRIPTION: &str = "pkg_description";
pub const KEY_AUTHOR: &str = "pkg_author";
pub const KEY_AUTHOR_EMAIL: &str = "pkg_author_email";
pub const KEY_DATE: &str = "pkg_date";
pub const KEY_VERSION: &str = "pkg_version";
pub const KEY_INFO_TEXT: &str = "pkg_info_text";
pub const KEY_PACKAGES: &str = "pkg_packages";
pub const KEY_INTRODUCTION: &str = "pkg_introduction";
pub const KEY_EXAMPLE: &str = "pkg_example";

/// Value of `pkg_date` that resolves to the run's date.
pub const TODAY: &str = "today";

/// Date layout used for `pkg_date`.
pub const DATE_FORMAT: &str = "%Y/%m/%d";

static RE_TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"<([A-Z0-9_]+)>").unwrap());

/// Key → value metadata for one package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageMetadata {
    values: BTreeMap<String, String>,
}

impl Default for PackageMetadata {
    fn default() -> Self {
        Self::with_date(Local::now().date_naive())
    }
}

impl PackageMetadata {
    /// Built-in defaults, dated `today`.
    pub fn with_date(today: NaiveDate) -> Self {
        let values = [
            (KEY_NAME, "SamplePackage".to_string()),
            (KEY_DESCRIPTION, "TODO".to_string()),
            (KEY_AUTHOR, "Sample author".to_string()),
            (KEY_AUTHOR_EMAIL, "example@email.com".to_string()),
            (KEY_DATE, format_date(today)),
            (KEY_VERSION, "1.0".to_string()),
            (KEY_INFO_TEXT, "Info text".to_string()),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();
        Self { values }
    }

    /// Apply `key=value` lines. Lines without `=` are ignored; `pkg_date=today`
    /// resolves to `today`.
    pub fn apply_config(&mut self, text: &str, today: NaiveDate) {
        for line in text.lines() {
            if let Some((key, value)) = line.trim().split_once('=') {
                self.set_resolved(key.trim(), value.trim(), today);
            }
        }
    }

    /// Apply explicit `(key, value)` overrides with the same rules as
    /// [`apply_config`](Self::apply_config).
    pub fn apply_overrides<'a, I>(&mut self, overrides: I, today: NaiveDate)
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        for (key, value) in overrides {
            self.set_resolved(key, value, today);
        }
    }

    fn set_resolved(&mut self, key: &str, value: &str, today: NaiveDate) {
        if key.is_empty() {
            return;
        }
        if key == KEY_DATE && value == TODAY {
            self.set(key, format_date(today));
        } else {
            self.set(key, value);
        }
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn name(&self) -> &str {
        self.get(KEY_NAME).unwrap_or_default()
    }

    pub fn author(&self) -> &str {
        self.get(KEY_AUTHOR).unwrap_or_default()
    }

    pub fn date(&self) -> &str {
        self.get(KEY_DATE).unwrap_or_default()
    }

    pub fn version(&self) -> &str {
        self.get(KEY_VERSION).unwrap_or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// File name of the generated document, `<pkg_name>.dtx`.
    pub fn output_file_name(&self) -> String {
        format!("{}.dtx", self.name())
    }

    /// Replace every `<KEY>` token (key upper-cased) in `template`.
    ///
    /// Tokens are resolved in a single pass over the template, so text
    /// inserted for one key is never scanned for further tokens. Unknown
    /// tokens are left as they are.
    pub fn fill(&self, template: &str) -> String {
        RE_TOKEN
            .replace_all(template, |caps: &Captures<'_>| {
                match self.get(&caps[1].to_lowercase()) {
                    Some(value) => value.to_string(),
                    None => caps[0].to_string(),
                }
            })
            .into_owned()
    }
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Parse a `YYYY/MM/DD` date.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT).ok()
}
