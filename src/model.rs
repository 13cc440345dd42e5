//! Data model shared by the pipeline stages.
//!
//! A conversion run moves through three shapes:
//!
//! ```text
//! raw lines ──▶ Block (classified run of lines) ──▶ Command (parsed view)
//!                                                      │
//!                            Sections (key → Commands) ◀┘
//! ```

use serde::{Deserialize, Serialize};

/// Classification of the run of lines currently being accumulated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BlockKind {
    /// Outside any recognised structure.
    #[default]
    None,
    /// Inside a `%%` banner; never emitted.
    Header,
    /// Documentation comment lines not yet attached to a definition.
    Comment,
    /// A macro definition, including the comments that precede it.
    Command,
}

/// A contiguous run of lines sharing one classification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub kind: BlockKind,
    /// Raw lines including their terminators, in file order.
    pub lines: Vec<String>,
    /// Name of the file the block came from.
    pub source: String,
    /// 1-based line number of the first line in `lines`.
    pub first_line: usize,
}

/// One documented macro parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Param {
    /// Human-readable name, e.g. `vector a`.
    pub label: String,
    pub description: String,
}

impl Param {
    pub fn new(label: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            description: description.into(),
        }
    }
}

/// Structured view of one command block.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Command {
    pub name: String,
    /// Mandatory parameters in declaration order.
    pub positional_args: Vec<Param>,
    /// Present only when the macro declares a default value and documents
    /// at least one parameter.
    pub optional_arg: Option<Param>,
    /// Raw default value from the definition line.
    pub optional_default: Option<String>,
    pub description: Vec<String>,
    pub equation: Vec<String>,
    pub example: Vec<String>,
    pub errors: Vec<String>,
    /// Diagnostic only, never rendered.
    pub todos: Vec<String>,
    pub is_private: bool,
    /// The definition line and every line after it, verbatim.
    pub implementation: Vec<String>,
}

impl Command {
    /// Parameters in `#N` order: the optional argument (if any) is `#1`.
    pub fn parameters(&self) -> Vec<&Param> {
        self.optional_arg
            .iter()
            .chain(self.positional_args.iter())
            .collect()
    }

    /// Number of legal `#N` indices.
    pub fn parameter_count(&self) -> usize {
        self.positional_args.len() + usize::from(self.optional_arg.is_some())
    }

    /// The 1-based `#index` parameter, if documented.
    pub fn parameter(&self, index: usize) -> Option<&Param> {
        match (index, &self.optional_arg) {
            (0, _) => None,
            (1, Some(oarg)) => Some(oarg),
            (n, Some(_)) => self.positional_args.get(n - 2),
            (n, None) => self.positional_args.get(n - 1),
        }
    }

    /// Optional argument together with its default, when both are known.
    pub fn optional(&self) -> Option<(&Param, &str)> {
        match (&self.optional_arg, &self.optional_default) {
            (Some(arg), Some(default)) => Some((arg, default.as_str())),
            _ => None,
        }
    }
}

/// A named group of commands derived from one input file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub key: String,
    pub commands: Vec<Command>,
}

/// Sections in input-file order.
///
/// Inserting a key that already exists appends to the existing section,
/// keeping its original position.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sections {
    sections: Vec<Section>,
}

impl Sections {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, commands: Vec<Command>) {
        let key = key.into();
        match self.sections.iter_mut().find(|s| s.key == key) {
            Some(existing) => existing.commands.extend(commands),
            None => self.sections.push(Section { key, commands }),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.key == key)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Section> {
        self.sections.iter()
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Total number of commands across all sections.
    pub fn command_count(&self) -> usize {
        self.sections.iter().map(|s| s.commands.len()).sum()
    }
}

impl<'a> IntoIterator for &'a Sections {
    type Item = &'a Section;
    type IntoIter = std::slice::Iter<'a, Section>;

    fn into_iter(self) -> Self::IntoIter {
        self.sections.iter()
    }
}

impl FromIterator<(String, Vec<Command>)> for Sections {
    fn from_iter<I: IntoIterator<Item = (String, Vec<Command>)>>(iter: I) -> Self {
        let mut sections = Sections::new();
        for (key, commands) in iter {
            sections.insert(key, commands);
        }
        sections
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cmd(oarg: bool, args: &[&str]) -> Command {
        Command {
            name: "t".into(),
            optional_arg: oarg.then(|| Param::new("opt", "optional")),
            optional_default: oarg.then(|| "1".to_string()),
            positional_args: args.iter().map(|a| Param::new(*a, "")).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn parameter_index_without_optional() {
        let c = cmd(false, &["a", "b"]);
        assert_eq!(c.parameter(0), None);
        assert_eq!(c.parameter(1).map(|p| p.label.as_str()), Some("a"));
        assert_eq!(c.parameter(2).map(|p| p.label.as_str()), Some("b"));
        assert_eq!(c.parameter(3), None);
        assert_eq!(c.parameter_count(), 2);
    }

    #[test]
    fn parameter_index_with_optional() {
        let c = cmd(true, &["a"]);
        assert_eq!(c.parameter(1).map(|p| p.label.as_str()), Some("opt"));
        assert_eq!(c.parameter(2).map(|p| p.label.as_str()), Some("a"));
        assert_eq!(c.parameter(3), None);
        assert_eq!(c.parameters().len(), 2);
    }

    #[test]
    fn sections_keep_first_position_on_merge() {
        let mut s = Sections::new();
        s.insert("matrix", vec![cmd(false, &[])]);
        s.insert("vector", vec![]);
        s.insert("matrix", vec![cmd(false, &[])]);
        let keys: Vec<_> = s.iter().map(|s| s.key.as_str()).collect();
        assert_eq!(keys, ["matrix", "vector"]);
        assert_eq!(s.get("matrix").unwrap().commands.len(), 2);
        assert_eq!(s.command_count(), 2);
    }
}
