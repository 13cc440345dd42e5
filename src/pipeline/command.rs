//! Command parsing: one classified block → a structured [`Command`].
//!
//! Annotation lines before the `\newcommand` line describe the macro:
//!
//! ```text
//! % Private                         → is_private
//! % Adds two vectors.               → description
//! % #1 vector a, first operand      → positional parameter
//! % Equation: #1 + #2               → equation
//! % Example: \addv{a}{b}            → example
//! % Error: fails on mismatched size → errors
//! % TODO: support matrices          → todos
//! \newcommand\addv[2]{%             → name, arity, default; implementation starts
//! ```
//!
//! Parsing is total: irregular lines become diagnostics and a definition
//! without a name falls back to `unknown`.

use crate::error::{Diagnostic, Diagnostics};
use crate::model::{Block, Command, Param};
use crate::pipeline::classify::DEFINITION_MARKER;
use once_cell::sync::Lazy;
use regex::Regex;

/// Name used when the definition line carries no macro name.
pub const UNKNOWN_COMMAND: &str = "unknown";

pub const PRIVATE_PREFIX: &str = "% Private";
pub const PARAM_PREFIX: &str = "% #";
pub const TODO_PREFIX: &str = "% TODO";
pub const EQUATION_PREFIX: &str = "% Equation";
pub const EXAMPLE_PREFIX: &str = "% Example";
pub const ERROR_PREFIX: &str = "% Error";
pub const DESCRIPTION_PREFIX: &str = "% ";

static RE_NAME: Lazy<Regex> = Lazy::new(|| Regex::new(r"\\newcommand\\(\w+)").unwrap());

static RE_DEFAULT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[\d+\](?:\[([^\]]+)\])?").unwrap());

static RE_PARAM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"#\d+\s+([^,]+),\s*(.+)$").unwrap());

/// Parse a command block into a [`Command`].
pub fn parse(block: &Block, diagnostics: &mut Diagnostics) -> Command {
    let mut command = Command {
        name: UNKNOWN_COMMAND.to_string(),
        ..Default::default()
    };
    let mut found_definition = false;
    let mut malformed: Vec<String> = Vec::new();

    for line in &block.lines {
        // Every definition line is re-read; the last one names the command.
        if line.starts_with(DEFINITION_MARKER) {
            found_definition = true;
            match RE_NAME.captures(line) {
                Some(caps) => command.name = caps[1].to_string(),
                None => diagnostics.push(Diagnostic::MissingCommandName {
                    file: block.source.clone(),
                    text: line.trim_end().to_string(),
                }),
            }
            command.optional_default = RE_DEFAULT
                .captures(line)
                .and_then(|caps| caps.get(1))
                .map(|m| m.as_str().to_string());
        }

        if found_definition {
            command.implementation.push(line.clone());
            continue;
        }

        if line.starts_with(PRIVATE_PREFIX) {
            command.is_private = true;
        } else if line.starts_with(PARAM_PREFIX) {
            match parse_param(line) {
                Some(param) => command.positional_args.push(param),
                None => malformed.push(line.trim_end().to_string()),
            }
        } else if line.starts_with(TODO_PREFIX) {
            command.todos.push(line.clone());
        } else if line.starts_with(EQUATION_PREFIX) {
            command.equation.push(line.clone());
        } else if line.starts_with(EXAMPLE_PREFIX) {
            command.example.push(line.clone());
        } else if line.starts_with(ERROR_PREFIX) {
            command.errors.push(line.clone());
        } else if line.starts_with(DESCRIPTION_PREFIX) {
            command.description.push(line.clone());
        }
    }

    // Parameter lines precede the definition, so the name is only known now.
    for text in malformed {
        diagnostics.push(Diagnostic::MalformedParameter {
            file: block.source.clone(),
            command: command.name.clone(),
            text,
        });
    }

    if command.optional_default.is_some() {
        if command.positional_args.is_empty() {
            diagnostics.push(Diagnostic::MissingOptionalParameter {
                command: command.name.clone(),
            });
        } else {
            command.optional_arg = Some(command.positional_args.remove(0));
        }
    }

    command
}

/// Extract `(label, description)` from a `% #N label, description` line.
fn parse_param(line: &str) -> Option<Param> {
    let caps = RE_PARAM.captures(line.trim_end())?;
    let label = caps[1].trim();
    let description = caps[2].trim();
    if label.is_empty() {
        return None;
    }
    Some(Param::new(label, description))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::BlockKind;

    fn block(lines: &[&str]) -> Block {
        Block {
            kind: BlockKind::Command,
            lines: lines.iter().map(|l| format!("{l}\n")).collect(),
            source: "x_vector.tex".into(),
            first_line: 1,
        }
    }

    #[test]
    fn parses_addv_scenario() {
        let b = block(&[
            "% #1 vector a, first operand",
            "% #2 vector b, second operand",
            "\\newcommand\\addv[2]{#1+#2}",
        ]);
        let mut diags = Diagnostics::new();
        let c = parse(&b, &mut diags);
        assert_eq!(c.name, "addv");
        assert_eq!(
            c.positional_args,
            vec![
                Param::new("vector a", "first operand"),
                Param::new("vector b", "second operand"),
            ]
        );
        assert_eq!(c.optional_arg, None);
        assert_eq!(c.optional_default, None);
        assert!(!c.is_private);
        assert_eq!(c.implementation, vec!["\\newcommand\\addv[2]{#1+#2}\n"]);
        assert!(diags.is_empty());
    }

    #[test]
    fn last_definition_in_block_names_command() {
        let b = block(&[
            "% #1 scalar s, factor",
            "% #2 vector v, input",
            "\\newcommand\\first[1]{#1}",
            "\\newcommand\\second[2][z]{%",
            "  #1#2%",
            "}",
        ]);
        let mut diags = Diagnostics::new();
        let c = parse(&b, &mut diags);
        assert_eq!(c.name, "second");
        assert_eq!(c.optional_default.as_deref(), Some("z"));
        assert_eq!(c.optional_arg, Some(Param::new("scalar s", "factor")));
        assert_eq!(c.implementation.len(), 4);
        assert!(diags.is_empty());
    }

    #[test]
    fn private_marker_before_definition() {
        let b = block(&["% Private", "\\newcommand\\helper{x", "}"]);
        let c = parse(&b, &mut Diagnostics::new());
        assert!(c.is_private);
        assert!(c.description.is_empty());
    }

    #[test]
    fn private_marker_after_definition_is_body() {
        let b = block(&["\\newcommand\\helper{x", "% Private", "}"]);
        let c = parse(&b, &mut Diagnostics::new());
        assert!(!c.is_private);
        assert_eq!(c.implementation.len(), 3);
    }

    #[test]
    fn optional_default_shifts_first_parameter() {
        let b = block(&[
            "% #1 scalar s, scale factor",
            "% #2 vector v, input",
            "\\newcommand\\scalev[2][1]{#1#2}",
        ]);
        let c = parse(&b, &mut Diagnostics::new());
        assert_eq!(c.optional_default.as_deref(), Some("1"));
        assert_eq!(c.optional_arg, Some(Param::new("scalar s", "scale factor")));
        assert_eq!(c.positional_args, vec![Param::new("vector v", "input")]);
    }

    #[test]
    fn optional_default_without_parameters_is_diagnosed() {
        let b = block(&["\\newcommand\\foo[1][x]{#1}"]);
        let mut diags = Diagnostics::new();
        let c = parse(&b, &mut diags);
        assert_eq!(c.optional_default.as_deref(), Some("x"));
        assert_eq!(c.optional_arg, None);
        assert!(matches!(
            diags.iter().next(),
            Some(Diagnostic::MissingOptionalParameter { command }) if command == "foo"
        ));
    }

    #[test]
    fn missing_name_falls_back_to_unknown() {
        let b = block(&["\\newcommand{\\foo}{x}"]);
        let mut diags = Diagnostics::new();
        let c = parse(&b, &mut diags);
        assert_eq!(c.name, UNKNOWN_COMMAND);
        assert_eq!(diags.len(), 1);
    }

    #[test]
    fn block_without_definition_is_still_total() {
        let b = block(&["% just words", "}"]);
        let c = parse(&b, &mut Diagnostics::new());
        assert_eq!(c.name, UNKNOWN_COMMAND);
        assert_eq!(c.description, vec!["% just words\n"]);
        assert!(c.implementation.is_empty());
    }

    #[test]
    fn annotation_kinds_are_sorted() {
        let b = block(&[
            "% Computes the dot product.",
            "% TODO: handle complex numbers",
            "% Equation: #1 \\cdot #2",
            "% Example: \\dotv{a}{b}",
            "% Error: sizes differ",
            "% #1 vector a, left",
            "% #2 vector b, right",
            "\\newcommand\\dotv[2]{%",
            "}",
        ]);
        let c = parse(&b, &mut Diagnostics::new());
        assert_eq!(c.description, vec!["% Computes the dot product.\n"]);
        assert_eq!(c.todos.len(), 1);
        assert_eq!(c.equation, vec!["% Equation: #1 \\cdot #2\n"]);
        assert_eq!(c.example.len(), 1);
        assert_eq!(c.errors.len(), 1);
        assert_eq!(c.positional_args.len(), 2);
        assert_eq!(c.implementation.len(), 2);
    }

    #[test]
    fn malformed_parameter_is_reported_with_command_name() {
        let b = block(&["% #1 no comma here", "\\newcommand\\foo[1]{#1}"]);
        let mut diags = Diagnostics::new();
        let c = parse(&b, &mut diags);
        assert!(c.positional_args.is_empty());
        assert!(matches!(
            diags.iter().next(),
            Some(Diagnostic::MalformedParameter { command, .. }) if command == "foo"
        ));
    }

    #[test]
    fn parameter_description_keeps_later_commas() {
        let p = parse_param("% #3 matrix M, rows, then columns\n").unwrap();
        assert_eq!(p.label, "matrix M");
        assert_eq!(p.description, "rows, then columns");
    }
}
