//! Parameter-reference substitution: `#N` → parameter name.
//!
//! Annotation text refers to macro parameters positionally (`#1`, `#2`, …),
//! exactly as the macro body does. Before rendering, those tokens are
//! rewritten so the reader sees `vector a` instead of `#1`. Index 1 is the
//! optional argument when the macro has one.
//!
//! Equation boxes use [`Mode::Short`], which turns a label into a math
//! symbol following the vocabulary used in the annotations:
//!
//! | Label        | Short form      |
//! |--------------|-----------------|
//! | `matrix m`   | `\mathbf{M}`    |
//! | `matrices ms`| `\mathbf{MS}`   |
//! | `vector v`   | `\mathbf{v}`    |
//! | `vectors vs` | `\mathbf{vs}`   |
//! | `scalar s`   | `s`             |

use crate::error::{Diagnostic, Diagnostics};
use crate::model::Command;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static RE_PARAM_REF: Lazy<Regex> = Lazy::new(|| Regex::new(r"#(\d+)").unwrap());

/// How a resolved parameter is written back into the text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// The full label, e.g. `vector a`.
    Full,
    /// A compact math symbol derived from the label.
    Short,
}

/// Replace every `#N` token in `text` with the matching parameter of `command`.
///
/// Out-of-range references become `param N` and are reported as
/// [`Diagnostic::ParameterOutOfRange`]. Text without tokens is returned
/// unchanged.
pub fn substitute(
    text: &str,
    command: &Command,
    mode: Mode,
    diagnostics: &mut Diagnostics,
) -> String {
    if !RE_PARAM_REF.is_match(text) {
        return text.to_string();
    }

    RE_PARAM_REF
        .replace_all(text, |caps: &Captures<'_>| {
            let digits = &caps[1];
            let param = digits
                .parse::<usize>()
                .ok()
                .and_then(|n| command.parameter(n));
            match param {
                Some(p) => match mode {
                    Mode::Full => p.label.clone(),
                    Mode::Short => short_symbol(&p.label),
                },
                None => {
                    diagnostics.push(Diagnostic::ParameterOutOfRange {
                        command: command.name.clone(),
                        index: digits.parse().unwrap_or(usize::MAX),
                        available: command.parameter_count(),
                    });
                    format!("param {digits}")
                }
            }
        })
        .into_owned()
}

/// Compress a parameter label into a math symbol.
///
/// The first word is the type, the second the variable name (or the type
/// itself when the label is a single word). A type word ending in `s` is
/// plural and keeps the first and last character of the name.
pub fn short_symbol(label: &str) -> String {
    let words: Vec<&str> = label.split_whitespace().collect();
    let Some(&var_type) = words.first() else {
        return label.to_string();
    };
    let var_name = words.get(1).copied().unwrap_or(var_type);
    let plural = var_type.ends_with('s');

    if var_type.contains("matri") {
        format!("\\mathbf{{{}}}", abbreviate(var_name, plural).to_uppercase())
    } else if var_type.contains("vector") {
        format!("\\mathbf{{{}}}", abbreviate(var_name, plural))
    } else {
        abbreviate(var_name, false)
    }
}

fn abbreviate(name: &str, plural: bool) -> String {
    let mut chars = name.chars();
    let first = chars.next();
    let last = chars.next_back();
    match (first, last, plural) {
        (Some(f), Some(l), true) => format!("{f}{l}"),
        // A one-character plural name keeps its single character twice.
        (Some(f), None, true) => format!("{f}{f}"),
        (Some(f), _, false) => f.to_string(),
        (None, _, _) => String::new(),
    }
}
