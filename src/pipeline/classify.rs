//! Line classification: raw lines → command blocks.
//!
//! The classifier is a small automaton. [`ClassifierState`] holds the kind of
//! the block being accumulated plus its lines, and [`ClassifierState::step`]
//! consumes one line and returns the next state together with an optional
//! completed [`Block`]. [`classify`] folds a whole file through it.
//!
//! ## Transition order
//!
//! Evaluated top to bottom, the first match wins:
//!
//! | Line                   | Condition               | Effect                          |
//! |------------------------|-------------------------|---------------------------------|
//! | `\newcommand…`         | any                     | kind = Command                  |
//! | `}…`                   | any                     | append, emit if Command, reset  |
//! | `% …`                  | kind ∉ {Command,Header} | kind = Comment                  |
//! | `%%…`                  | kind = Header           | kind = None                     |
//! | `%%…`                  | kind ≠ Command          | kind = Header                   |
//! | blank                  | kind = Comment          | discard, reset                  |
//! | other non-blank        | kind = None             | unprocessed-line diagnostic     |
//!
//! After the transition the line is appended iff the kind is Command or
//! Comment. Comment lines gathered before a definition therefore stay in the
//! definition's block: they are its annotations.

use crate::error::{Diagnostic, Diagnostics};
use crate::model::{Block, BlockKind};
use tracing::debug;

pub const DEFINITION_MARKER: &str = "\\newcommand";
pub const CLOSE_MARKER: &str = "}";
pub const COMMENT_MARKER: &str = "% ";
pub const BANNER_MARKER: &str = "%%";

/// The block being accumulated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassifierState {
    pub kind: BlockKind,
    pub lines: Vec<String>,
    /// 1-based number of the first accumulated line.
    pub first_line: usize,
}

/// What a single [`ClassifierState::step`] produced besides the next state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Nothing to report.
    Continue,
    /// A command block was closed by this line.
    Emit(Block),
    /// The line fits no structure and was ignored.
    Unprocessed,
}

impl ClassifierState {
    /// Consume one line (with terminator) and return the next state.
    ///
    /// `line_no` is the 1-based position of `line` in its file and `source`
    /// the file name recorded on emitted blocks.
    pub fn step(self, line: &str, line_no: usize, source: &str) -> (ClassifierState, Step) {
        let mut state = self;
        let mut step = Step::Continue;
        let blank = line.trim_end().is_empty();

        if line.starts_with(DEFINITION_MARKER) {
            state.kind = BlockKind::Command;
        } else if line.starts_with(CLOSE_MARKER) {
            state.push(line, line_no);
            let closed = std::mem::take(&mut state);
            if closed.kind == BlockKind::Command {
                step = Step::Emit(Block {
                    kind: closed.kind,
                    lines: closed.lines,
                    source: source.to_string(),
                    first_line: closed.first_line,
                });
            }
        } else if line.starts_with(COMMENT_MARKER)
            && state.kind != BlockKind::Command
            && state.kind != BlockKind::Header
        {
            state.kind = BlockKind::Comment;
        } else if line.starts_with(BANNER_MARKER) && state.kind == BlockKind::Header {
            state.kind = BlockKind::None;
        } else if line.starts_with(BANNER_MARKER) && state.kind != BlockKind::Command {
            state.kind = BlockKind::Header;
        } else if blank && state.kind == BlockKind::Comment {
            state = ClassifierState::default();
        } else if state.kind == BlockKind::None && !blank {
            step = Step::Unprocessed;
        }

        if matches!(state.kind, BlockKind::Command | BlockKind::Comment) {
            state.push(line, line_no);
        }

        (state, step)
    }

    fn push(&mut self, line: &str, line_no: usize) {
        if self.lines.is_empty() {
            self.first_line = line_no;
        }
        self.lines.push(line.to_string());
    }
}

/// Split text into lines, keeping each line's `\n` terminator.
pub fn split_lines(text: &str) -> Vec<String> {
    text.split_inclusive('\n').map(str::to_string).collect()
}

/// Classify a file's lines into command blocks.
///
/// Only Command blocks are returned; comment runs that never reach a
/// definition and banner blocks are dropped. A command block still open at
/// end of input is dropped as well and reported as
/// [`Diagnostic::UnterminatedBlock`].
pub fn classify<S: AsRef<str>>(
    lines: &[S],
    source: &str,
    diagnostics: &mut Diagnostics,
) -> Vec<Block> {
    let mut blocks = Vec::new();
    let mut state = ClassifierState::default();

    for (i, line) in lines.iter().enumerate() {
        let line = line.as_ref();
        let (next, step) = state.step(line, i + 1, source);
        state = next;
        match step {
            Step::Continue => {}
            Step::Emit(block) => {
                debug!(
                    "{}:{}: command block of {} lines",
                    source,
                    block.first_line,
                    block.lines.len()
                );
                blocks.push(block);
            }
            Step::Unprocessed => diagnostics.push(Diagnostic::UnprocessedLine {
                file: source.to_string(),
                line: i + 1,
                text: line.trim().to_string(),
            }),
        }
    }

    if state.kind == BlockKind::Command {
        diagnostics.push(Diagnostic::UnterminatedBlock {
            file: source.to_string(),
            line: state.first_line,
        });
    }

    blocks
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(text: &str) -> (Vec<Block>, Diagnostics) {
        let mut diags = Diagnostics::new();
        let blocks = classify(&split_lines(text), "x_test.tex", &mut diags);
        (blocks, diags)
    }

    #[test]
    fn empty_input_yields_no_blocks() {
        let (blocks, diags) = run("");
        assert!(blocks.is_empty());
        assert!(diags.is_empty());
    }

    #[test]
    fn comments_travel_with_definition() {
        let text = "% Adds two vectors.\n\
                    % #1 vector a, first operand\n\
                    \\newcommand\\addv[1]{%\n\
                    \x20 #1\n\
                    }\n";
        let (blocks, _) = run(text);
        assert_eq!(blocks.len(), 1);
        let b = &blocks[0];
        assert_eq!(b.kind, BlockKind::Command);
        assert_eq!(b.lines.len(), 5);
        assert_eq!(b.lines[0], "% Adds two vectors.\n");
        assert_eq!(b.lines[4], "}\n");
        assert_eq!(b.first_line, 1);
        assert_eq!(b.source, "x_test.tex");
    }

    #[test]
    fn dangling_comment_dropped_on_blank_line() {
        let text = "% orphan comment\n\n\\newcommand\\foo{x\n}\n";
        let (blocks, _) = run(text);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].lines, vec!["\\newcommand\\foo{x\n", "}\n"]);
        assert_eq!(blocks[0].first_line, 3);
    }

    #[test]
    fn banner_is_never_emitted() {
        let text = "%% ----\n% banner text\n%% ----\n\\newcommand\\foo{x\n}\n";
        let (blocks, diags) = run(text);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].lines.len(), 2);
        assert!(diags.is_empty());
    }

    #[test]
    fn stray_line_is_reported_not_collected() {
        let text = "\\makeatletter\n\\newcommand\\foo{x\n}\n";
        let (blocks, diags) = run(text);
        assert_eq!(blocks.len(), 1);
        assert_eq!(diags.len(), 1);
        assert!(matches!(
            diags.iter().next(),
            Some(Diagnostic::UnprocessedLine { line: 1, .. })
        ));
    }

    #[test]
    fn close_outside_command_is_not_emitted() {
        let text = "% comment\n}\n";
        let (blocks, _) = run(text);
        assert!(blocks.is_empty());
    }

    #[test]
    fn unterminated_block_is_dropped_with_warning() {
        let text = "\\newcommand\\foo{x\n  body\n";
        let (blocks, diags) = run(text);
        assert!(blocks.is_empty());
        assert!(matches!(
            diags.iter().next(),
            Some(Diagnostic::UnterminatedBlock { line: 1, .. })
        ));
    }

    #[test]
    fn step_is_usable_line_by_line() {
        let state = ClassifierState::default();
        let (state, step) = state.step("% doc\n", 1, "f");
        assert_eq!(state.kind, BlockKind::Comment);
        assert_eq!(step, Step::Continue);
        let (state, _) = state.step("\\newcommand\\f{\n", 2, "f");
        assert_eq!(state.kind, BlockKind::Command);
        let (state, step) = state.step("}\n", 3, "f");
        assert_eq!(state, ClassifierState::default());
        match step {
            Step::Emit(block) => assert_eq!(block.lines.len(), 3),
            other => panic!("expected Emit, got {other:?}"),
        }
    }

    #[test]
    fn blank_line_inside_command_is_kept() {
        let text = "\\newcommand\\foo{%\n\n  x%\n}\n";
        let (blocks, _) = run(text);
        assert_eq!(blocks[0].lines.len(), 4);
    }
}
