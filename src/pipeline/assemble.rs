//! Document assembly: sections of commands → one `.dtx` document.
//!
//! ## Layout
//!
//! ```text
//! header          templates 01–06, metadata-filled, fragments spliced in
//! % \section{Macro Documentation}
//!   per section:  \subsection, \label, summary table, documentation blocks
//! % \section{Implementation}
//! %<*package>
//!   per section:  \subsection, summary table, implementation blocks,
//!                 then the implementation blocks of private commands
//! %</package>
//! ```
//!
//! Private commands never appear in a summary table or in the documentation
//! section; their code still has to reach the package, so their
//! implementation blocks trail the section's public ones.

use crate::error::Diagnostics;
use crate::metadata::{PackageMetadata, KEY_EXAMPLE, KEY_INTRODUCTION, KEY_PACKAGES};
use crate::model::{Command, Section, Sections};
use crate::pipeline::command::{ERROR_PREFIX, EQUATION_PREFIX, EXAMPLE_PREFIX};
use crate::pipeline::input::AuxFragments;
use crate::pipeline::substitute::{substitute, Mode};
use crate::templates::TemplateSet;
use tracing::debug;

const TABLE_HEAD: &str = "% \\begin{center}\n\
% \\begin{tabularx}{\\textwidth}{l p{8cm}} \\hline\n\
% \\textbf{Command} & \\textbf{Arguments} \\\\ \\hline\n";

const TABLE_FOOT: &str = "% \\end{tabularx}\n% \\end{center}\n";

const PACKAGE_GUARD_OPEN: &str = "% \\iffalse\n%<*package>\n% \\fi\n";
const PACKAGE_GUARD_CLOSE: &str = "% \\iffalse\n%</package>\n% \\fi\n";

const MACROCODE_OPEN: &str = "%    \\begin{macrocode}\n";
const MACROCODE_CLOSE: &str = "%    \\end{macrocode}\n";

/// Renders sections into the final document.
#[derive(Debug, Clone)]
pub struct DocumentAssembler {
    metadata: PackageMetadata,
    templates: TemplateSet,
    fragments: AuxFragments,
}

impl DocumentAssembler {
    pub fn new(metadata: PackageMetadata) -> Self {
        Self {
            metadata,
            templates: TemplateSet::default(),
            fragments: AuxFragments::default(),
        }
    }

    pub fn with_templates(mut self, templates: TemplateSet) -> Self {
        self.templates = templates;
        self
    }

    pub fn with_fragments(mut self, fragments: AuxFragments) -> Self {
        self.fragments = fragments;
        self
    }

    /// Metadata as seen by the templates, including the fragment keys.
    pub fn metadata(&self) -> PackageMetadata {
        let mut meta = self.metadata.clone();
        meta.set(KEY_PACKAGES, self.fragments.packages.clone());
        meta.set(KEY_INTRODUCTION, indent_continuation(&self.fragments.introduction));
        meta.set(KEY_EXAMPLE, indent_continuation(&self.fragments.example));
        meta
    }

    /// Render the whole document.
    pub fn assemble(&self, sections: &Sections, diagnostics: &mut Diagnostics) -> String {
        let mut docu = String::new();
        let mut implementation = String::from(PACKAGE_GUARD_OPEN);

        for section in sections {
            let (d, i) = render_section(section, diagnostics);
            docu.push_str(&d);
            implementation.push_str(&i);
        }
        implementation.push_str(PACKAGE_GUARD_CLOSE);

        let mut output = self.render_header();
        output.push_str("% \\section{Macro Documentation}\n");
        output.push_str(&docu);
        output.push('\n');
        output.push_str("% \\section{Implementation}\n\n");
        output.push_str(&implementation);
        output
    }

    /// Header: the six templates with fragments spliced in.
    pub fn render_header(&self) -> String {
        let meta = self.metadata();
        let t = &self.templates;

        let mut header = String::new();
        header.push_str(&meta.fill(&t.head));
        header.push_str(&meta.fill(&t.preamble));
        header.push_str(&meta.fill(&t.postamble));
        header.push_str(&meta.fill(&t.generate));
        header.push_str(&self.fragments.settings);
        header.push('\n');
        header.push_str(&meta.fill(&t.predocument));
        header.push_str(&meta.fill(&t.document));
        header.push('\n');
        header
    }
}

/// Render with built-in templates and no fragments.
pub fn assemble(
    sections: &Sections,
    metadata: &PackageMetadata,
    diagnostics: &mut Diagnostics,
) -> String {
    DocumentAssembler::new(metadata.clone()).assemble(sections, diagnostics)
}

/// Render one section into its documentation and implementation parts.
pub fn render_section(section: &Section, diagnostics: &mut Diagnostics) -> (String, String) {
    let (private, public): (Vec<&Command>, Vec<&Command>) =
        section.commands.iter().partition(|c| c.is_private);
    debug!(
        "Section '{}': {} public, {} private",
        section.key,
        public.len(),
        private.len()
    );

    let mut docu_table = String::from(TABLE_HEAD);
    let mut impl_table = String::from(TABLE_HEAD);
    let mut docu_blocks = String::new();
    let mut impl_blocks = String::new();

    for cmd in &public {
        docu_table.push_str(&documentation_row(cmd));
        impl_table.push_str(&implementation_row(cmd));
        docu_blocks.push_str(&documentation_block(cmd, diagnostics));
        // The description was already substituted (and reported) above.
        impl_blocks.push_str(&implementation_block(cmd, &mut Diagnostics::new()));
    }
    for cmd in &private {
        impl_blocks.push_str(&implementation_block(cmd, diagnostics));
    }

    docu_table.push_str(TABLE_FOOT);
    impl_table.push_str(TABLE_FOOT);
    impl_table.push('\n');

    let key = &section.key;
    let docu = format!(
        "% \\subsection{{{key}}}\n% \\label{{subsec:{key}}}\n{docu_table}{docu_blocks}"
    );
    let implementation = format!("% \\subsection{{{key}}}\n{impl_table}{impl_blocks}");
    (docu, implementation)
}

/// `\oarg{..}, \marg{..}, \marg{..}` as shown in the summary tables.
fn argument_list(cmd: &Command) -> String {
    let mut args = String::new();
    if let Some((oarg, _)) = cmd.optional() {
        args.push_str(&format!("\\oarg{{{}}}, ", oarg.label));
    }
    let margs: Vec<String> = cmd
        .positional_args
        .iter()
        .map(|p| format!("\\marg{{{}}}", p.label))
        .collect();
    args.push_str(&margs.join(", "));
    args
}

/// Summary row of the documentation table.
pub fn documentation_row(cmd: &Command) -> String {
    let mut row = format!(
        "% \\ref{{macro:{}}} & \\makecell[t{{p{{8cm}}}}]{{{}",
        cmd.name,
        argument_list(cmd)
    );
    if let Some((_, default)) = cmd.optional() {
        row.push_str(&format!("\\\\Default Argument: {default}"));
    }
    row.push_str("} \\\\\n");
    row
}

/// Summary row of the implementation table.
pub fn implementation_row(cmd: &Command) -> String {
    let mut row = format!(
        "% \\ref{{macro:{}_impl}} & \\makecell[t{{p{{8cm}}}}]{{{}",
        cmd.name,
        argument_list(cmd)
    );
    if let Some((_, default)) = cmd.optional() {
        row.push_str(&format!("\\\\{default}"));
    }
    row.push_str("} \\\\\n");
    row
}

/// Full documentation block of a public command.
pub fn documentation_block(cmd: &Command, diagnostics: &mut Diagnostics) -> String {
    let name = &cmd.name;
    let mut out = format!("\n% \\setlabel{{\\textbackslash {name}}}{{macro:{name}}}\n");
    out.push_str(&format!("% \\DescribeMacro{{{name}}}\n"));

    // Signature: \oarg{..}\marg{..}\marg{..}
    match cmd.optional() {
        Some((oarg, _)) => out.push_str(&format!("% \\oarg{{{}}}", oarg.label)),
        None => out.push_str("% "),
    }
    for p in &cmd.positional_args {
        out.push_str(&format!("\\marg{{{}}}", p.label));
    }
    out.push_str("\\\\[1mm]\n");

    let mut args = String::new();
    if let Some((oarg, default)) = cmd.optional() {
        args.push_str(&format!(
            "% \\oarg{{{}}}: {}, default: {}\\\\\n",
            oarg.label, oarg.description, default
        ));
    }
    let last = cmd.positional_args.len().saturating_sub(1);
    for (i, p) in cmd.positional_args.iter().enumerate() {
        args.push_str(&format!("% \\marg{{{}}}: {}", p.label, p.description));
        args.push_str(if i == last { "\n" } else { "\\\\\n" });
    }
    out.push_str(&substitute(&args, cmd, Mode::Full, diagnostics));

    let mut box_added = false;
    if !cmd.description.is_empty() {
        let text = description_box(&cmd.description);
        out.push_str(&substitute(&text, cmd, Mode::Full, diagnostics));
        box_added = true;
    }
    if !cmd.equation.is_empty() {
        let text = annotation_box("equationbox", EQUATION_PREFIX, &cmd.equation);
        out.push_str(&substitute(&text, cmd, Mode::Short, diagnostics));
        box_added = true;
    }
    if !cmd.example.is_empty() {
        let text = annotation_box("examplebox", EXAMPLE_PREFIX, &cmd.example);
        out.push_str(&substitute(&text, cmd, Mode::Full, diagnostics));
        box_added = true;
    }
    if !cmd.errors.is_empty() {
        let text = annotation_box("warningbox", ERROR_PREFIX, &cmd.errors);
        out.push_str(&substitute(&text, cmd, Mode::Full, diagnostics));
        box_added = true;
    }
    if !box_added {
        out.push('\n');
    }
    out
}

/// Implementation block: anchor, parameter list and verbatim code.
pub fn implementation_block(cmd: &Command, diagnostics: &mut Diagnostics) -> String {
    let name = &cmd.name;
    let mut out = format!("\n% \\setlabel{{\\textbackslash {name}}}{{macro:{name}_impl}}\n");
    out.push_str(&format!("% \\begin{{macro}}{{\\{name}}}\n"));

    let mut description: String = cmd.description.concat();
    description.push_str("% \n");
    out.push_str(&substitute(&description, cmd, Mode::Full, diagnostics));

    let mut index = 1;
    if let Some((oarg, _)) = cmd.optional() {
        out.push_str(&format!(
            "% \\#{index} - {}: {}\\\\\n",
            oarg.label,
            escape_hash(&oarg.description)
        ));
        index += 1;
    }
    let last = cmd.positional_args.len().saturating_sub(1);
    for (i, p) in cmd.positional_args.iter().enumerate() {
        out.push_str(&format!(
            "% \\#{index} - {}: {}",
            p.label,
            escape_hash(&p.description)
        ));
        out.push_str(if i == last { "\n" } else { "\\\\\n" });
        index += 1;
    }

    out.push_str(MACROCODE_OPEN);
    out.push_str(&cmd.implementation.concat());
    out.push_str(MACROCODE_CLOSE);
    out.push_str("% \\end{macro}\n\n");
    out
}

fn description_box(lines: &[String]) -> String {
    let mut out = String::from("% \\begin{descriptionbox}\n");
    out.push_str(&lines.concat());
    out.push_str("% \\end{descriptionbox}\n");
    out
}

/// A box of annotation lines with their `% Keyword:` prefix removed, joined
/// by LaTeX line breaks.
fn annotation_box(env: &str, prefix: &str, lines: &[String]) -> String {
    let body: Vec<String> = lines
        .iter()
        .map(|line| format!("%   {}", strip_annotation(line, prefix)))
        .collect();
    format!(
        "% \\begin{{{env}}}\n{}\n% \\end{{{env}}}\n",
        body.join("\\\\\n")
    )
}

/// `% Example: \foo{x}` → `\foo{x}`.
fn strip_annotation<'a>(line: &'a str, prefix: &str) -> &'a str {
    let rest = line.strip_prefix(prefix).unwrap_or(line);
    let rest = rest.strip_prefix(':').unwrap_or(rest);
    rest.trim()
}

/// Indent every line after the first by four spaces.
fn indent_continuation(text: &str) -> String {
    let mut lines = text.split_inclusive('\n');
    let mut out = lines.next().unwrap_or_default().to_string();
    for line in lines {
        out.push_str("    ");
        out.push_str(line);
    }
    out
}

/// Escape literal `#` so LaTeX prints it inside prose.
fn escape_hash(text: &str) -> String {
    text.replace('#', "\\#")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Diagnostic;
    use crate::model::Param;
    use chrono::NaiveDate;

    fn meta() -> PackageMetadata {
        PackageMetadata::with_date(NaiveDate::from_ymd_opt(2025, 12, 15).unwrap())
    }

    fn addv(private: bool) -> Command {
        Command {
            name: "addv".into(),
            positional_args: vec![
                Param::new("vector a", "first operand"),
                Param::new("vector b", "second operand"),
            ],
            description: vec!["% Adds #1 and #2.\n".into()],
            is_private: private,
            implementation: vec!["\\newcommand\\addv[2]{%\n".into(), "}\n".into()],
            ..Default::default()
        }
    }

    fn scalev() -> Command {
        Command {
            name: "scalev".into(),
            optional_arg: Some(Param::new("scalar s", "factor, e.g. #1")),
            optional_default: Some("1".into()),
            positional_args: vec![Param::new("vector v", "input")],
            equation: vec!["% Equation: #1 #2\n".into()],
            example: vec![
                "% Example: \\scalev{v}\n".into(),
                "% Example: \\scalev[2]{v}\n".into(),
            ],
            implementation: vec!["\\newcommand\\scalev[2][1]{#1#2}\n".into()],
            ..Default::default()
        }
    }

    #[test]
    fn signature_has_two_margs_and_no_oarg() {
        let block = documentation_block(&addv(false), &mut Diagnostics::new());
        assert!(block.contains("% \\marg{vector a}\\marg{vector b}\\\\[1mm]\n"));
        assert!(!block.contains("\\oarg"));
        assert!(block.contains("% Adds vector a and vector b.\n"));
        assert!(block.contains("\\begin{descriptionbox}"));
    }

    #[test]
    fn optional_argument_rendering() {
        let mut d = Diagnostics::new();
        let c = scalev();
        let block = documentation_block(&c, &mut d);
        assert!(block.contains("% \\oarg{scalar s}\\marg{vector v}\\\\[1mm]\n"));
        assert!(block.contains("% \\oarg{scalar s}: factor, e.g. scalar s, default: 1\\\\\n"));
        assert!(block.contains("%   s \\mathbf{v}\n"));
        assert!(block.contains("%   \\scalev{v}\\\\\n%   \\scalev[2]{v}\n"));
        assert!(d.is_empty());

        assert_eq!(
            documentation_row(&c),
            "% \\ref{macro:scalev} & \\makecell[t{p{8cm}}]{\\oarg{scalar s}, \\marg{vector v}\\\\Default Argument: 1} \\\\\n"
        );
        assert_eq!(
            implementation_row(&c),
            "% \\ref{macro:scalev_impl} & \\makecell[t{p{8cm}}]{\\oarg{scalar s}, \\marg{vector v}\\\\1} \\\\\n"
        );
    }

    #[test]
    fn implementation_block_escapes_hash_and_keeps_code() {
        let block = implementation_block(&scalev(), &mut Diagnostics::new());
        assert!(block.contains("% \\begin{macro}{\\scalev}\n"));
        assert!(block.contains("% \\#1 - scalar s: factor, e.g. \\#1\\\\\n"));
        assert!(block.contains("% \\#2 - vector v: input\n"));
        assert!(block.contains(
            "%    \\begin{macrocode}\n\\newcommand\\scalev[2][1]{#1#2}\n%    \\end{macrocode}\n"
        ));
    }

    #[test]
    fn block_without_boxes_ends_with_blank_line() {
        let mut c = addv(false);
        c.description.clear();
        let block = documentation_block(&c, &mut Diagnostics::new());
        assert!(block.ends_with("second operand\n\n"));
    }

    #[test]
    fn private_commands_only_trail_implementation() {
        let section = Section {
            key: "vector".into(),
            commands: vec![addv(true), scalev()],
        };
        let (docu, implementation) = render_section(&section, &mut Diagnostics::new());
        assert!(!docu.contains("addv"));
        assert_eq!(docu.matches("\\ref{macro:scalev}").count(), 1);
        assert!(!implementation.contains("\\ref{macro:addv_impl}"));
        let public = implementation.find("\\begin{macro}{\\scalev}").unwrap();
        let private = implementation.find("\\begin{macro}{\\addv}").unwrap();
        assert!(private > public);
    }

    #[test]
    fn out_of_range_reference_does_not_abort() {
        let mut c = addv(false);
        c.positional_args.truncate(1);
        let mut d = Diagnostics::new();
        let block = documentation_block(&c, &mut d);
        assert!(block.contains("% Adds vector a and param 2.\n"));
        assert!(d
            .iter()
            .any(|x| matches!(x, Diagnostic::ParameterOutOfRange { index: 2, .. })));
    }

    #[test]
    fn out_of_range_reference_reported_once_per_command() {
        for private in [false, true] {
            let mut c = addv(private);
            c.positional_args.truncate(1);
            let section = Section {
                key: "vector".into(),
                commands: vec![c],
            };
            let mut d = Diagnostics::new();
            let (_, implementation) = render_section(&section, &mut d);
            assert!(implementation.contains("param 2"));
            let reported = d
                .iter()
                .filter(|x| matches!(x, Diagnostic::ParameterOutOfRange { index: 2, .. }))
                .count();
            assert_eq!(reported, 1, "private = {private}");
        }
    }

    #[test]
    fn zero_sections_yield_boilerplate_only() {
        let doc = assemble(&Sections::new(), &meta(), &mut Diagnostics::new());
        assert!(doc.contains("\\ProvidesPackage{SamplePackage}"));
        assert!(doc.contains(
            "% \\section{Macro Documentation}\n\n% \\section{Implementation}\n\n\
             % \\iffalse\n%<*package>\n% \\fi\n% \\iffalse\n%</package>\n% \\fi\n"
        ));
        assert!(!doc.contains("\\subsection"));
        assert!(doc.ends_with("%</package>\n% \\fi\n"));
    }

    #[test]
    fn header_splices_fragments() {
        let assembler = DocumentAssembler::new(meta()).with_fragments(AuxFragments {
            packages: "\\RequirePackage{xparse}\n".into(),
            settings: "\\usepackage{amsmath}\n".into(),
            introduction: "Line one\nLine two\n".into(),
            example: String::new(),
        });
        let header = assembler.render_header();
        assert!(header.contains("%<*package>\n\\RequirePackage{xparse}\n\n%</package>"));
        assert!(header.contains("\\usepackage{amsmath}\n\n"));
        assert!(header.contains("    Line one\n    Line two\n"));
        assert!(!header.contains("<PKG_"));
    }

    #[test]
    fn indent_continuation_leaves_first_line() {
        assert_eq!(indent_continuation("a\nb\nc"), "a\n    b\n    c");
        assert_eq!(indent_continuation(""), "");
    }
}
