//! Header templates for the generated `.dtx` document.
//!
//! The header is six fragments, concatenated in order, each run through
//! [`PackageMetadata::fill`](crate::metadata::PackageMetadata::fill):
//!
//! 1. `01_head.tex` — meta-comment / internal / readme banner and the
//!    `\ProvidesPackage` declaration
//! 2. `02_preamble_template.tex` — docstrip batch file preamble
//! 3. `03_postamble_template.tex` — docstrip postamble
//! 4. `04_generate_template.tex` — `\generate` call, package requirements,
//!    start of the driver
//! 5. `05_predocument.tex` — packages and environments the generated
//!    documentation itself relies on
//! 6. `06_document_template.tex` — the driver document embedding the
//!    introduction and example fragments
//!
//! Built-in defaults are compiled into the crate; a template directory set
//! through [`crate::config::ConversionConfig::template_dir`] replaces the whole
//! set.

use crate::error::{Diagnostic, Diagnostics, Tex2DtxError};
use std::path::Path;
use tracing::debug;

pub const HEAD_FILE: &str = "01_head.tex";
pub const PREAMBLE_FILE: &str = "02_preamble_template.tex";
pub const POSTAMBLE_FILE: &str = "03_postamble_template.tex";
pub const GENERATE_FILE: &str = "04_generate_template.tex";
pub const PREDOCUMENT_FILE: &str = "05_predocument.tex";
pub const DOCUMENT_FILE: &str = "06_document_template.tex";

pub const DEFAULT_HEAD: &str = r"% \iffalse meta-comment
%<*internal>
\iffalse
%</internal>
%<*readme>
<PKG_INFO_TEXT>
%</readme>
%<*internal>
\fi
\def\nameofplainTeX{plain}
\ifx\fmtname\nameofplainTeX\else
  \expandafter\begingroup
\fi
%</internal>
%<*install>
\input l3docstrip.tex
\keepsilent
\askforoverwritefalse
%</install>
%<package>\NeedsTeXFormat{LaTeX2e}
%<package>\ProvidesPackage{<PKG_NAME>}
%<*package>
  [<PKG_DATE> v<PKG_VERSION> <PKG_DESCRIPTION>]
%</package>
";

pub const DEFAULT_PREAMBLE: &str = r"%<*install>
\preamble

<PKG_NAME> --- <PKG_DESCRIPTION>
Copyright (C) <PKG_DATE> <PKG_AUTHOR> <<PKG_AUTHOR_EMAIL>>

This work may be distributed and/or modified under the
conditions of the LaTeX Project Public License, either version 1.3c
of this license or (at your option) any later version.

\endpreamble
";

pub const DEFAULT_POSTAMBLE: &str = r"\postamble

Generated from <PKG_NAME>.dtx, version <PKG_VERSION>.

\endpostamble
";

pub const DEFAULT_GENERATE: &str = r"\generate{
  \file{<PKG_NAME>.sty}{\from{<PKG_NAME>.dtx}{package}}
}
%</install>
%<install>\endbatchfile
%<*internal>
\usedir{source/latex/<PKG_NAME>}
\generate{
  \file{<PKG_NAME>.ins}{\from{<PKG_NAME>.dtx}{install}}
}
\nopreamble\nopostamble
\usedir{doc/latex/<PKG_NAME>}
\generate{
  \file{README.txt}{\from{<PKG_NAME>.dtx}{readme}}
}
\ifx\fmtname\nameofplainTeX
  \expandafter\endbatchfile
\else
  \expandafter\endgroup
\fi
%</internal>
%<*package>
<PKG_PACKAGES>
%</package>
%<*driver>
\documentclass{ltxdoc}
";

pub const DEFAULT_PREDOCUMENT: &str = r"\usepackage{tabularx}
\usepackage{makecell}
\usepackage{hyperref}
\usepackage[most]{tcolorbox}
\newtcolorbox{descriptionbox}{colback=white,colframe=black!40,title=Description}
\newtcolorbox{equationbox}{colback=blue!3,colframe=blue!40,title=Equation}
\newtcolorbox{examplebox}{colback=green!3,colframe=green!40!black,title=Example}
\newtcolorbox{warningbox}{colback=red!3,colframe=red!60!black,title=Errors}
\makeatletter
\newcommand\setlabel[2]{%
  \protected@edef\@currentlabel{#1}%
  \phantomsection\label{#2}%
}
\makeatother
\EnableCrossrefs
\CodelineIndex
\RecordChanges
";

pub const DEFAULT_DOCUMENT: &str = r"\begin{document}
    \title{The \textsf{<PKG_NAME>} package}
    \author{<PKG_AUTHOR> \\ \texttt{<PKG_AUTHOR_EMAIL>}}
    \date{<PKG_DATE> v<PKG_VERSION>}
    \maketitle
    \tableofcontents
    <PKG_INTRODUCTION>
    <PKG_EXAMPLE>
    \DocInput{<PKG_NAME>.dtx}
\end{document}
%</driver>
% \fi
";

/// The six header templates, unfilled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateSet {
    pub head: String,
    pub preamble: String,
    pub postamble: String,
    pub generate: String,
    pub predocument: String,
    pub document: String,
}

impl Default for TemplateSet {
    fn default() -> Self {
        Self {
            head: DEFAULT_HEAD.to_string(),
            preamble: DEFAULT_PREAMBLE.to_string(),
            postamble: DEFAULT_POSTAMBLE.to_string(),
            generate: DEFAULT_GENERATE.to_string(),
            predocument: DEFAULT_PREDOCUMENT.to_string(),
            document: DEFAULT_DOCUMENT.to_string(),
        }
    }
}

impl TemplateSet {
    /// Load all six templates from `dir`.
    ///
    /// A missing file is reported as [`Diagnostic::MissingTemplate`] and
    /// contributes nothing; a file that exists but cannot be read is fatal.
    pub fn load_dir(dir: &Path, diagnostics: &mut Diagnostics) -> Result<Self, Tex2DtxError> {
        let mut load = |name: &str| -> Result<String, Tex2DtxError> {
            let path = dir.join(name);
            if !path.is_file() {
                diagnostics.push(Diagnostic::MissingTemplate { path });
                return Ok(String::new());
            }
            debug!("Loading template {}", path.display());
            std::fs::read_to_string(&path).map_err(|e| Tex2DtxError::ReadFailed { path, source: e })
        };

        Ok(Self {
            head: load(HEAD_FILE)?,
            preamble: load(PREAMBLE_FILE)?,
            postamble: load(POSTAMBLE_FILE)?,
            generate: load(GENERATE_FILE)?,
            predocument: load(PREDOCUMENT_FILE)?,
            document: load(DOCUMENT_FILE)?,
        })
    }
}
