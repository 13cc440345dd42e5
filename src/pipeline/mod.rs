//! Pipeline stages for annotated-source-to-dtx conversion.
//!
//! Each submodule implements exactly one transformation step. Only
//! [`input`] touches the file system; everything after it is a pure function
//! of its arguments plus a [`crate::error::Diagnostics`] sink.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ classify ──▶ command ──▶ assemble
//! (files)   (blocks)     (Command)   (document)
//!                                       │
//!                                  substitute (#N → names)
//! ```
//!
//! 1. [`input`]      — list the resource directory, derive section keys,
//!    read sources into lines and the `docu/` fragments into strings
//! 2. [`classify`]   — line state machine that cuts a file into blocks and
//!    keeps the command blocks
//! 3. [`command`]    — extract name, parameters, default value, annotations
//!    and the implementation body from one block
//! 4. [`substitute`] — rewrite `#N` references inside annotation text
//! 5. [`assemble`]   — summary tables, documentation and implementation
//!    blocks, template header

pub mod assemble;
pub mod classify;
pub mod command;
pub mod input;
pub mod substitute;
