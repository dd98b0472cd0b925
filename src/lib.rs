//! # wireschema — compiler front end for a presentation-language schema DSL
//!
//! Lexes, parses and validates schema descriptions of wire formats (handshake
//! message layouts and the like) and reports every problem as a line-anchored
//! diagnostic, in the order it was detected.
//!
//! ## Language
//!
//! - Scalars: `uint8`, `uint16`, `uint24`, `uint32`, `uint64`, `opaque`
//! - Bounds: fixed `x[n]` or variable `x<lo..hi>`; sizes may be literals, `2^N[-1]`
//!   shorthand, or the name of a previously declared value
//! - `enum { a(1), b(2), (255) } Name;` with an optional trailing maximum
//! - `struct { ... } Name;` with nested structs and `select` variants
//! - `select (selector) { case a: case b: body ... } [Name];`
//! - `extern Name;` forward declarations, visible everywhere in the file
//! - `//` line comments and nesting `/* */` block comments
//!
//! ## Example
//!
//! ```text
//! extern Extension; extern extensions_present;
//! uint8 ProtocolVersion; opaque Random[12]; opaque SessionID[2^8-1];
//! struct {
//!     ProtocolVersion client_version;
//!     Random random;
//!     SessionID session_id;
//!     select (extensions_present) {
//!         case false: ;
//!         case true: Extension extensions<0..2^16-1>;
//!     };
//! } ClientHello;
//! ```
//!
//! ## Diagnostics
//!
//! ```text
//! <file>:<line>: error near ``<token>'': <message>
//! ```
//!
//! An empty diagnostic list means the schema is valid.

pub mod ast;
pub mod diagnostic;
pub mod dump;
pub mod expr;
pub mod lexer;
pub mod parser;
pub mod resolve;
pub mod symbols;
pub mod token;

pub use ast::Schema;
pub use diagnostic::{Diagnostic, DiagnosticKind, Diagnostics};
pub use resolve::Resolution;

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Per-compilation settings.
#[derive(Debug, Clone)]
pub struct CompileOptions {
    /// File name printed in diagnostics.
    pub file_label: String,
    /// Attach the dotted-name note only to the first dotted reference failure.
    pub dotted_note_once: bool,
}

impl Default for CompileOptions {
    fn default() -> Self {
        CompileOptions {
            file_label: "<input>".to_string(),
            dotted_note_once: true,
        }
    }
}

impl CompileOptions {
    pub fn labelled(label: impl Into<String>) -> Self {
        CompileOptions {
            file_label: label.into(),
            ..CompileOptions::default()
        }
    }
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("{}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Outcome of compiling one source.
#[derive(Debug, Clone)]
pub struct Compilation {
    pub file_label: String,
    /// `None` only when lexing failed.
    pub schema: Option<Schema>,
    pub resolution: Option<Resolution>,
    pub diagnostics: Diagnostics,
}

impl Compilation {
    pub fn is_ok(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Diagnostics in the textual output format, one line each.
    pub fn render(&self) -> String {
        self.diagnostics.render(&self.file_label)
    }
}

/// Compile schema `source`.
pub fn compile(source: &str, options: &CompileOptions) -> Compilation {
    let mut diagnostics = Diagnostics::new();
    let tokens = match lexer::tokenize(source) {
        Ok(tokens) => tokens,
        Err(e) => {
            diagnostics.push(e.into_diagnostic());
            return Compilation {
                file_label: options.file_label.clone(),
                schema: None,
                resolution: None,
                diagnostics,
            };
        }
    };

    let parsed = parser::parse(&tokens);
    let resolution = resolve::analyze(&parsed.schema, options, &mut diagnostics);
    if let Some(error) = parsed.error {
        diagnostics.push(error.into_diagnostic());
    }
    tracing::debug!(label = %options.file_label, errors = diagnostics.len(), "compiled");

    Compilation {
        file_label: options.file_label.clone(),
        schema: Some(parsed.schema),
        resolution: Some(resolution),
        diagnostics,
    }
}

/// Read and compile the file at `path`, labelling diagnostics with the path as given.
pub fn compile_file(path: &Path, options: &CompileOptions) -> Result<Compilation, LoadError> {
    let source = std::fs::read_to_string(path).map_err(|source| LoadError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let options = CompileOptions {
        file_label: path.display().to_string(),
        ..options.clone()
    };
    Ok(compile(&source, &options))
}
