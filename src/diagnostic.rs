//! Diagnostics: ordered error records and their textual rendering.
//!
//! Every diagnostic renders as
//!
//! ```text
//! <file>:<line>: error near ``<token>'': <message>
//! ```
//!
//! optionally followed by a note line with the same prefix. Diagnostics are kept
//! in the order they were reported; nothing is sorted or deduplicated.

use crate::token::Token;
use std::fmt::Write as _;

/// Secondary text attached to failed dotted references.
pub const DOTTED_NOTE: &str = "Note: cannot resolve dotted items.";

/// Which pipeline stage produced the diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticKind {
    /// Fatal lexer condition (unterminated block comment).
    Lexical,
    /// Grammar violation; aborts the parse.
    Syntax,
    /// Size expression that could not be evaluated.
    Expression,
    /// Duplicate, unresolved or out-of-range construct.
    Semantic,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub line: usize,
    /// Offending lexeme, verbatim; empty at end of input.
    pub near: String,
    pub message: String,
    pub note: Option<String>,
}

impl Diagnostic {
    pub fn new(kind: DiagnosticKind, at: &Token, message: impl Into<String>) -> Self {
        Diagnostic {
            kind,
            line: at.line,
            near: at.text.clone(),
            message: message.into(),
            note: None,
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    /// Render this diagnostic (and its note) for `file`, one line each.
    pub fn render_into(&self, file: &str, out: &mut String) {
        let _ = writeln!(
            out,
            "{}:{}: error near ``{}'': {}",
            file, self.line, self.near, self.message
        );
        if let Some(note) = &self.note {
            let _ = writeln!(out, "{}:{}: error near ``{}'': {}", file, self.line, self.near, note);
        }
    }
}

/// Accumulates diagnostics for one compilation.
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    items: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        tracing::trace!(line = diagnostic.line, message = %diagnostic.message, "diagnostic");
        self.items.push(diagnostic);
    }

    /// Report a semantic error anchored at `at`.
    pub fn error(&mut self, at: &Token, message: impl Into<String>) {
        self.push(Diagnostic::new(DiagnosticKind::Semantic, at, message));
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
        self.items.iter()
    }

    pub fn render(&self, file: &str) -> String {
        let mut out = String::new();
        for diagnostic in &self.items {
            diagnostic.render_into(file, &mut out);
        }
        out
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::TokenKind;

    #[test]
    fn renders_primary_and_note_lines() {
        let semi = Token::new(TokenKind::Semi, ";", 3);
        let mut diags = Diagnostics::new();
        diags.push(
            Diagnostic::new(DiagnosticKind::Semantic, &semi, "Unknown size reference ``s.size''")
                .with_note(DOTTED_NOTE),
        );
        assert_eq!(
            diags.render("in.schema"),
            "in.schema:3: error near ``;'': Unknown size reference ``s.size''\n\
             in.schema:3: error near ``;'': Note: cannot resolve dotted items.\n"
        );
    }

    #[test]
    fn end_of_input_renders_empty_token() {
        let mut diags = Diagnostics::new();
        diags.push(Diagnostic::new(DiagnosticKind::Lexical, &Token::eof(1), "EOF in comment"));
        assert_eq!(diags.render("f"), "f:1: error near ``'': EOF in comment\n");
    }

    #[test]
    fn keeps_report_order() {
        let mut diags = Diagnostics::new();
        diags.error(&Token::new(TokenKind::Semi, ";", 9), "second");
        diags.error(&Token::new(TokenKind::Semi, ";", 1), "first");
        let lines: Vec<usize> = diags.iter().map(|d| d.line).collect();
        assert_eq!(lines, vec![9, 1]);
        assert_eq!(diags.len(), 2);
    }
}
