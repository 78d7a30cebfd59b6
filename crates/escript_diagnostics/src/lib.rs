//! escript_diagnostics: Error reporting for the compiler front end.
//!
//! Diagnostics carry a severity, the source position, and the raw text of
//! the offending line. Rendering produces the classic compiler form of
//! message, source line, and a caret line marking the column. Messages are
//! emitted through a sink as they are discovered, not batched.

use std::fmt;

/// Severity of a reported diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

/// A realized diagnostic with location information.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub severity: Severity,
    /// Source file name. `None` renders as the stdin placeholder.
    pub filename: Option<String>,
    /// 1-based line number, or `None` when no position is known.
    pub line_number: Option<u32>,
    /// 0-based column of the offending token.
    pub column: usize,
    /// The raw text of the source line, when available.
    pub current_line: Option<String>,
    pub message: String,
}

impl Diagnostic {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            filename: None,
            line_number: None,
            column: 0,
            current_line: None,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            ..Self::error(message)
        }
    }

    pub fn at(
        mut self,
        filename: Option<&str>,
        line_number: u32,
        column: usize,
        current_line: Option<&str>,
    ) -> Self {
        self.filename = filename.map(|f| f.to_string());
        self.line_number = Some(line_number);
        self.column = column;
        self.current_line = current_line.map(|l| l.to_string());
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    /// Render the full multi-line diagnostic block.
    pub fn render(&self, app_name: &str) -> String {
        let filename = match self.filename.as_deref() {
            Some("") | None => "stdin",
            Some(name) => name,
        };
        let line_number = self.line_number.unwrap_or(0);
        match self.current_line.as_deref() {
            Some(line) => {
                let highlight = make_highlight(line, self.column);
                format!(
                    "{}: {}: {}: {}: {}\n  {}\n  {}\n",
                    app_name, filename, line_number, self.severity, self.message, line, highlight
                )
            }
            None => format!(
                "{}: {}: {}: {}: {}\n",
                app_name, filename, line_number, self.severity, self.message
            ),
        }
    }
}

/// Build a caret line for `src` with a `^` marker at `column`.
///
/// Tabs are copied verbatim so the caret lines up under any tab stop
/// convention; every other character becomes a space. A column past the
/// end of a short line is clamped to one past the last character so the
/// caret is always visible.
pub fn make_highlight(src: &str, column: usize) -> String {
    let mut dest: Vec<char> = src
        .chars()
        .map(|c| if c == '\t' { '\t' } else { ' ' })
        .collect();
    let column = column.min(dest.len());
    if column == dest.len() {
        dest.push('^');
    } else {
        dest[column] = '^';
        dest.truncate(column + 1);
    }
    dest.into_iter().collect()
}

/// Receives rendered diagnostic text. Implementations decide where the
/// text goes: stderr, a log, or a test buffer.
pub trait DiagnosticSink {
    fn emit(&mut self, diagnostic: &Diagnostic, rendered: &str);
}

/// Writes rendered diagnostics to stderr.
#[derive(Debug, Default)]
pub struct StderrSink;

impl DiagnosticSink for StderrSink {
    fn emit(&mut self, _diagnostic: &Diagnostic, rendered: &str) {
        eprint!("{}", rendered);
    }
}

/// A sink that retains rendered text, for tests and embedders that want
/// to present diagnostics themselves.
#[derive(Debug, Default)]
pub struct BufferSink {
    pub rendered: Vec<String>,
}

impl DiagnosticSink for BufferSink {
    fn emit(&mut self, _diagnostic: &Diagnostic, rendered: &str) {
        self.rendered.push(rendered.to_string());
    }
}

/// Diagnostics accumulated by a producer that has no sink of its own.
/// The lexer queues here and the parser drains into its `Reporter`.
#[derive(Debug, Default)]
pub struct DiagnosticCollection {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn drain(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.diagnostics)
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }
}

/// Owns the sink and the error/warning counters for one compilation.
pub struct Reporter {
    app_name: String,
    tab_width: usize,
    sink: Box<dyn DiagnosticSink>,
    diagnostics: Vec<Diagnostic>,
    error_count: usize,
    warning_count: usize,
}

impl Reporter {
    pub fn new(app_name: impl Into<String>, tab_width: usize, sink: Box<dyn DiagnosticSink>) -> Self {
        Self {
            app_name: app_name.into(),
            tab_width,
            sink,
            diagnostics: Vec::new(),
            error_count: 0,
            warning_count: 0,
        }
    }

    /// Count, render, and emit one diagnostic.
    pub fn report(&mut self, diagnostic: Diagnostic) {
        match diagnostic.severity {
            Severity::Error => self.error_count += 1,
            Severity::Warning => self.warning_count += 1,
        }
        let rendered = diagnostic.render(&self.app_name);
        self.sink.emit(&diagnostic, &rendered);
        self.diagnostics.push(diagnostic);
    }

    pub fn report_all(&mut self, diagnostics: impl IntoIterator<Item = Diagnostic>) {
        for d in diagnostics {
            self.report(d);
        }
    }

    pub fn error_count(&self) -> usize {
        self.error_count
    }

    pub fn warning_count(&self) -> usize {
        self.warning_count
    }

    pub fn tab_width(&self) -> usize {
        self.tab_width
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }
}

impl fmt::Debug for Reporter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reporter")
            .field("errors", &self.error_count)
            .field("warnings", &self.warning_count)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_highlight_plain_column() {
        assert_eq!(make_highlight("var x = ;", 8), "        ^");
    }

    #[test]
    fn test_highlight_copies_tabs() {
        let caret = make_highlight("\tvar x = ;", 1);
        assert_eq!(caret, "\t^");
    }

    #[test]
    fn test_highlight_clamps_past_end() {
        assert_eq!(make_highlight("ab", 10), "  ^");
    }

    #[test]
    fn test_render_with_source_line() {
        let d = Diagnostic::error("Expecting \";\"").at(Some("t.es"), 3, 4, Some("x = 1 2"));
        let text = d.render("ec");
        assert!(text.starts_with("ec: t.es: 3: error: Expecting \";\"\n"));
        assert!(text.contains("\n  x = 1 2\n"));
        assert!(text.ends_with("\n      ^\n"));
    }

    #[test]
    fn test_render_defaults_to_stdin() {
        let d = Diagnostic::error("bad");
        assert_eq!(d.render("ec"), "ec: stdin: 0: error: bad\n");
    }

    #[test]
    fn test_reporter_counts() {
        let mut reporter = Reporter::new("ec", 4, Box::new(BufferSink::default()));
        reporter.report(Diagnostic::error("one"));
        reporter.report(Diagnostic::warning("two"));
        reporter.report(Diagnostic::error("three"));
        assert_eq!(reporter.error_count(), 2);
        assert_eq!(reporter.warning_count(), 1);
    }
}
