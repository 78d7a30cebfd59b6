//! Character streams with single-character putback.
//!
//! A stream owns the whole source text as characters. File streams read
//! the file up front, memory streams wrap a supplied string, and console
//! streams pull lines through a callback. Line and column tracking keeps
//! a one-deep shadow of the previous line so that putting back a newline
//! exactly reverses the advance; deeper putback is not supported.

use escript_core::EcError;
use std::fs;
use std::sync::Arc;

/// Upper bound on source file size. Larger inputs are rejected rather
/// than buffered.
pub const MAX_SOURCE_SIZE: u64 = 10 * 1024 * 1024;

/// Stream name used for console and in-memory input.
pub const INPUT_STREAM_NAME: &str = "__stdin__";

/// Supplies the next console line, or `None` when no more input is
/// available right now.
pub type ConsoleGets = Box<dyn FnMut() -> Option<String>>;

pub struct Stream {
    name: Arc<str>,
    buf: Vec<char>,
    next: usize,
    line_number: u32,
    column: usize,
    line_start: usize,
    /// Shadow state for one newline putback.
    last_line_start: usize,
    last_column: usize,
    /// Console end of line reached; the lexer reports NOP, not EOF.
    eol: bool,
    eof: bool,
    interactive: bool,
    gets: Option<ConsoleGets>,
}

impl Stream {
    fn new(name: &str, text: &str) -> Self {
        Self {
            name: Arc::from(name),
            buf: text.chars().collect(),
            next: 0,
            line_number: 1,
            column: 0,
            line_start: 0,
            last_line_start: 0,
            last_column: 0,
            eol: false,
            eof: false,
            interactive: false,
            gets: None,
        }
    }

    /// Open a file stream, reading the whole file into memory.
    pub fn file(path: &str) -> Result<Self, EcError> {
        let meta = fs::metadata(path).map_err(|source| EcError::Open {
            path: path.to_string(),
            source,
        })?;
        if meta.len() > MAX_SOURCE_SIZE {
            return Err(EcError::SourceTooLarge {
                path: path.to_string(),
                size: meta.len(),
                limit: MAX_SOURCE_SIZE,
            });
        }
        let text = fs::read_to_string(path).map_err(|source| EcError::Read {
            path: path.to_string(),
            source,
        })?;
        Ok(Self::new(path, &text))
    }

    /// Wrap a caller-supplied buffer.
    pub fn memory(name: &str, text: &str) -> Self {
        Self::new(name, text)
    }

    /// Console stream. In interactive mode the end of each supplied line
    /// becomes a soft end of line (the lexer emits NOP) until
    /// `clear_eol` is called; otherwise exhausting the callback is end
    /// of file.
    pub fn console(gets: ConsoleGets, interactive: bool) -> Self {
        let mut stream = Self::new(INPUT_STREAM_NAME, "");
        stream.gets = Some(gets);
        stream.interactive = interactive;
        stream
    }

    pub fn name(&self) -> &Arc<str> {
        &self.name
    }

    pub fn line_number(&self) -> u32 {
        self.line_number
    }

    pub fn column(&self) -> usize {
        self.column
    }

    pub fn eof(&self) -> bool {
        self.eof
    }

    pub fn at_eol(&self) -> bool {
        self.eol
    }

    /// Clear the console soft end-of-line so the next read pulls a new
    /// line. The driver calls this between interactive chunks.
    pub fn clear_eol(&mut self) {
        self.eol = false;
    }

    /// Text of the line currently being read, for diagnostics.
    pub fn current_line(&self) -> Option<String> {
        if self.line_start >= self.buf.len() {
            return None;
        }
        Some(self.line_text(self.line_start))
    }

    fn line_text(&self, start: usize) -> String {
        let end = self.buf[start..]
            .iter()
            .position(|&c| c == '\n')
            .map(|p| start + p)
            .unwrap_or(self.buf.len());
        self.buf[start..end].iter().collect()
    }

    /// Discard a leading `#!interpreter` line so executable scripts
    /// compile unchanged. No effect when the source has no shebang.
    pub fn skip_shebang(&mut self) {
        if self.next == 0 && self.buf.first() == Some(&'#') && self.buf.get(1) == Some(&'!') {
            loop {
                let c = self.next_char();
                if c == '\n' || c == '\0' {
                    break;
                }
            }
        }
    }

    /// Pull the next character, or `'\0'` at end of input. Consults the
    /// console callback when the buffer is exhausted.
    pub fn next_char(&mut self) -> char {
        if self.next >= self.buf.len() && !self.refill() {
            return '\0';
        }
        let c = self.buf[self.next];
        self.next += 1;
        if c == '\n' {
            self.line_number += 1;
            self.last_column = self.column;
            self.column = 0;
            self.last_line_start = self.line_start;
            self.line_start = self.next;
        } else {
            self.column += 1;
        }
        c
    }

    /// Undo the immediately preceding `next_char`. Only one level is
    /// supported; a newline putback restores the previous line's
    /// tracking from the shadow state.
    pub fn put_back_char(&mut self, c: char) {
        if self.next == 0 || c == '\0' {
            return;
        }
        self.next -= 1;
        debug_assert_eq!(self.buf[self.next], c);
        if c == '\n' {
            self.line_start = self.last_line_start;
            self.column = self.last_column + 1;
            self.line_number -= 1;
        }
        self.column = self.column.saturating_sub(1);
    }

    fn refill(&mut self) -> bool {
        if self.eof || self.eol {
            return false;
        }
        let Some(gets) = self.gets.as_mut() else {
            self.eof = true;
            return false;
        };
        match gets() {
            Some(line) => {
                let line = line.trim_end_matches(['\r', '\n']);
                self.buf = line.chars().collect();
                self.next = 0;
                self.line_start = 0;
                self.last_line_start = 0;
                self.line_number = 1;
                self.column = 0;
                self.last_column = 0;
                if self.interactive {
                    // Report this line's tokens, then a soft end of line.
                    self.eol = true;
                }
                !self.buf.is_empty()
            }
            None => {
                self.eof = true;
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advance_tracks_line_and_column() {
        let mut s = Stream::memory("t.es", "ab\ncd");
        assert_eq!(s.next_char(), 'a');
        assert_eq!(s.next_char(), 'b');
        assert_eq!((s.line_number(), s.column()), (1, 2));
        assert_eq!(s.next_char(), '\n');
        assert_eq!((s.line_number(), s.column()), (2, 0));
        assert_eq!(s.next_char(), 'c');
        assert_eq!(s.current_line().as_deref(), Some("cd"));
    }

    #[test]
    fn test_put_back_reverses_one_advance() {
        let mut s = Stream::memory("t.es", "xy");
        let c = s.next_char();
        s.put_back_char(c);
        assert_eq!(s.column(), 0);
        assert_eq!(s.next_char(), 'x');
    }

    #[test]
    fn test_put_back_newline_restores_previous_line() {
        let mut s = Stream::memory("t.es", "ab\ncd");
        s.next_char();
        s.next_char();
        let nl = s.next_char();
        assert_eq!(nl, '\n');
        s.put_back_char(nl);
        assert_eq!(s.line_number(), 1);
        assert_eq!(s.column(), 2);
        assert_eq!(s.current_line().as_deref(), Some("ab"));
        assert_eq!(s.next_char(), '\n');
        assert_eq!(s.line_number(), 2);
    }

    #[test]
    fn test_end_of_memory_stream() {
        let mut s = Stream::memory("t.es", "a");
        s.next_char();
        assert_eq!(s.next_char(), '\0');
        assert!(s.eof());
        assert!(!s.at_eol());
    }

    #[test]
    fn test_interactive_console_soft_eol() {
        let mut lines = vec!["x = 1".to_string()].into_iter();
        let mut s = Stream::console(Box::new(move || lines.next()), true);
        let mut text = String::new();
        loop {
            let c = s.next_char();
            if c == '\0' {
                break;
            }
            text.push(c);
        }
        assert_eq!(text, "x = 1");
        assert!(s.at_eol());
        assert!(!s.eof());
        s.clear_eol();
        assert_eq!(s.next_char(), '\0');
        assert!(s.eof());
    }

    #[test]
    fn test_one_shot_console_hits_eof() {
        let mut lines = vec!["1 + 2".to_string()].into_iter();
        let mut s = Stream::console(Box::new(move || lines.next()), false);
        let mut count = 0;
        while s.next_char() != '\0' {
            count += 1;
        }
        assert_eq!(count, 5);
        assert!(s.eof());
    }
}
