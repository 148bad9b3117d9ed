//! Line-oriented output sink with scoped indentation.
//!
//! Generators never touch files. They write whole lines to an [`OutputSink`]
//! and acquire indentation through [`OutputSink::indent`], which hands back an
//! [`IndentGuard`]. The guard restores the previous column when it is dropped,
//! so an early `?` return can't leave the sink over-indented.
//!
//! # Example
//!
//! ```
//! use rpcgen_codegen::code_writer::{CodeWriter, OutputSink};
//! use rpcgen_codegen::cw_writeln;
//!
//! let mut w = CodeWriter::new(String::new(), "example.h");
//!
//! w.write_line("class Example {").unwrap();
//! {
//!     let _indent = w.indent(2);
//!     cw_writeln!(w, "int value = {};", 42).unwrap();
//! }
//! w.write_line("};").unwrap();
//!
//! assert_eq!(w.into_inner(), "class Example {\n  int value = 42;\n};\n");
//! ```

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

/// Destination for generated code.
pub trait OutputSink {
    /// Logical name of the generated unit, used for banners and self-includes.
    fn name(&self) -> &str;

    /// Append one line at the current indentation. An empty string writes a
    /// blank line.
    fn write_line(&mut self, text: &str) -> fmt::Result;

    /// Indent subsequent lines by `columns` more spaces until the guard drops.
    fn indent(&mut self, columns: usize) -> IndentGuard;

    fn blank_line(&mut self) -> fmt::Result {
        self.write_line("")
    }

    /// Use the `cw_writeln!` macro instead of calling this directly.
    #[doc(hidden)]
    fn write_line_fmt(&mut self, args: fmt::Arguments<'_>) -> fmt::Result {
        match args.as_str() {
            Some(text) => self.write_line(text),
            None => self.write_line(&args.to_string()),
        }
    }
}

/// An [`OutputSink`] over any `fmt::Write`.
pub struct CodeWriter<W> {
    writer: W,
    name: String,
    indent_columns: Rc<Cell<usize>>,
}

impl<W: fmt::Write> CodeWriter<W> {
    pub fn new(writer: W, name: impl Into<String>) -> Self {
        Self {
            writer,
            name: name.into(),
            indent_columns: Rc::new(Cell::new(0)),
        }
    }

    /// Current indentation, in columns.
    pub fn indent_columns(&self) -> usize {
        self.indent_columns.get()
    }

    /// Consume the writer and return the inner writer
    pub fn into_inner(self) -> W {
        self.writer
    }

    /// Get a reference to the inner writer
    pub fn inner(&self) -> &W {
        &self.writer
    }
}

impl<W: fmt::Write> OutputSink for CodeWriter<W> {
    fn name(&self) -> &str {
        &self.name
    }

    /// Text containing newlines is split, and every non-empty piece is
    /// indented. Blank lines never carry trailing spaces.
    fn write_line(&mut self, text: &str) -> fmt::Result {
        let columns = self.indent_columns.get();
        for line in text.split('\n') {
            if !line.is_empty() {
                write!(self.writer, "{:columns$}{line}", "")?;
            }
            self.writer.write_char('\n')?;
        }
        Ok(())
    }

    fn indent(&mut self, columns: usize) -> IndentGuard {
        IndentGuard::new(Rc::clone(&self.indent_columns), columns)
    }
}

/// RAII guard that keeps an indentation level alive.
///
/// Shares the column counter through `Rc<Cell<usize>>`, so holding a guard
/// doesn't borrow the sink.
pub struct IndentGuard {
    indent_columns: Rc<Cell<usize>>,
    columns: usize,
}

impl IndentGuard {
    /// Add `columns` to `indent_columns` until the guard drops.
    ///
    /// Sinks implemented outside this crate keep their own counter and hand a
    /// clone of it to every guard they return from [`OutputSink::indent`].
    pub fn new(indent_columns: Rc<Cell<usize>>, columns: usize) -> Self {
        indent_columns.set(indent_columns.get() + columns);
        Self {
            indent_columns,
            columns,
        }
    }
}

impl Drop for IndentGuard {
    fn drop(&mut self) {
        let current = self.indent_columns.get();
        self.indent_columns
            .set(current.saturating_sub(self.columns));
    }
}

/// Write a formatted line to an [`OutputSink`] (like `std::writeln!`).
///
/// # Example
/// ```ignore
/// cw_writeln!(sink, "static constexpr uint32_t kServiceId = {id};")?;
/// ```
#[macro_export]
macro_rules! cw_writeln {
    ($sink:expr, $($arg:tt)*) => {
        $sink.write_line_fmt(format_args!($($arg)*))
    };
}
