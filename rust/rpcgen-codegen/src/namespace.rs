//! Namespace framing for generated units.

use crate::Result;
use crate::code_writer::OutputSink;
use crate::cw_writeln;

/// Opening and closing lines of one namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NamespaceFrame<'a> {
    name: &'a str,
    padded: bool,
}

impl<'a> NamespaceFrame<'a> {
    pub fn new(name: &'a str) -> Self {
        Self {
            name,
            padded: false,
        }
    }

    /// A frame followed by a blank line after both its opening and its
    /// closing line.
    pub fn padded(name: &'a str) -> Self {
        Self { name, padded: true }
    }

    pub fn name(&self) -> &'a str {
        self.name
    }

    pub fn open(&self, sink: &mut dyn OutputSink) -> Result<()> {
        cw_writeln!(sink, "namespace {} {{", self.name)?;
        if self.padded {
            sink.blank_line()?;
        }
        Ok(())
    }

    pub fn close(&self, sink: &mut dyn OutputSink) -> Result<()> {
        cw_writeln!(sink, "}}  // namespace {}", self.name)?;
        if self.padded {
            sink.blank_line()?;
        }
        Ok(())
    }
}

/// Run `body` inside `frame`.
///
/// The closing line is written on every exit path, including when `body`
/// fails; the body's error is returned after the frame is closed. With no
/// frame the body runs unframed.
pub fn with_namespace<F>(
    sink: &mut dyn OutputSink,
    frame: Option<NamespaceFrame<'_>>,
    body: F,
) -> Result<()>
where
    F: FnOnce(&mut dyn OutputSink) -> Result<()>,
{
    let Some(frame) = frame else {
        return body(sink);
    };

    frame.open(sink)?;
    let result = body(&mut *sink);
    let closed = frame.close(sink);
    result.and(closed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CodegenError;
    use crate::code_writer::CodeWriter;

    #[test]
    fn frames_body() {
        let mut w = CodeWriter::new(String::new(), "t.h");
        with_namespace(&mut w, Some(NamespaceFrame::new("foo::bar")), |sink| {
            sink.write_line("int x;")?;
            Ok(())
        })
        .unwrap();

        assert_eq!(
            w.into_inner(),
            "namespace foo::bar {\nint x;\n}  // namespace foo::bar\n"
        );
    }

    #[test]
    fn padded_frames_add_blank_lines() {
        let mut w = CodeWriter::new(String::new(), "t.h");
        with_namespace(&mut w, Some(NamespaceFrame::padded("ns")), |_| Ok(())).unwrap();

        assert_eq!(w.into_inner(), "namespace ns {\n\n}  // namespace ns\n\n");
    }

    #[test]
    fn no_frame_means_no_framing() {
        let mut w = CodeWriter::new(String::new(), "t.h");
        with_namespace(&mut w, None, |sink| {
            sink.write_line("int x;")?;
            Ok(())
        })
        .unwrap();

        assert_eq!(w.into_inner(), "int x;\n");
    }

    #[test]
    fn frame_is_closed_when_body_fails() {
        let mut w = CodeWriter::new(String::new(), "t.h");
        let err = with_namespace(&mut w, Some(NamespaceFrame::new("ns")), |sink| {
            sink.write_line("partial")?;
            Err(CodegenError::Write(std::fmt::Error))
        })
        .unwrap_err();

        assert!(matches!(err, CodegenError::Write(_)));
        assert_eq!(
            w.into_inner(),
            "namespace ns {\npartial\n}  // namespace ns\n"
        );
    }
}
