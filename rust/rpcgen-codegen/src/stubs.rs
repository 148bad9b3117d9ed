//! Implementation skeletons for the services of a package.
//!
//! The block is wrapped in `#ifdef <guard>` so it only compiles on request.
//! It holds one implementation class per service, declaring every method,
//! followed by empty definitions of the same methods that a developer can
//! copy and fill in.

use rpcgen_schema::{CallPattern, MethodDetail, PackageNode, ServiceDetail};
use tracing::debug;

use crate::code_writer::OutputSink;
use crate::cw_writeln;
use crate::namespace::{NamespaceFrame, with_namespace};
use crate::{CodegenError, CodegenOptions, Result};

pub const STUB_REQUEST_TODO: &str =
    "// TODO: Read the request as appropriate for your application";
pub const STUB_RESPONSE_TODO: &str =
    "// TODO: Fill in the response as appropriate for your application";
pub const STUB_WRITER_TODO: &str =
    "// TODO: Send responses with the writer as appropriate for your application";

const STUBS_BANNER: &[&str] = &[
    "/*",
    " * ================================================================",
    " *   Implementation stubs",
    " * ================================================================",
    " */",
];

const STUBS_COMMENT: &[&str] = &[
    "// This section provides stub implementations of the RPC services in this file.",
    "// The code below may be referenced or copied to serve as a starting point for",
    "// your RPC service implementations.",
];

/// Backend-specific shape of stub signatures and bodies.
pub trait StubGenerator {
    /// Signature of a unary method, with `prefix` before the method name
    /// (empty inside the class, `Service::` for out-of-class definitions).
    fn unary_signature(&self, method: &MethodDetail, prefix: &str) -> String;

    /// Body of a unary method.
    fn unary_stub(&self, method: &MethodDetail, sink: &mut dyn OutputSink) -> Result<()>;

    /// Signature of a server streaming method.
    fn server_streaming_signature(&self, method: &MethodDetail, prefix: &str) -> String;

    /// Body of a server streaming method. By default it only marks both
    /// parameters as used.
    fn server_streaming_stub(
        &self,
        method: &MethodDetail,
        sink: &mut dyn OutputSink,
    ) -> Result<()> {
        let _ = method;
        sink.write_line(STUB_REQUEST_TODO)?;
        sink.write_line("static_cast<void>(request);")?;
        sink.write_line(STUB_WRITER_TODO)?;
        sink.write_line("static_cast<void>(writer);")?;
        Ok(())
    }
}

/// Call patterns stub generation can handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StubKind {
    Unary,
    ServerStreaming,
}

impl StubKind {
    /// Pick the stub kind for `method`.
    ///
    /// Client and bidirectional streaming have no stub shape and fail the run.
    pub fn select(method: &MethodDetail) -> Result<Self> {
        match method.call_pattern {
            CallPattern::Unary => Ok(Self::Unary),
            CallPattern::ServerStreaming => Ok(Self::ServerStreaming),
            pattern @ (CallPattern::ClientStreaming | CallPattern::BidirectionalStreaming) => {
                Err(CodegenError::UnsupportedCallPattern {
                    method: method.path.clone(),
                    pattern,
                })
            }
        }
    }

    pub fn signature(
        self,
        generator: &dyn StubGenerator,
        method: &MethodDetail,
        prefix: &str,
    ) -> String {
        match self {
            Self::Unary => generator.unary_signature(method, prefix),
            Self::ServerStreaming => generator.server_streaming_signature(method, prefix),
        }
    }

    pub fn write_stub(
        self,
        generator: &dyn StubGenerator,
        method: &MethodDetail,
        sink: &mut dyn OutputSink,
    ) -> Result<()> {
        match self {
            Self::Unary => generator.unary_stub(method, sink),
            Self::ServerStreaming => generator.server_streaming_stub(method, sink),
        }
    }
}

/// Generate the stub block for every service of `package`.
pub fn package_stubs(
    package: &PackageNode,
    sink: &mut dyn OutputSink,
    generator: &dyn StubGenerator,
    options: &CodegenOptions,
) -> Result<()> {
    let namespace = package.cpp_namespace();
    let frame = namespace.as_deref().map(NamespaceFrame::padded);
    let services: Vec<&ServiceDetail> = package.services().collect();

    debug!(package = %package.path, services = services.len(), "generating stubs");

    cw_writeln!(sink, "#ifdef {}", options.stubs_guard)?;
    sink.blank_line()?;
    if options.stub_banner {
        for line in STUBS_BANNER {
            sink.write_line(line)?;
        }
    }
    for line in STUBS_COMMENT {
        sink.write_line(line)?;
    }
    sink.blank_line()?;

    let unit = sink.name().to_string();
    cw_writeln!(sink, "#include \"{unit}\"")?;
    sink.blank_line()?;

    with_namespace(sink, frame, |sink| {
        for service in &services {
            service_stub_class(service, sink, generator)?;
        }
        sink.blank_line()?;
        Ok(())
    })?;

    with_namespace(sink, frame, |sink| {
        for service in &services {
            service_stub_definitions(service, sink, generator)?;
            sink.blank_line()?;
        }
        Ok(())
    })?;

    cw_writeln!(sink, "#endif  // {}", options.stubs_guard)?;
    Ok(())
}

fn service_stub_class(
    service: &ServiceDetail,
    sink: &mut dyn OutputSink,
    generator: &dyn StubGenerator,
) -> Result<()> {
    let name = service.name.as_str();

    cw_writeln!(sink, "// Implementation class for {}.", service.path)?;
    write_doc(service.doc.as_deref(), sink)?;
    cw_writeln!(sink, "class {name} : public generated::{name}<{name}> {{")?;
    sink.write_line(" public:")?;

    {
        let _indent = sink.indent(2);
        for (i, method) in service.methods.iter().enumerate() {
            if i > 0 {
                sink.blank_line()?;
            }
            let kind = StubKind::select(method)?;
            write_doc(method.doc.as_deref(), sink)?;
            cw_writeln!(sink, "{};", kind.signature(generator, method, ""))?;
        }
    }

    sink.write_line("};")?;
    sink.blank_line()?;
    Ok(())
}

/// Schema documentation as `//` comments, one per line.
fn write_doc(doc: Option<&str>, sink: &mut dyn OutputSink) -> Result<()> {
    for line in doc.into_iter().flat_map(str::lines) {
        let line = line.trim_end();
        if line.is_empty() {
            sink.write_line("//")?;
        } else {
            cw_writeln!(sink, "// {line}")?;
        }
    }
    Ok(())
}

fn service_stub_definitions(
    service: &ServiceDetail,
    sink: &mut dyn OutputSink,
    generator: &dyn StubGenerator,
) -> Result<()> {
    let prefix = format!("{}::", service.name);

    cw_writeln!(sink, "// Method definitions for {}.", service.path)?;

    for (i, method) in service.methods.iter().enumerate() {
        if i > 0 {
            sink.blank_line()?;
        }
        let kind = StubKind::select(method)?;
        cw_writeln!(sink, "{} {{", kind.signature(generator, method, &prefix))?;
        {
            let _indent = sink.indent(2);
            kind.write_stub(generator, method, sink)?;
        }
        sink.write_line("}")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::code_writer::CodeWriter;
    use insta::assert_snapshot;
    use rpcgen_schema::MethodDetail;

    /// Minimal generator that keeps the default server streaming stub.
    struct Minimal;

    impl StubGenerator for Minimal {
        fn unary_signature(&self, method: &MethodDetail, prefix: &str) -> String {
            format!("void {prefix}{}(int request, int& response)", method.name)
        }

        fn unary_stub(&self, _method: &MethodDetail, sink: &mut dyn OutputSink) -> Result<()> {
            sink.write_line("response = request;")?;
            Ok(())
        }

        fn server_streaming_signature(&self, method: &MethodDetail, prefix: &str) -> String {
            format!("void {prefix}{}(int request, Writer& writer)", method.name)
        }
    }

    /// Generator overriding the server streaming body.
    struct Overriding;

    impl StubGenerator for Overriding {
        fn unary_signature(&self, method: &MethodDetail, prefix: &str) -> String {
            Minimal.unary_signature(method, prefix)
        }

        fn unary_stub(&self, method: &MethodDetail, sink: &mut dyn OutputSink) -> Result<()> {
            Minimal.unary_stub(method, sink)
        }

        fn server_streaming_signature(&self, method: &MethodDetail, prefix: &str) -> String {
            Minimal.server_streaming_signature(method, prefix)
        }

        fn server_streaming_stub(
            &self,
            _method: &MethodDetail,
            sink: &mut dyn OutputSink,
        ) -> Result<()> {
            sink.write_line("writer.Finish();")?;
            Ok(())
        }
    }

    fn package(method: MethodDetail) -> PackageNode {
        PackageNode::new("foo.bar")
            .with_namespace("foo.bar")
            .with_service(ServiceDetail::new("foo.bar.Greeter").with_method(method))
    }

    fn render(package: &PackageNode, generator: &dyn StubGenerator) -> Result<String> {
        let mut w = CodeWriter::new(String::new(), "foo/bar/greeter.rpc.pb.h");
        let options = CodegenOptions {
            stub_banner: false,
            ..CodegenOptions::default()
        };
        package_stubs(package, &mut w, generator, &options)?;
        Ok(w.into_inner())
    }

    #[test]
    fn default_server_streaming_stub() {
        let method = MethodDetail::server_streaming("SayHello", "foo.bar.Req", "foo.bar.Resp");
        let mut w = CodeWriter::new(String::new(), "t.h");
        StubKind::select(&method)
            .unwrap()
            .write_stub(&Minimal, &method, &mut w)
            .unwrap();

        assert_snapshot!(w.into_inner(), @r"
        // TODO: Read the request as appropriate for your application
        static_cast<void>(request);
        // TODO: Send responses with the writer as appropriate for your application
        static_cast<void>(writer);
        ");
    }

    #[test]
    fn server_streaming_package_uses_default_body() {
        let package = package(MethodDetail::server_streaming(
            "SayHello",
            "foo.bar.Req",
            "foo.bar.Resp",
        ));
        let out = render(&package, &Minimal).unwrap();

        assert!(out.contains(
            "void Greeter::SayHello(int request, Writer& writer) {\n  \
             // TODO: Read the request as appropriate for your application\n  \
             static_cast<void>(request);\n  \
             // TODO: Send responses with the writer as appropriate for your application\n  \
             static_cast<void>(writer);\n}\n"
        ));
    }

    #[test]
    fn backends_may_override_server_streaming_body() {
        let package = package(MethodDetail::server_streaming(
            "SayHello",
            "foo.bar.Req",
            "foo.bar.Resp",
        ));
        let out = render(&package, &Overriding).unwrap();

        assert!(out.contains("  writer.Finish();\n"));
        assert!(!out.contains(STUB_WRITER_TODO));
    }

    #[test]
    fn unary_package_layout() {
        let package = package(MethodDetail::unary("SayHello", "foo.bar.Req", "foo.bar.Resp"));
        let out = render(&package, &Minimal).unwrap();

        let expected = "\
#ifdef _PW_RPC_COMPILE_GENERATED_SERVICE_STUBS

// This section provides stub implementations of the RPC services in this file.
// The code below may be referenced or copied to serve as a starting point for
// your RPC service implementations.

#include \"foo/bar/greeter.rpc.pb.h\"

namespace foo::bar {

// Implementation class for foo.bar.Greeter.
class Greeter : public generated::Greeter<Greeter> {
 public:
  void SayHello(int request, int& response);
};


}  // namespace foo::bar

namespace foo::bar {

// Method definitions for foo.bar.Greeter.
void Greeter::SayHello(int request, int& response) {
  response = request;
}

}  // namespace foo::bar

#endif  // _PW_RPC_COMPILE_GENERATED_SERVICE_STUBS
";
        assert_eq!(out, expected);
    }

    #[test]
    fn schema_docs_become_comments() {
        let package = PackageNode::new("foo").with_service(
            ServiceDetail::new("foo.Greeter")
                .with_doc("Greets callers.\n\nStateless.")
                .with_method(
                    MethodDetail::unary("SayHello", "foo.Req", "foo.Resp")
                        .with_doc("Returns a greeting."),
                )
                .with_method(MethodDetail::unary("Ping", "foo.Req", "foo.Resp")),
        );
        let out = render(&package, &Minimal).unwrap();

        assert!(out.contains(
            "// Implementation class for foo.Greeter.\n\
             // Greets callers.\n\
             //\n\
             // Stateless.\n\
             class Greeter : public generated::Greeter<Greeter> {\n \
             public:\n  \
             // Returns a greeting.\n  \
             void SayHello(int request, int& response);\n\n  \
             void Ping(int request, int& response);\n};\n"
        ));
        assert_eq!(out.matches("// Returns a greeting.").count(), 1);
    }

    #[test]
    fn banner_is_optional() {
        let package = package(MethodDetail::unary("SayHello", "foo.bar.Req", "foo.bar.Resp"));

        let mut w = CodeWriter::new(String::new(), "greeter.rpc.pb.h");
        package_stubs(&package, &mut w, &Minimal, &CodegenOptions::default()).unwrap();
        let with_banner = w.into_inner();

        let without_banner = render(&package, &Minimal).unwrap();
        assert!(with_banner.contains("Implementation stubs"));
        assert!(!without_banner.contains("Implementation stubs"));
        assert_eq!(with_banner.matches("// This section provides stub").count(), 1);
    }

    #[test]
    fn client_and_bidirectional_streaming_fail() {
        for method in [
            MethodDetail::client_streaming("Upload", "foo.bar.Req", "foo.bar.Resp"),
            MethodDetail::bidirectional_streaming("Chat", "foo.bar.Req", "foo.bar.Resp"),
        ] {
            let pattern = method.call_pattern;
            let package = package(method);
            let err = render(&package, &Minimal).unwrap_err();

            match err {
                CodegenError::UnsupportedCallPattern {
                    method,
                    pattern: reported,
                } => {
                    assert!(method.starts_with("foo.bar.Greeter."));
                    assert_eq!(reported, pattern);
                }
                other => panic!("unexpected error: {other}"),
            }
        }
    }

    #[test]
    fn methods_without_namespace_are_unframed() {
        let package = PackageNode::new("plain").with_service(
            ServiceDetail::new("plain.Svc").with_method(MethodDetail::unary(
                "Ping",
                "plain.Req",
                "plain.Resp",
            )),
        );
        let out = render(&package, &Minimal).unwrap();

        assert!(!out.contains("namespace"));
        assert!(out.contains("void Svc::Ping(int request, int& response) {"));
    }
}
