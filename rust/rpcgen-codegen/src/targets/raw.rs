//! Raw services: methods read and write encoded bytes directly.

use rpcgen_hash::service_id;
use rpcgen_schema::{FileDescriptor, MethodDetail, MethodId, PackageNode, ServiceDetail};

use crate::code_writer::{CodeWriter, OutputSink};
use crate::cw_writeln;
use crate::package::{ServiceBackend, generate_package};
use crate::render::method_type;
use crate::service::{MethodTableBackend, method_ids, service_class};
use crate::stubs::{STUB_REQUEST_TODO, STUB_RESPONSE_TODO, StubGenerator, package_stubs};
use crate::{CodegenOptions, Result};

/// Name of the unit generated for `file`.
pub fn unit_name(file: &FileDescriptor) -> String {
    format!("{}.raw_rpc.pb.h", file.path_without_extension())
}

/// Generate the raw service header for `package`.
///
/// The result holds the service and client code followed by the stub block.
/// On error nothing is returned.
pub fn generate(
    file: &FileDescriptor,
    package: &PackageNode,
    options: &CodegenOptions,
) -> Result<String> {
    let backend = RawBackend::new(options.clone());
    let mut sink = CodeWriter::new(String::new(), unit_name(file));

    generate_package(file, package, &mut sink, &backend)?;
    package_stubs(package, &mut sink, &backend, backend.options())?;
    Ok(sink.into_inner())
}

#[derive(Debug, Clone, Default)]
pub struct RawBackend {
    options: CodegenOptions,
}

impl RawBackend {
    pub fn new(options: CodegenOptions) -> Self {
        Self { options }
    }
}

impl ServiceBackend for RawBackend {
    fn options(&self) -> &CodegenOptions {
        &self.options
    }

    fn includes(&self, _file: &FileDescriptor, _package: &PackageNode) -> Vec<String> {
        vec![
            "#include \"pw_rpc/raw/internal/method_union.h\"".to_string(),
            "#include \"pw_rpc/raw/server_reader_writer.h\"".to_string(),
        ]
    }

    fn service(
        &self,
        service: &ServiceDetail,
        _package: &PackageNode,
        sink: &mut dyn OutputSink,
    ) -> Result<()> {
        service_class(service, sink, self, &self.options)
    }

    /// Raw clients build their own requests, so the client class only
    /// carries the identifiers needed to address the service.
    fn client(
        &self,
        service: &ServiceDetail,
        _package: &PackageNode,
        sink: &mut dyn OutputSink,
    ) -> Result<()> {
        let name = service.name.as_str();
        let algorithm = self.options.id_algorithm;

        cw_writeln!(sink, "class {name}Client {{")?;
        sink.write_line(" public:")?;
        {
            let _indent = sink.indent(2);
            cw_writeln!(sink, "{name}Client() = delete;")?;
            sink.blank_line()?;

            cw_writeln!(sink, "// Hash of \"{}\".", service.path)?;
            cw_writeln!(
                sink,
                "static constexpr uint32_t kServiceId = {};",
                service_id(service, algorithm)
            )?;
            for (method, id) in method_ids(service, algorithm) {
                cw_writeln!(
                    sink,
                    "static constexpr uint32_t k{}Id = {id};  // Hash of \"{}\"",
                    method.name,
                    method.name
                )?;
            }
        }
        sink.write_line("};")?;
        sink.blank_line()?;
        Ok(())
    }
}

impl MethodTableBackend for RawBackend {
    fn method_union(&self) -> &str {
        "RawMethodUnion"
    }

    fn server_writer_alias(&self, sink: &mut dyn OutputSink) -> Result<()> {
        let rpc = &self.options.rpc_namespace;
        cw_writeln!(sink, "using RawServerWriter = {rpc}::RawServerWriter;")?;
        Ok(())
    }

    fn describe_method(
        &self,
        method: &MethodDetail,
        id: MethodId,
        sink: &mut dyn OutputSink,
    ) -> Result<()> {
        let rpc = &self.options.rpc_namespace;
        cw_writeln!(
            sink,
            "{rpc}::internal::GetRawMethodFor<&Implementation::{}, {rpc}::MethodType::{}>(",
            method.name,
            method_type(method.call_pattern)
        )?;
        let _indent = sink.indent(4);
        cw_writeln!(sink, "{id}),  // Hash of \"{}\"", method.name)?;
        Ok(())
    }
}

impl StubGenerator for RawBackend {
    fn unary_signature(&self, method: &MethodDetail, prefix: &str) -> String {
        format!(
            "::pw::StatusWithSize {prefix}{}(ServerContext&, ::pw::ConstByteSpan request, \
             ::pw::ByteSpan response)",
            method.name
        )
    }

    fn unary_stub(&self, _method: &MethodDetail, sink: &mut dyn OutputSink) -> Result<()> {
        sink.write_line(STUB_REQUEST_TODO)?;
        sink.write_line("static_cast<void>(request);")?;
        sink.write_line(STUB_RESPONSE_TODO)?;
        sink.write_line("static_cast<void>(response);")?;
        sink.write_line("return ::pw::StatusWithSize::Unimplemented();")?;
        Ok(())
    }

    fn server_streaming_signature(&self, method: &MethodDetail, prefix: &str) -> String {
        format!(
            "void {prefix}{}(ServerContext&, ::pw::ConstByteSpan request, \
             RawServerWriter& writer)",
            method.name
        )
    }
}
