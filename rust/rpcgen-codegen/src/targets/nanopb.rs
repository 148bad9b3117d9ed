//! Nanopb services: requests and responses are nanopb-generated C structs.

use rpcgen_hash::service_id;
use rpcgen_schema::{FileDescriptor, MethodDetail, MethodId, PackageNode, ServiceDetail};

use crate::code_writer::{CodeWriter, OutputSink};
use crate::cw_writeln;
use crate::package::{ServiceBackend, generate_package};
use crate::render::{c_struct_name, method_type};
use crate::service::{MethodTableBackend, method_ids, service_class};
use crate::stubs::{STUB_REQUEST_TODO, STUB_RESPONSE_TODO, StubGenerator, package_stubs};
use crate::{CodegenOptions, Result};

/// Name of the unit generated for `file`.
pub fn unit_name(file: &FileDescriptor) -> String {
    format!("{}.rpc.pb.h", file.path_without_extension())
}

/// Generate the nanopb service header for `package`.
pub fn generate(
    file: &FileDescriptor,
    package: &PackageNode,
    options: &CodegenOptions,
) -> Result<String> {
    let backend = NanopbBackend::new(options.clone());
    let mut sink = CodeWriter::new(String::new(), unit_name(file));

    generate_package(file, package, &mut sink, &backend)?;
    package_stubs(package, &mut sink, &backend, backend.options())?;
    Ok(sink.into_inner())
}

#[derive(Debug, Clone, Default)]
pub struct NanopbBackend {
    options: CodegenOptions,
}

impl NanopbBackend {
    pub fn new(options: CodegenOptions) -> Self {
        Self { options }
    }

    fn unary_client_call(
        &self,
        method: &MethodDetail,
        id: MethodId,
        sink: &mut dyn OutputSink,
    ) -> Result<()> {
        self.client_call(method, id, "UnaryCallbacks", "UnaryResponseHandler", sink)
    }

    fn server_streaming_client_call(
        &self,
        method: &MethodDetail,
        id: MethodId,
        sink: &mut dyn OutputSink,
    ) -> Result<()> {
        self.client_call(
            method,
            id,
            "ServerStreamingCallbacks",
            "ServerStreamingResponseHandler",
            sink,
        )
    }

    fn client_call(
        &self,
        method: &MethodDetail,
        id: MethodId,
        callbacks: &str,
        handler: &str,
        sink: &mut dyn OutputSink,
    ) -> Result<()> {
        let rpc = &self.options.rpc_namespace;
        let request = c_struct_name(&method.request_type);
        let response = c_struct_name(&method.response_type);
        let call = format!("{rpc}::NanopbClientCall<{rpc}::internal::{callbacks}<{response}>>");

        cw_writeln!(sink, "static {call} {}(", method.name)?;
        {
            let _indent = sink.indent(4);
            cw_writeln!(sink, "{rpc}::Channel& channel,")?;
            cw_writeln!(sink, "const {request}& request,")?;
            cw_writeln!(sink, "{rpc}::{handler}<{response}>& callbacks) {{")?;
        }
        {
            let _indent = sink.indent(2);
            cw_writeln!(sink, "{call} call(&channel,")?;
            {
                let _indent = sink.indent(4);
                sink.write_line("kServiceId,")?;
                cw_writeln!(sink, "{id},  // Hash of \"{}\"", method.name)?;
                sink.write_line("callbacks,")?;
                cw_writeln!(sink, "{request}_fields,")?;
                cw_writeln!(sink, "{response}_fields);")?;
            }
            sink.write_line("call.SendRequest(&request);")?;
            sink.write_line("return call;")?;
        }
        sink.write_line("}")?;
        Ok(())
    }
}

impl ServiceBackend for NanopbBackend {
    fn options(&self) -> &CodegenOptions {
        &self.options
    }

    /// The runtime headers plus the nanopb header of the file and of every
    /// file it imports.
    fn includes(&self, file: &FileDescriptor, _package: &PackageNode) -> Vec<String> {
        let mut includes = vec![
            "#include \"pw_rpc/nanopb/client_call.h\"".to_string(),
            "#include \"pw_rpc/nanopb/internal/method_union.h\"".to_string(),
            format!("#include \"{}.pb.h\"", file.path_without_extension()),
        ];
        includes.extend(
            file.dependencies
                .iter()
                .map(|dependency| FileDescriptor::new(dependency.as_str()))
                .map(|dependency| {
                    format!("#include \"{}.pb.h\"", dependency.path_without_extension())
                }),
        );
        includes
    }

    fn service(
        &self,
        service: &ServiceDetail,
        _package: &PackageNode,
        sink: &mut dyn OutputSink,
    ) -> Result<()> {
        service_class(service, sink, self, &self.options)
    }

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

            for (method, id) in method_ids(service, algorithm) {
                sink.blank_line()?;
                let pattern = method.call_pattern;
                if pattern.is_client_streaming() {
                    cw_writeln!(
                        sink,
                        "// {}: no client call is generated for {pattern} methods.",
                        method.name
                    )?;
                } else if pattern.is_server_streaming() {
                    self.server_streaming_client_call(method, id, sink)?;
                } else {
                    self.unary_client_call(method, id, sink)?;
                }
            }
        }

        sink.blank_line()?;
        sink.write_line(" private:")?;
        {
            let _indent = sink.indent(2);
            cw_writeln!(sink, "// Hash of \"{}\".", service.path)?;
            cw_writeln!(
                sink,
                "static constexpr uint32_t kServiceId = {};",
                service_id(service, algorithm)
            )?;
        }
        sink.write_line("};")?;
        sink.blank_line()?;
        Ok(())
    }
}

impl MethodTableBackend for NanopbBackend {
    fn method_union(&self) -> &str {
        "NanopbMethodUnion"
    }

    fn server_writer_alias(&self, sink: &mut dyn OutputSink) -> Result<()> {
        let rpc = &self.options.rpc_namespace;
        sink.write_line("template <typename Response>")?;
        cw_writeln!(sink, "using ServerWriter = {rpc}::ServerWriter<Response>;")?;
        Ok(())
    }

    fn describe_method(
        &self,
        method: &MethodDetail,
        id: MethodId,
        sink: &mut dyn OutputSink,
    ) -> Result<()> {
        let rpc = &self.options.rpc_namespace;
        let request = c_struct_name(&method.request_type);
        let response = c_struct_name(&method.response_type);

        cw_writeln!(
            sink,
            "{rpc}::internal::GetNanopbOrRawMethodFor<&Implementation::{}, \
             {rpc}::MethodType::{}, {request}, {response}>(",
            method.name,
            method_type(method.call_pattern)
        )?;
        let _indent = sink.indent(4);
        cw_writeln!(sink, "{id},  // Hash of \"{}\"", method.name)?;
        cw_writeln!(sink, "{request}_fields,")?;
        cw_writeln!(sink, "{response}_fields),")?;
        Ok(())
    }
}

impl StubGenerator for NanopbBackend {
    fn unary_signature(&self, method: &MethodDetail, prefix: &str) -> String {
        format!(
            "::pw::Status {prefix}{}(ServerContext&, const {}& request, {}& response)",
            method.name,
            c_struct_name(&method.request_type),
            c_struct_name(&method.response_type)
        )
    }

    fn unary_stub(&self, _method: &MethodDetail, sink: &mut dyn OutputSink) -> Result<()> {
        sink.write_line(STUB_REQUEST_TODO)?;
        sink.write_line("static_cast<void>(request);")?;
        sink.write_line(STUB_RESPONSE_TODO)?;
        sink.write_line("static_cast<void>(response);")?;
        sink.write_line("return ::pw::Status::Unimplemented();")?;
        Ok(())
    }

    fn server_streaming_signature(&self, method: &MethodDetail, prefix: &str) -> String {
        format!(
            "void {prefix}{}(ServerContext&, const {}& request, ServerWriter<{}>& writer)",
            method.name,
            c_struct_name(&method.request_type),
            c_struct_name(&method.response_type)
        )
    }
}
