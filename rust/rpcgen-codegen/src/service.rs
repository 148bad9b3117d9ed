//! Generated service base classes and their method tables.
//!
//! Every service gets a class template in `namespace generated` holding two
//! parallel arrays: `kMethods`, built entry by entry by the backend, and
//! `kMethodIds`, the identifiers of the same methods in the same order. The
//! runtime searches `kMethodIds` and uses the position it finds to index
//! `kMethods`, so both arrays always have one entry per declared method.

use rpcgen_hash::{IdAlgorithm, method_id, method_id_collisions, service_id};
use rpcgen_schema::{MethodDetail, MethodId, ServiceDetail};
use tracing::{trace, warn};

use crate::code_writer::OutputSink;
use crate::cw_writeln;
use crate::namespace::{NamespaceFrame, with_namespace};
use crate::{CodegenOptions, Result};

/// Backend hooks for the method table of a generated service class.
pub trait MethodTableBackend {
    /// Element type of `kMethods`, relative to the runtime's `internal`
    /// namespace (e.g., "RawMethodUnion").
    fn method_union(&self) -> &str;

    /// Type aliases emitted in the public section of the class.
    fn server_writer_alias(&self, sink: &mut dyn OutputSink) -> Result<()> {
        let _ = sink;
        Ok(())
    }

    /// Write the `kMethods` entry for one method.
    fn describe_method(
        &self,
        method: &MethodDetail,
        id: MethodId,
        sink: &mut dyn OutputSink,
    ) -> Result<()>;
}

/// Methods of `service` paired with their identifiers, in declaration order.
pub fn method_ids(service: &ServiceDetail, algorithm: IdAlgorithm) -> Vec<(&MethodDetail, MethodId)> {
    service
        .methods
        .iter()
        .map(|method| (method, method_id(method, algorithm)))
        .collect()
}

/// Generate the base class of `service`.
pub fn service_class(
    service: &ServiceDetail,
    sink: &mut dyn OutputSink,
    backend: &dyn MethodTableBackend,
    options: &CodegenOptions,
) -> Result<()> {
    let rpc = options.rpc_namespace.as_str();
    let name = service.name.as_str();
    let base_class = format!("{rpc}::Service");

    for collision in method_id_collisions(service, options.id_algorithm) {
        warn!(
            service = %service.path,
            first = %collision.first,
            second = %collision.second,
            id = %collision.id,
            "method identifiers collide"
        );
    }

    let methods = method_ids(service, options.id_algorithm);

    with_namespace(sink, Some(NamespaceFrame::padded("generated")), |sink| {
        sink.write_line("template <typename Implementation>")?;
        cw_writeln!(sink, "class {name} : public {base_class} {{")?;
        sink.write_line(" public:")?;

        {
            let _indent = sink.indent(2);
            cw_writeln!(sink, "using ServerContext = {rpc}::ServerContext;")?;
            backend.server_writer_alias(sink)?;
            sink.blank_line()?;

            cw_writeln!(sink, "constexpr {name}()")?;
            cw_writeln!(sink, "    : {base_class}(kServiceId, kMethods) {{}}")?;
            sink.blank_line()?;

            cw_writeln!(sink, "{name}(const {name}&) = delete;")?;
            cw_writeln!(sink, "{name}& operator=(const {name}&) = delete;")?;
            sink.blank_line()?;

            cw_writeln!(sink, "static constexpr const char* name() {{ return \"{name}\"; }}")?;
            sink.blank_line()?;

            sink.write_line("// Used by MethodLookup to identify the generated service base.")?;
            sink.write_line("constexpr void _PwRpcInternalGeneratedBase() const {}")?;
        }

        sink.blank_line()?;
        sink.write_line(" private:")?;

        {
            let _indent = sink.indent(2);
            cw_writeln!(sink, "friend class {rpc}::internal::MethodLookup;")?;
            sink.blank_line()?;

            cw_writeln!(sink, "// Hash of \"{}\".", service.path)?;
            cw_writeln!(
                sink,
                "static constexpr uint32_t kServiceId = {};",
                service_id(service, options.id_algorithm)
            )?;
            sink.blank_line()?;

            cw_writeln!(
                sink,
                "static constexpr std::array<{rpc}::internal::{}, {}> kMethods = {{",
                backend.method_union(),
                methods.len()
            )?;
            {
                let _indent = sink.indent(4);
                for &(method, id) in &methods {
                    trace!(method = %method.path, %id, "method table entry");
                    backend.describe_method(method, id, sink)?;
                }
            }
            sink.write_line("};")?;
            sink.blank_line()?;

            method_lookup_table(&methods, sink)?;
        }

        sink.write_line("};")?;
        sink.blank_line()?;
        Ok(())
    })
}

/// `kMethodIds`: the identifier of every method, at its `kMethods` position.
fn method_lookup_table(methods: &[(&MethodDetail, MethodId)], sink: &mut dyn OutputSink) -> Result<()> {
    cw_writeln!(
        sink,
        "static constexpr std::array<uint32_t, {}> kMethodIds = {{",
        methods.len()
    )?;
    {
        let _indent = sink.indent(4);
        for (method, id) in methods {
            cw_writeln!(sink, "{id},  // Hash of \"{}\"", method.name)?;
        }
    }
    sink.write_line("};")?;
    sink.blank_line()?;
    Ok(())
}
