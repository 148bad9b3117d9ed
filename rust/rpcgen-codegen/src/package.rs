//! Package traversal.
//!
//! One call generates one unit: a fixed preamble, then the direct services
//! of the package in tree order, each handed first to the backend's service
//! strategy and then to its client strategy. The client code of a service may
//! refer to its service code, so that order never changes.
//!
//! Nested packages are not visited; a front end wanting them generates one
//! unit per package.

use std::collections::BTreeSet;

use rpcgen_schema::{FileDescriptor, PackageNode, ServiceDetail};
use tracing::debug;

use crate::code_writer::OutputSink;
use crate::cw_writeln;
use crate::namespace::{NamespaceFrame, with_namespace};
use crate::render::basename;
use crate::{CodegenOptions, Result};

const STD_INCLUDES: &[&str] = &[
    "#include <array>",
    "#include <cstdint>",
    "#include <type_traits>",
];

/// Runtime headers every generated unit depends on.
pub const CORE_INCLUDES: &[&str] = &[
    "#include \"pw_rpc/internal/method_lookup.h\"",
    "#include \"pw_rpc/server_context.h\"",
    "#include \"pw_rpc/service.h\"",
];

/// Per-backend strategies driven by [`generate_package`].
pub trait ServiceBackend {
    fn options(&self) -> &CodegenOptions;

    /// Include directives the backend's generated code needs, written out in
    /// full (e.g., `#include "foo.pb.h"`).
    fn includes(&self, file: &FileDescriptor, package: &PackageNode) -> Vec<String>;

    /// Service definition code for one service.
    fn service(
        &self,
        service: &ServiceDetail,
        package: &PackageNode,
        sink: &mut dyn OutputSink,
    ) -> Result<()>;

    /// Client code for one service. Runs after [`ServiceBackend::service`].
    fn client(
        &self,
        service: &ServiceDetail,
        package: &PackageNode,
        sink: &mut dyn OutputSink,
    ) -> Result<()>;
}

/// Generate service and client code for `package`.
pub fn generate_package(
    file: &FileDescriptor,
    package: &PackageNode,
    sink: &mut dyn OutputSink,
    backend: &dyn ServiceBackend,
) -> Result<()> {
    let options = backend.options();

    debug!(package = %package.path, unit = sink.name(), "generating package");

    write_preamble(sink, options)?;

    let includes: BTreeSet<String> = CORE_INCLUDES
        .iter()
        .map(|line| (*line).to_string())
        .chain(backend.includes(file, package))
        .collect();
    for line in &includes {
        sink.write_line(line)?;
    }
    sink.blank_line()?;

    let namespace = package.cpp_namespace();
    with_namespace(sink, namespace.as_deref().map(NamespaceFrame::new), |sink| {
        for service in package.services() {
            debug!(
                service = %service.path,
                methods = service.methods.len(),
                "generating service"
            );
            backend.service(service, package, sink)?;
            backend.client(service, package, sink)?;
        }
        Ok(())
    })
}

fn write_preamble(sink: &mut dyn OutputSink, options: &CodegenOptions) -> Result<()> {
    let unit = basename(sink.name()).to_string();

    cw_writeln!(
        sink,
        "// {unit} automatically generated by {} {}",
        options.plugin_name,
        options.plugin_version
    )?;
    if let Some(timestamp) = &options.timestamp {
        cw_writeln!(sink, "// on {timestamp}")?;
    }
    sink.write_line("// clang-format off")?;
    sink.write_line("#pragma once")?;
    sink.blank_line()?;

    for line in STD_INCLUDES {
        sink.write_line(line)?;
    }
    sink.blank_line()?;
    Ok(())
}
