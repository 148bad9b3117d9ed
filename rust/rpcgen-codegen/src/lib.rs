#![deny(unsafe_code)]

//! Service code generation for rpcgen.
//!
//! The core walks one package of a schema tree and owns everything that must
//! be identical across backends: the unit preamble, namespace framing, the
//! order services and methods are visited in, service and method identifiers,
//! the method lookup tables and the stub block. Backends supply the shape of
//! the code through three traits:
//!
//! - [`package::ServiceBackend`]: includes, service code and client code
//! - [`service::MethodTableBackend`]: method table element type and entries
//! - [`stubs::StubGenerator`]: stub signatures and bodies
//!
//! # Usage
//!
//! ```
//! use rpcgen_codegen::{CodegenOptions, targets};
//! use rpcgen_schema::{FileDescriptor, MethodDetail, PackageNode, ServiceDetail};
//!
//! let file = FileDescriptor::new("foo/bar/greeter.proto");
//! let package = PackageNode::new("foo.bar")
//!     .with_namespace("foo.bar")
//!     .with_service(
//!         ServiceDetail::new("foo.bar.Greeter")
//!             .with_method(MethodDetail::unary("SayHello", "foo.bar.Req", "foo.bar.Resp")),
//!     );
//!
//! let header = targets::nanopb::generate(&file, &package, &CodegenOptions::default()).unwrap();
//! assert!(header.contains("namespace foo::bar {"));
//! ```
//!
//! # Pipeline
//!
//! ```text
//! generate_package      preamble, includes, per service: backend.service + backend.client
//!   └── service_class   namespace generated { class ... kServiceId, kMethods, kMethodIds }
//! package_stubs         #ifdef guard, implementation classes, method definitions
//! ```

pub mod code_writer;
mod error;
pub mod namespace;
mod options;
pub mod package;
mod render;
pub mod service;
pub mod stubs;
pub mod targets;

pub use error::{CodegenError, Result};
pub use options::CodegenOptions;
pub use rpcgen_hash::IdAlgorithm;
