//! Reference backends.
//!
//! Each backend implements [`ServiceBackend`](crate::package::ServiceBackend),
//! [`MethodTableBackend`](crate::service::MethodTableBackend) and
//! [`StubGenerator`](crate::stubs::StubGenerator), and exposes a `generate`
//! function producing one complete unit for a package.

pub mod nanopb;
pub mod raw;
