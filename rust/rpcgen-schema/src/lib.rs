#![deny(unsafe_code)]

//! Schema types for rpcgen service definitions.
//!
//! The tree is produced by a protocol-description front end and handed to the
//! generator already validated. Nothing in this crate parses schema source;
//! the generator only ever reads these types.
//!
//! ```text
//! PackageNode "foo.bar"
//! ├── Service "Greeter"
//! │   ├── Method "SayHello"   (unary)
//! │   └── Method "Subscribe"  (server streaming)
//! └── Other "HelloRequest"
//! ```

use std::fmt;

macro_rules! declare_u32_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Clone, Copy)]
        #[repr(transparent)]
        pub struct $name(pub u32);

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                write!(f, "0x{:08x}", self.0)
            }
        }
    };
}

declare_u32_id!(
    /// Identifier of a service, derived from its fully-qualified path.
    ServiceId
);

declare_u32_id!(
    /// Identifier of a method, derived from its unqualified name.
    ///
    /// Only unique among the methods of one service.
    MethodId
);

/// Kind of a node in the package tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Package,
    Service,
    Method,
    Other,
}

/// Request/response cardinality of a method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CallPattern {
    /// One request, one response.
    Unary,
    /// One request, a stream of responses.
    ServerStreaming,
    /// A stream of requests, one response.
    ClientStreaming,
    /// Streams in both directions.
    BidirectionalStreaming,
}

impl CallPattern {
    pub fn is_server_streaming(self) -> bool {
        matches!(self, Self::ServerStreaming | Self::BidirectionalStreaming)
    }

    pub fn is_client_streaming(self) -> bool {
        matches!(self, Self::ClientStreaming | Self::BidirectionalStreaming)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Unary => "unary",
            Self::ServerStreaming => "server_streaming",
            Self::ClientStreaming => "client_streaming",
            Self::BidirectionalStreaming => "bidirectional_streaming",
        }
    }
}

impl fmt::Display for CallPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The schema file a package was declared in.
///
/// Backends use it to derive the includes of the generated unit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileDescriptor {
    /// Path of the schema file (e.g., "foo/bar/greeter.proto").
    pub name: String,

    /// Paths of the schema files this one imports.
    pub dependencies: Vec<String>,
}

impl FileDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            dependencies: Vec::new(),
        }
    }

    /// File path with its final extension removed.
    pub fn path_without_extension(&self) -> &str {
        let base_start = self.name.rfind('/').map_or(0, |slash| slash + 1);
        match self.name[base_start..].rfind('.') {
            Some(0) | None => &self.name,
            Some(dot) => &self.name[..base_start + dot],
        }
    }
}

/// A node of the package tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Package(PackageNode),
    Service(ServiceDetail),
    Other(OtherNode),
}

impl Node {
    pub fn kind(&self) -> NodeKind {
        match self {
            Node::Package(_) => NodeKind::Package,
            Node::Service(_) => NodeKind::Service,
            Node::Other(_) => NodeKind::Other,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Node::Package(p) => &p.name,
            Node::Service(s) => &s.name,
            Node::Other(o) => &o.name,
        }
    }

    pub fn path(&self) -> &str {
        match self {
            Node::Package(p) => &p.path,
            Node::Service(s) => &s.path,
            Node::Other(o) => &o.path,
        }
    }
}

/// A package: the unit one generator invocation covers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackageNode {
    /// Last component of the package path (e.g., "bar").
    pub name: String,

    /// Fully-qualified dotted path (e.g., "foo.bar").
    pub path: String,

    /// Namespace qualifier for the generated unit, if any.
    ///
    /// Accepted as either a dotted path ("foo.bar") or a `::`-joined
    /// namespace ("::foo::bar").
    pub namespace: Option<String>,

    /// Children in declaration order.
    pub children: Vec<Node>,
}

impl PackageNode {
    /// Create an empty package from its dotted path.
    pub fn new(path: impl Into<String>) -> Self {
        let path = path.into();
        let name = last_component(&path).to_string();
        Self {
            name,
            path,
            namespace: None,
            children: Vec::new(),
        }
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    pub fn with_service(mut self, service: ServiceDetail) -> Self {
        self.children.push(Node::Service(service));
        self
    }

    pub fn with_child(mut self, child: Node) -> Self {
        self.children.push(child);
        self
    }

    /// Direct service children, in tree order. Nested packages are not visited.
    pub fn services(&self) -> impl Iterator<Item = &ServiceDetail> {
        self.children.iter().filter_map(|node| match node {
            Node::Service(service) => Some(service),
            _ => None,
        })
    }

    /// The namespace qualifier rendered as `a::b::c`, without a leading `::`.
    ///
    /// Returns `None` when no qualifier is declared or it is empty.
    pub fn cpp_namespace(&self) -> Option<String> {
        let raw = self.namespace.as_deref()?;
        let joined = raw.replace('.', "::");
        let trimmed = joined.strip_prefix("::").unwrap_or(&joined);
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    }
}

/// A service and its methods.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServiceDetail {
    /// Unqualified name (e.g., "Greeter").
    pub name: String,

    /// Fully-qualified dotted path (e.g., "foo.bar.Greeter").
    pub path: String,

    /// Methods in declaration order. The order fixes the method table layout.
    pub methods: Vec<MethodDetail>,

    /// Documentation string, if any. Stubs repeat it as line comments.
    pub doc: Option<String>,
}

impl ServiceDetail {
    /// Create a method-less service from its fully-qualified path.
    pub fn new(path: impl Into<String>) -> Self {
        let path = path.into();
        let name = last_component(&path).to_string();
        Self {
            name,
            path,
            methods: Vec::new(),
            doc: None,
        }
    }

    /// Append a method. Its path is qualified by this service's path.
    pub fn with_method(mut self, mut method: MethodDetail) -> Self {
        if method.path.is_empty() {
            method.path = format!("{}.{}", self.path, method.name);
        }
        self.methods.push(method);
        self
    }

    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }

    pub fn kind(&self) -> NodeKind {
        NodeKind::Service
    }
}

/// A single method in a service definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodDetail {
    /// Unqualified name (e.g., "SayHello").
    pub name: String,

    /// Fully-qualified dotted path (e.g., "foo.bar.Greeter.SayHello").
    pub path: String,

    pub call_pattern: CallPattern,

    /// Fully-qualified path of the request message.
    pub request_type: String,

    /// Fully-qualified path of the response message.
    pub response_type: String,

    /// Documentation string, if any. Stubs repeat it as line comments.
    pub doc: Option<String>,
}

impl MethodDetail {
    /// Create a method. The path is filled in when the method is added to a
    /// service with [`ServiceDetail::with_method`].
    pub fn new(
        name: impl Into<String>,
        call_pattern: CallPattern,
        request_type: impl Into<String>,
        response_type: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            path: String::new(),
            call_pattern,
            request_type: request_type.into(),
            response_type: response_type.into(),
            doc: None,
        }
    }

    pub fn unary(
        name: impl Into<String>,
        request_type: impl Into<String>,
        response_type: impl Into<String>,
    ) -> Self {
        Self::new(name, CallPattern::Unary, request_type, response_type)
    }

    pub fn server_streaming(
        name: impl Into<String>,
        request_type: impl Into<String>,
        response_type: impl Into<String>,
    ) -> Self {
        Self::new(name, CallPattern::ServerStreaming, request_type, response_type)
    }

    pub fn client_streaming(
        name: impl Into<String>,
        request_type: impl Into<String>,
        response_type: impl Into<String>,
    ) -> Self {
        Self::new(name, CallPattern::ClientStreaming, request_type, response_type)
    }

    pub fn bidirectional_streaming(
        name: impl Into<String>,
        request_type: impl Into<String>,
        response_type: impl Into<String>,
    ) -> Self {
        Self::new(
            name,
            CallPattern::BidirectionalStreaming,
            request_type,
            response_type,
        )
    }

    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }

    pub fn kind(&self) -> NodeKind {
        NodeKind::Method
    }
}

/// Any node the generator does not act on (messages, enums, ...).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OtherNode {
    pub name: String,
    pub path: String,
}

impl OtherNode {
    pub fn new(path: impl Into<String>) -> Self {
        let path = path.into();
        let name = last_component(&path).to_string();
        Self { name, path }
    }
}

fn last_component(path: &str) -> &str {
    path.rsplit('.').next().unwrap_or(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn greeter() -> ServiceDetail {
        ServiceDetail::new("foo.bar.Greeter")
            .with_method(MethodDetail::unary(
                "SayHello",
                "foo.bar.HelloRequest",
                "foo.bar.HelloReply",
            ))
            .with_method(MethodDetail::server_streaming(
                "Subscribe",
                "foo.bar.HelloRequest",
                "foo.bar.HelloReply",
            ))
    }

    #[test]
    fn names_are_derived_from_paths() {
        let service = greeter();
        assert_eq!(service.name, "Greeter");
        assert_eq!(service.methods[0].path, "foo.bar.Greeter.SayHello");
        assert_eq!(service.methods[1].path, "foo.bar.Greeter.Subscribe");

        let package = PackageNode::new("foo.bar");
        assert_eq!(package.name, "bar");
    }

    #[test]
    fn services_only_yields_direct_service_children_in_order() {
        let nested = PackageNode::new("foo.bar.inner").with_service(ServiceDetail::new(
            "foo.bar.inner.Hidden",
        ));
        let package = PackageNode::new("foo.bar")
            .with_service(greeter())
            .with_child(Node::Other(OtherNode::new("foo.bar.HelloRequest")))
            .with_child(Node::Package(nested))
            .with_service(ServiceDetail::new("foo.bar.Second"));

        let names: Vec<&str> = package.services().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["Greeter", "Second"]);
    }

    #[test]
    fn cpp_namespace_accepts_dotted_and_qualified_forms() {
        let dotted = PackageNode::new("foo.bar").with_namespace("foo.bar");
        assert_eq!(dotted.cpp_namespace().as_deref(), Some("foo::bar"));

        let qualified = PackageNode::new("foo.bar").with_namespace("::foo::bar");
        assert_eq!(qualified.cpp_namespace().as_deref(), Some("foo::bar"));

        assert_eq!(PackageNode::new("foo").cpp_namespace(), None);
        assert_eq!(
            PackageNode::new("foo").with_namespace("").cpp_namespace(),
            None
        );
    }

    #[test]
    fn node_kinds() {
        assert_eq!(Node::Service(greeter()).kind(), NodeKind::Service);
        assert_eq!(Node::Package(PackageNode::new("a")).kind(), NodeKind::Package);
        assert_eq!(Node::Other(OtherNode::new("a.B")).kind(), NodeKind::Other);
        assert_eq!(greeter().methods[0].kind(), NodeKind::Method);
    }

    #[test]
    fn call_pattern_streaming_flags() {
        assert!(!CallPattern::Unary.is_server_streaming());
        assert!(CallPattern::ServerStreaming.is_server_streaming());
        assert!(CallPattern::ClientStreaming.is_client_streaming());
        assert!(CallPattern::BidirectionalStreaming.is_server_streaming());
        assert!(CallPattern::BidirectionalStreaming.is_client_streaming());
        assert_eq!(CallPattern::ClientStreaming.to_string(), "client_streaming");
    }

    #[test]
    fn file_descriptor_paths_without_extension() {
        let file = FileDescriptor::new("foo/bar/greeter.proto");
        assert_eq!(file.path_without_extension(), "foo/bar/greeter");

        let bare = FileDescriptor::new("plain");
        assert_eq!(bare.path_without_extension(), "plain");
    }

    #[test]
    fn ids_display_as_fixed_width_hex() {
        assert_eq!(ServiceId(0xab).to_string(), "0x000000ab");
        assert_eq!(MethodId(u32::MAX).to_string(), "0xffffffff");
    }
}
