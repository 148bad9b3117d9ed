use rpcgen_schema::CallPattern;

/// C struct name generated for a message path: `foo.bar.Msg` -> `foo_bar_Msg`.
pub fn c_struct_name(message_path: &str) -> String {
    message_path.trim_start_matches('.').replace('.', "_")
}

/// Enumerator of the runtime's `MethodType` for a call pattern.
pub fn method_type(pattern: CallPattern) -> &'static str {
    match pattern {
        CallPattern::Unary => "kUnary",
        CallPattern::ServerStreaming => "kServerStreaming",
        CallPattern::ClientStreaming => "kClientStreaming",
        CallPattern::BidirectionalStreaming => "kBidirectionalStreaming",
    }
}

/// Last path component of a unit name.
pub fn basename(name: &str) -> &str {
    name.rsplit('/').next().unwrap_or(name)
}
