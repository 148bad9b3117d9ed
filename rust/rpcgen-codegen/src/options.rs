use rpcgen_hash::IdAlgorithm;

/// Options shared by the driver, the method table builder and the stub
/// orchestrator.
#[derive(Debug, Clone)]
pub struct CodegenOptions {
    /// Generator name written into the banner of every generated unit.
    pub plugin_name: String,

    /// Generator version written next to `plugin_name`.
    pub plugin_version: String,

    /// Generation time stamped under the banner.
    ///
    /// Off by default: a timestamp makes two runs over the same schema differ.
    pub timestamp: Option<String>,

    /// Hash used for service and method identifiers.
    pub id_algorithm: IdAlgorithm,

    /// Emit the decorative banner at the top of the stub block.
    pub stub_banner: bool,

    /// Preprocessor macro that must be defined for the stubs to compile.
    pub stubs_guard: String,

    /// Namespace of the RPC runtime the generated code links against.
    pub rpc_namespace: String,
}

impl Default for CodegenOptions {
    fn default() -> Self {
        Self {
            plugin_name: "rpcgen".to_string(),
            plugin_version: env!("CARGO_PKG_VERSION").to_string(),
            timestamp: None,
            id_algorithm: IdAlgorithm::default(),
            stub_banner: true,
            stubs_guard: "_PW_RPC_COMPILE_GENERATED_SERVICE_STUBS".to_string(),
            rpc_namespace: "::pw::rpc".to_string(),
        }
    }
}
