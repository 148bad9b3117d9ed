use std::fmt;

use rpcgen_schema::CallPattern;
use thiserror::Error;

/// Failure of one generation run.
///
/// Any error aborts the whole run. Output already written to the sink is
/// incomplete and must be discarded by the caller.
#[derive(Debug, Error)]
pub enum CodegenError {
    #[error("failed to write generated code")]
    Write(#[from] fmt::Error),

    #[error("cannot generate a stub for {pattern} method `{method}`: not implemented")]
    UnsupportedCallPattern {
        /// Fully-qualified path of the offending method.
        method: String,
        pattern: CallPattern,
    },
}

pub type Result<T> = std::result::Result<T, CodegenError>;
