use miette::Diagnostic;
use thiserror::Error;

/// User-facing outcome of a failed refresh. Messages are deliberately
/// generic; the underlying cause is written to the log.
#[derive(Debug, Error, Diagnostic, Clone, Copy, PartialEq, Eq)]
pub enum RefreshError {
    #[error("Given path is not a valid Nexus instance.")]
    #[diagnostic(
        code(security_resolver::not_an_instance),
        help("Point at the Nexus work directory, the one containing conf/security.xml")
    )]
    NotAnInstance,

    #[error("Configuration file security.xml is not valid.")]
    #[diagnostic(
        code(security_resolver::invalid_config),
        help("Run with RUST_LOG=debug to see why the file was rejected")
    )]
    InvalidConfig,
}
