//! security-resolver - Nexus 2 security model resolver
//!
//! Compiles a Nexus `security.xml` into a flattened permission model for
//! migration to another repository manager.

pub mod errors;
pub mod security;
pub mod settings;
