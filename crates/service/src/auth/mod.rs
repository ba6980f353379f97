//! Auth module: three-layer architecture (domain, repository, service).
//!
//! Credential checks and token handling live here; what an authenticated
//! caller may do is decided by `crate::authz`.

pub mod domain;
pub mod errors;
pub mod repository;
pub mod service;
pub mod repo;

pub use service::AuthService;
