//! Concrete host bindings.
//!
//! The orchestration core only depends on the [`Catalog`] and
//! [`Copier`] traits; this module provides the real IBM i binding,
//! available with the `odbc` feature.
//!
//! [`Catalog`]: crate::catalog::Catalog
//! [`Copier`]: crate::transfer::Copier

#[cfg(feature = "odbc")]
mod odbc;

#[cfg(feature = "odbc")]
pub use odbc::OdbcHost;
