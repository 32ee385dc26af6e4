//! Error types and result definitions for vgate.
//!
//! Every vgate crate returns [`Result<T>`] and reports failures through the one
//! [`Error`] enum, so errors cross crate boundaries with `?` and callers can
//! match on the category they care about.
//!
//! # Error Categories
//!
//! - **Statement shape / vindex update** ([`Error::Unsupported`]): rejected statements
//! - **User input** ([`Error::InvalidArgumentError`]): duplicate SET targets, bad literals or binds
//! - **Metadata inconsistency** ([`Error::CatalogError`]): missing tables, columns, vindexes
//! - **Row mapping** ([`Error::KeyspaceIdMapping`]): a row that does not map to one keyspace id
//! - **Resolver capability** ([`Error::UnsupportedForResolver`]): accessor not served by a variant
//! - **Parsing / configuration** ([`Error::Parse`], [`Error::ConfigError`], [`Error::Io`])
//! - **Internal errors** ([`Error::Internal`]): bugs or unexpected states

pub mod error;
pub mod result;

pub use error::Error;
pub use result::Result;
