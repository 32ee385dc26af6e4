use std::{fmt, io};
use thiserror::Error;

/// Unified error type for all vgate operations.
///
/// Planning and keyspace-id resolution are synchronous calls that either
/// succeed completely or abort with one of these variants. Nothing is retried
/// inside the core; the caller decides what a failure means for its statement
/// or copy job.
///
/// # Error Handling Strategy
///
/// Errors propagate upward with the `?` operator. Statement-shape and
/// vindex-update errors are user errors and are surfaced verbatim to whoever
/// issued the statement. Catalog errors indicate a schema or caller bug.
///
/// # Thread Safety
///
/// `Error` implements `Send` and `Sync`, so resolvers shared across copy
/// workers can hand errors back to any thread.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error while reading a VSchema document from disk.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The SQL text handed to the planner could not be parsed.
    #[error("SQL parse error: {0}")]
    Parse(#[from] sqlparser::parser::ParserError),

    /// Statement shape or vindex change the gateway refuses to plan.
    ///
    /// This covers:
    /// - multi-table and destination-targeted updates
    /// - subqueries in sharded DML, or cross-keyspace subqueries in unsharded DML
    /// - partial, primary, unowned or non-lookup vindex updates
    /// - LIMIT without ORDER BY while a vindex is changing
    /// - SET expressions that are not plain values
    ///
    /// The statement is rejected; it is not a runtime fault.
    #[error("unsupported: {0}")]
    Unsupported(String),

    /// Invalid user input or API parameter.
    ///
    /// Duplicate SET targets, malformed literals and missing or mistyped bind
    /// variables land here. Fix the input and retry.
    #[error("Invalid argument: {0}")]
    InvalidArgumentError(String),

    /// Schema metadata does not match what the caller asked for.
    ///
    /// Raised when a table, column or vindex cannot be found, when no vindex
    /// qualifies for sharding, or when a row is shorter than the column layout
    /// the resolver was built for. This usually points at a schema or caller
    /// bug rather than at user input.
    #[error("{0}")]
    CatalogError(String),

    /// A single row could not be mapped to a keyspace id.
    ///
    /// The message names the offending value so the copy worker can report it.
    #[error("{0}")]
    KeyspaceIdMapping(String),

    /// The operation exists on the resolver interface but this resolver
    /// variant does not implement it.
    ///
    /// Kept distinct so callers never confuse "not supported" with "empty".
    #[error("{operation} is not supported by the {resolver} resolver")]
    UnsupportedForResolver {
        operation: &'static str,
        resolver: &'static str,
    },

    /// A VSchema document was readable but semantically invalid.
    #[error("invalid vschema: {0}")]
    ConfigError(String),

    /// Internal error indicating a bug or unexpected state.
    #[error("An internal operation failed: {0}")]
    Internal(String),
}

impl Error {
    /// Build an [`Error::Unsupported`] from any displayable message.
    ///
    /// ```
    /// use vgate_result::Error;
    ///
    /// let err = Error::unsupported("subqueries in sharded DML");
    /// assert_eq!(err.to_string(), "unsupported: subqueries in sharded DML");
    /// ```
    #[inline]
    pub fn unsupported<M: fmt::Display>(message: M) -> Self {
        Error::Unsupported(message.to_string())
    }

    /// Build an [`Error::KeyspaceIdMapping`] from any displayable message.
    #[inline]
    pub fn keyspace_id_mapping<M: fmt::Display>(message: M) -> Self {
        Error::KeyspaceIdMapping(message.to_string())
    }

    /// Build an [`Error::ConfigError`] from any displayable error.
    #[inline]
    pub fn config<E: fmt::Display>(err: E) -> Self {
        Error::ConfigError(err.to_string())
    }

    /// Build the error returned by resolver accessors a variant cannot serve.
    #[inline]
    pub fn unsupported_for_resolver(operation: &'static str, resolver: &'static str) -> Self {
        Error::UnsupportedForResolver {
            operation,
            resolver,
        }
    }
}
