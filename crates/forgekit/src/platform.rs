//! Provider-agnostic building blocks shared by every adapter.
//!
//! This module holds the error taxonomy returned by all adapter operations,
//! the provider kind used for dispatch, and Link-header pagination.

mod errors;
mod pagination;
mod provider;

pub use errors::{AdapterError, Result, short_error_message};
pub use pagination::{LinkPagination, Page, parse_link_header};
pub use provider::ProviderKind;
