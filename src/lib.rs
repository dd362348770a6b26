//! # OpenSearchServer client
//!
//! A Rust client for the [OpenSearchServer](http://www.open-search-server.com)
//! full-text search engine's HTTP query API.
//!
//! ## Features
//!
//! - Fluent search request builder (query, pagination, filters, sorting)
//! - Faceting, field collapsing, and join sub-queries
//! - Wire-compatible query-string assembly for the `/select` endpoint
//! - Async HTTP transport with login/API-key credentials
//!
//! ## Example
//!
//! ```
//! use opensearchserver::{Client, SearchRequestBuilder};
//!
//! # fn main() -> opensearchserver::Result<()> {
//! let client = Client::new("http://localhost:8080", "articles")?;
//!
//! let request = SearchRequestBuilder::new()
//!     .query("open source")
//!     .rows(10)
//!     .add_filter("status:published")
//!     .build();
//!
//! assert_eq!(
//!     client.select_url(&request),
//!     "http://localhost:8080/select?use=articles&q=open%20source&rows=10&fq=status%3Apublished",
//! );
//! // client.search(&request).await? issues the actual GET.
//! # Ok(())
//! # }
//! ```

mod client;
mod error;
mod search;
mod util;

// Re-exports for the public API
pub use client::Client;
pub use error::{OssError, Result};
pub use search::{Collapse, FacetOptions, SearchRequest, SearchRequestBuilder};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
