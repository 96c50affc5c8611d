//! Client SDK for the Strata headless CMS
//!
//! The crate is organized around two layers:
//!
//! - [`client::CmsClient`] is the request gateway. One authenticated HTTP
//!   call per invocation: bearer-token injection, per-call context
//!   headers, and status-code normalization into [`errors::ApiError`].
//! - [`contents::ContentClient`] is a typed, schema-bound client over the
//!   gateway, generic over the caller's data shape.
//!
//! Token lifecycle is delegated to an [`auth::Authenticator`]; the
//! transport is an explicitly constructed [`http::HttpClient`] that can be
//! shared between gateways.
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use strata_client::auth::StaticAuthenticator;
//! use strata_client::client::CmsClient;
//! use strata_client::contents::ContentClient;
//! use serde::Deserialize;
//!
//! #[derive(Deserialize)]
//! struct Post {
//!     title: String,
//! }
//!
//! # async fn example() -> Result<(), strata_client::errors::ApiError> {
//! let client = CmsClient::builder()
//!     .service_url(url::Url::parse("https://cms.example.com/").unwrap())
//!     .app_name("blog")
//!     .authenticator(Arc::new(StaticAuthenticator::new("api-key")))
//!     .build()?;
//!
//! let posts: ContentClient<Post> = ContentClient::new(Arc::new(client), "posts");
//! if let Some(post) = posts.get("hello-world").await? {
//!     println!("{}", post.data.title);
//! }
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod client;
pub mod contents;
pub mod errors;
pub mod http;
pub mod query;

pub use auth::{Authenticator, ClientCredentialsAuthenticator, StaticAuthenticator};
pub use client::{CmsClient, CmsClientBuilder, CmsConfig, RequestBody};
pub use contents::{Content, ContentClient, ContentsResult, QueryOptions};
pub use errors::{ApiError, ErrorKind, Result};
pub use http::{HttpClient, HttpClientBuilder};
pub use query::QueryContext;
