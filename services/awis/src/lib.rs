//! Client for the Alexa Web Information Service (AWIS).
//!
//! A call builds a `GET https://awis.amazonaws.com/api` request for one AWIS
//! action, signs it with AWS Signature V4, sends it, and returns the parsed
//! XML answer together with its `RequestId` and `StatusCode`.
//!
//! ## Example
//!
//! ```no_run
//! use awis::{Client, Config, Query};
//! use awis_core::{Context, OsEnv};
//! use awis_file_read_tokio::TokioFileRead;
//! use awis_http_send_reqwest::ReqwestHttpSend;
//! use http::HeaderMap;
//!
//! # async fn example() -> awis::Result<()> {
//! let ctx = Context::new()
//!     .with_file_read(TokioFileRead)
//!     .with_http_send(ReqwestHttpSend::default())
//!     .with_env(OsEnv);
//! let config = Config::default().from_env(&ctx);
//!
//! let client = Client::new(ctx, config);
//! let resp = client
//!     .execute(&Query::url_info("example.com", "Rank"), HeaderMap::new())
//!     .await?;
//! println!("{} {}", resp.request_id, resp.status_code);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod client;
pub use client::Client;

mod config;
pub use config::Config;

mod constants;

mod credential;
pub use credential::Credential;

mod error;
pub use error::{Error, Result};

mod provide_credential;
pub use provide_credential::*;

mod query;
pub use query::Query;

mod response;
pub use response::{normalize, validate, AwisResponse};

mod sign_request;
pub use sign_request::{canonical_query, canonical_query_string, RequestSigner};

mod xml;
pub use xml::{XmlTree, XmlValue};
