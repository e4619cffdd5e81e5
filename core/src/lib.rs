//! Core components for signed AWIS requests.
//!
//! This crate provides the foundational types and traits shared by the awis
//! crates. It keeps IO behind small traits so every collaborator of a request
//! (environment, file system, HTTP transport, credential lookup, signing) can
//! be swapped out, in production as well as in tests.
//!
//! ## Overview
//!
//! - **Context**: holds implementations for file reading, HTTP sending and environment access
//! - **Traits**: credential loading (`ProvideCredential`) and request signing (`SignRequest`)
//! - **Chain**: `ProvideCredentialChain` tries several credential providers in order
//!
//! ## Example
//!
//! ```no_run
//! use async_trait::async_trait;
//! use awis_core::{Context, ProvideCredential, Result, StaticEnv};
//!
//! #[derive(Debug)]
//! struct FixedKey;
//!
//! #[async_trait]
//! impl ProvideCredential for FixedKey {
//!     type Credential = String;
//!
//!     async fn provide_credential(&self, ctx: &Context) -> Result<Option<String>> {
//!         Ok(ctx.env_var("MY_KEY"))
//!     }
//! }
//!
//! # async fn example() -> Result<()> {
//! let ctx = Context::new().with_env(StaticEnv::default());
//! let key = FixedKey.provide_credential(&ctx).await?;
//! assert!(key.is_none());
//! # Ok(())
//! # }
//! ```
//!
//! ## Utilities
//!
//! - [`hash`]: SHA-256 and HMAC helpers
//! - [`time`]: time formatting in the forms SigV4 needs
//! - [`utils`]: redaction of secrets in debug output

// Make sure all our public APIs have docs.
#![warn(missing_docs)]

pub mod hash;
pub mod time;
pub mod utils;

mod context;
pub use context::Context;
pub use context::FileRead;
pub use context::HttpSend;
pub use context::NoopFileRead;
pub use context::NoopHttpSend;
mod env;
pub use env::Env;
pub use env::NoopEnv;
pub use env::OsEnv;
pub use env::StaticEnv;
mod error;
pub use error::Error;
pub use error::ErrorKind;
pub use error::Result;

mod api;
pub use api::{ProvideCredential, SignRequest, SigningCredential};
mod chain;
pub use chain::ProvideCredentialChain;
mod request;
pub use request::{Signature, SigningRequest};
