//! # In-Memory Cloud Service
//!
//! A stand-in for the remote APIs the sample resource types talk to: contact-center bot
//! associations, log group index policies and app bundle ingestions.
//!
//! The service is an actor. [`CloudService::run`] owns every remote object and processes
//! [`CloudRequest`]s one at a time; [`CloudClient`] wraps the channel so callers just `await`
//! typed results. Like the real APIs it only speaks its own vocabulary ([`CloudError`]), which
//! resource types translate into the reconciler's [`RemoteError`](reconciler_framework::RemoteError).
//!
//! ## Misbehaving on Purpose
//!
//! Tests queue [`Fault`]s through [`CloudClient::inject_fault`]:
//!
//! - [`Fault::Fail`] answers the next request with an error (throttling, outage, ...).
//! - [`Fault::StaleRead`] answers the next read as if the object did not exist yet,
//!   like a replica that has not caught up.
//!
//! ```rust
//! use reconciler_provider::cloud::{CloudError, CloudService, Fault};
//! use reconciler_provider::model::LexBot;
//!
//! #[tokio::main]
//! async fn main() {
//!     let (service, client) = CloudService::new(8);
//!     tokio::spawn(service.run());
//!
//!     client.associate_bot("i-1", LexBot::new("bot-a", "us-east-1")).await.unwrap();
//!     client
//!         .inject_fault(Fault::Fail(CloudError::Throttling("rate exceeded".into())))
//!         .await
//!         .unwrap();
//!
//!     assert!(client.list_bots("i-1", None).await.is_err());
//!     assert_eq!(client.list_bots("i-1", None).await.unwrap().items.len(), 1);
//! }
//! ```

pub mod client;
pub mod error;
pub mod message;
pub mod service;

pub use client::CloudClient;
pub use error::CloudError;
pub use message::{CloudRequest, Fault, Response};
pub use service::{CloudService, DEFAULT_PAGE_SIZE};
