//! Payloads exchanged with the in-memory cloud service.

pub mod index_policy;
pub mod ingestion;
pub mod lex_bot;

pub use index_policy::*;
pub use ingestion::*;
pub use lex_bot::*;
