//! # Observability & Tracing
//!
//! Structured logging for reconciliation passes, built on the `tracing` crate.
//!
//! ## What Gets Traced
//!
//! Every executor operation opens a span carrying `resource_type` and, once known, the encoded
//! `identity`. Inside it:
//!
//! - **Remote outcomes** at `info`: `Created`, `Updated`, `Deleted`, `Already absent`,
//!   `Removed outside of management`, `Imported`
//! - **Failures** at `warn`, with the error as a structured `error` field
//! - **Full payloads** at `debug` (desired state, changed attribute sets, phase transitions)
//!
//! ## Usage Examples
//!
//! ```bash
//! # Outcomes only
//! RUST_LOG=info cargo run
//!
//! # Payloads and lifecycle transitions
//! RUST_LOG=debug cargo run
//!
//! # Framework internals only
//! RUST_LOG=reconciler_framework=debug cargo run
//! ```
//!
//! ## Workflow Trace Example
//!
//! Creating a bot association with `RUST_LOG=info`:
//!
//! ```text
//! INFO create: Created resource_type="aws_connect_lex_bot_association" identity=i-1:bot-a:us-east-1
//! ```
//!
//! The same create where the follow-up read is throttled:
//!
//! ```text
//! INFO create: Created resource_type="aws_connect_lex_bot_association" identity=i-1:bot-a:us-east-1
//! WARN create:read: Lookup failed resource_type="aws_connect_lex_bot_association" identity=i-1:bot-a:us-east-1 error=request throttled: rate exceeded
//! WARN create: Read after create failed, attributes unknown identity=i-1:bot-a:us-east-1 error=...
//! ```

/// Installs a compact `fmt` subscriber filtered by `RUST_LOG`.
pub fn setup_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false) // resource_type identifies the source
        .compact()
        .init();
}
