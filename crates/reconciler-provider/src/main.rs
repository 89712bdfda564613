//! # Reconciler Provider Demo
//!
//! Walks one bot association through a full lifecycle against the in-memory cloud:
//!
//! 1. Create it from desired configuration.
//! 2. Reconcile again and find nothing to do.
//! 3. Import it from its identity string, as an operator adopting it would.
//! 4. Delete it out of band and watch the next read report it removed.
//! 5. Remove it from configuration and reconcile, which deletes nothing twice.
//!
//! Run with `RUST_LOG=info` (or `debug` for payloads).

use reconciler_framework::tracing::setup_tracing;
use reconciler_framework::{Operation, PassOutcome, ReadOutcome, State};
use reconciler_provider::config::ProviderConfig;
use reconciler_provider::lifecycle::ProviderSystem;
use reconciler_provider::model::LexBot;
use reconciler_provider::resources::lex_bot_association::TYPE_NAME;
use tracing::{error, info, Instrument};

#[tokio::main]
async fn main() -> Result<(), String> {
    // Setup tracing once for the entire application
    setup_tracing();

    let system = ProviderSystem::new(ProviderConfig::from_env()).map_err(|e| e.to_string())?;
    let handler = system.handler(TYPE_NAME).map_err(|e| e.to_string())?;

    let desired = State::new()
        .with("instance_id", "aaaaaaaa-bbbb-cccc-dddd-111111111111")
        .with("bot_name", "OrderFlowers")
        .with("lex_region", "us-east-1");

    let span = tracing::info_span!("first_pass");
    let identity = async {
        match handler.reconcile(None, Some(&desired)).await {
            Ok(PassOutcome::Created(created)) => Ok(created.identity.to_string()),
            Ok(other) => Err(format!("unexpected outcome {other:?}")),
            Err(e) => Err(e.to_string()),
        }
    }
    .instrument(span)
    .await?;
    info!(%identity, "Association created");

    let second = handler
        .reconcile(Some(&identity), Some(&desired))
        .instrument(tracing::info_span!("second_pass"))
        .await
        .map_err(|e| e.to_string())?;
    info!(in_sync = matches!(second, PassOutcome::InSync { .. }), "Second pass");

    match handler.import(&identity).await {
        Ok(imported) => info!(attributes = imported.desired.len(), "Imported"),
        Err(e) => error!(error = %e, "Import failed"),
    }

    // Someone removes the association by hand.
    system
        .cloud
        .disassociate_bot(
            "aaaaaaaa-bbbb-cccc-dddd-111111111111",
            LexBot::new("OrderFlowers", "us-east-1"),
        )
        .await
        .map_err(|e| e.to_string())?;
    let decoded = handler
        .decode_identity(&identity, Operation::Read)
        .map_err(|e| e.to_string())?;
    match handler.read(&decoded).await {
        Ok(ReadOutcome::Removed) => info!("Association removed outside of management"),
        Ok(ReadOutcome::Present(_)) => error!("Association still present"),
        Err(e) => error!(error = %e, "Read failed"),
    }

    let last = handler
        .reconcile(Some(&identity), None)
        .instrument(tracing::info_span!("teardown"))
        .await
        .map_err(|e| e.to_string())?;
    info!(outcome = ?last, "Teardown");

    drop(handler);
    system.shutdown().await.map_err(|e| e.to_string())?;

    info!("Demo completed successfully");
    Ok(())
}
