//! Chain event polling and reconciliation.

use std::time::Duration;
use tokio::sync::broadcast;
use tokio::time::sleep;

use crate::chain::{ChainResult, EventSource};
use crate::config::IndexerConfig;
use crate::observability::metrics;
use crate::store::records::{IssuanceLog, IssuanceStatus};
use crate::store::Registry;

/// What a single polling tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickOutcome {
    /// Events returned by the range query.
    pub events_seen: usize,
    /// Rows actually inserted (events minus duplicates).
    pub events_recorded: usize,
    /// Cursor after the tick.
    pub cursor: u64,
}

/// Polls the chain for `CredentialIssued` events and mirrors them into the
/// registry, keyed by transaction hash.
///
/// Ticks are serialized by construction: the loop awaits each tick before
/// sleeping, so polls can never overlap and the cursor has a single writer.
/// A failed tick is logged and swallowed without advancing the cursor; the
/// next tick retries the same range. Observation is therefore at-least-once,
/// while the registry's atomic insert-if-absent keeps rows exactly-once.
pub struct EventIndexer<S> {
    source: S,
    registry: Registry,
    config: IndexerConfig,
}

impl<S: EventSource> EventIndexer<S> {
    pub fn new(source: S, registry: Registry, config: IndexerConfig) -> Self {
        Self {
            source,
            registry,
            config,
        }
    }

    /// Run the polling loop until the shutdown signal fires.
    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        if !self.config.enabled {
            tracing::info!("Event indexer disabled");
            return;
        }

        tracing::info!(
            poll_interval_secs = self.config.poll_interval_secs,
            "Starting event indexer"
        );

        let interval = Duration::from_secs(self.config.poll_interval_secs);
        loop {
            match self.tick().await {
                Ok(outcome) => {
                    if outcome.events_recorded > 0 {
                        tracing::info!(
                            seen = outcome.events_seen,
                            recorded = outcome.events_recorded,
                            cursor = outcome.cursor,
                            "Indexed issuance events"
                        );
                    }
                }
                Err(e) => {
                    // Cursor untouched; the next tick retries the same range.
                    tracing::error!(error = %e, "Event polling tick failed");
                }
            }

            tokio::select! {
                _ = shutdown.recv() => {
                    tracing::info!("Event indexer shutting down");
                    return;
                }
                _ = sleep(interval) => {}
            }
        }
    }

    /// Execute one polling tick.
    ///
    /// On the very first tick (no cursor yet) the cursor is initialized to
    /// the current chain height; events before that point are never
    /// backfilled. A persisted cursor from a previous run takes precedence,
    /// so a restart resumes where the last snapshot left off.
    pub async fn tick(&self) -> ChainResult<TickOutcome> {
        let last_checked = match self.registry.cursor() {
            Some(block) => block,
            None => {
                let height = self.source.latest_block().await?;
                self.registry.set_cursor(height);
                tracing::info!(height, "Initial block height set");
                return Ok(TickOutcome {
                    events_seen: 0,
                    events_recorded: 0,
                    cursor: height,
                });
            }
        };

        let current = self.source.latest_block().await?;
        if current <= last_checked {
            return Ok(TickOutcome {
                events_seen: 0,
                events_recorded: 0,
                cursor: last_checked,
            });
        }

        let events = self
            .source
            .issuance_events(last_checked + 1, current)
            .await?;

        let mut recorded = 0;
        for event in &events {
            let log = IssuanceLog {
                credential_id: event.token_id.to_string(),
                recipient_address: event.recipient.to_string(),
                transaction_hash: event.tx_hash.clone(),
                status: IssuanceStatus::Confirmed,
                // The chain event carries no template reference.
                template_id: None,
            };
            if self.registry.record_issuance(log) {
                recorded += 1;
                metrics::record_indexed_event();
                tracing::info!(
                    token_id = %event.token_id,
                    tx_hash = %event.tx_hash,
                    "Saved new issuance"
                );
            } else {
                tracing::debug!(tx_hash = %event.tx_hash, "Skipping already-indexed event");
            }
        }

        // Advance past the whole scanned range even when every event was a
        // duplicate; only a failed tick leaves the cursor behind.
        self.registry.set_cursor(current);
        metrics::record_cursor_height(current);

        Ok(TickOutcome {
            events_seen: events.len(),
            events_recorded: recorded,
            cursor: current,
        })
    }
}
