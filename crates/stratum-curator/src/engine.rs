//! Core Promotion Engine implementation

use crate::config::CuratorConfig;
use crate::error::{CuratorError, DecisionError};
use crate::parser::parse_decisions;
use crate::prompt::ReviewPromptBuilder;
use crate::report::{Applied, CurationReport, DecisionRecord};
use std::fmt::Display;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use stratum_domain::canonical::promotion_provenance;
use stratum_domain::traits::{
    DecisionOracle, FlagUpdate, KnowledgeStore, PromotionOutcome, PromotionRequest, ReviewRequest,
};
use stratum_domain::Decision;
use tokio::time::timeout;
use tracing::{debug, info, warn};

/// Stops a running curation from applying further decisions
///
/// Clones share one flag. Decisions already applied are kept; the rest of
/// the batch is reported as [`DecisionError::Halted`]. The flag stays set
/// until [`HaltHandle::resume`].
#[derive(Debug, Clone, Default)]
pub struct HaltHandle(Arc<AtomicBool>);

impl HaltHandle {
    /// Request a halt
    pub fn halt(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Clear a previous halt
    pub fn resume(&self) {
        self.0.store(false, Ordering::SeqCst);
    }

    /// Whether a halt is requested
    pub fn is_halted(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// The gate between the low-trust and canonical layers
///
/// Selects a task's pending entries, asks the oracle for decisions and
/// applies each one independently. Policy holds regardless of what the
/// oracle says: canonical keys are never overwritten, conflicting claims
/// are only ever flagged, and an entry reaches at most one terminal state.
pub struct PromotionEngine<O, S>
where
    O: DecisionOracle,
    S: KnowledgeStore,
{
    oracle: Arc<O>,
    store: Arc<S>,
    config: CuratorConfig,
    halt: HaltHandle,
}

impl<O, S> PromotionEngine<O, S>
where
    O: DecisionOracle + Send + Sync + 'static,
    O::Error: Display,
    S: KnowledgeStore + Send + Sync + 'static,
    S::Error: Display,
{
    /// Create a new engine over a shared store
    pub fn new(oracle: O, store: Arc<S>, config: CuratorConfig) -> Result<Self, CuratorError> {
        config.validate().map_err(CuratorError::Config)?;
        Ok(Self {
            oracle: Arc::new(oracle),
            store,
            config,
            halt: HaltHandle::default(),
        })
    }

    /// Use an existing halt handle, so one flag can stop several engines
    pub fn with_halt_handle(mut self, halt: HaltHandle) -> Self {
        self.halt = halt;
        self
    }

    /// A handle that can halt this engine's curations
    pub fn halt_handle(&self) -> HaltHandle {
        self.halt.clone()
    }

    /// The configuration in use
    pub fn config(&self) -> &CuratorConfig {
        &self.config
    }

    /// The shared store
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Curate a task with the configured oracle timeout
    pub async fn curate_task(&self, task_id: &str) -> Result<CurationReport, CuratorError> {
        self.curate(task_id, self.config.oracle_timeout()).await
    }

    /// Curate every pending low-trust entry of `task_id`
    ///
    /// Returns a no-op report without calling the oracle when nothing is
    /// pending. On error nothing has been applied and a retry is safe,
    /// since selection always re-reads live state. Store access and the
    /// oracle call both run on the blocking pool.
    pub async fn curate(
        &self,
        task_id: &str,
        oracle_timeout: Duration,
    ) -> Result<CurationReport, CuratorError> {
        let store = Arc::clone(&self.store);
        let owned_task = task_id.to_string();
        let slice_limit = self.config.canonical_slice_limit;
        let (entries, canonical) = run_blocking(CuratorError::Store, move || {
            let entries = store
                .pending_entries(&owned_task)
                .map_err(|e| CuratorError::Store(e.to_string()))?;
            if entries.is_empty() {
                return Ok((entries, Vec::new()));
            }
            let canonical = store
                .canonical_slice(slice_limit)
                .map_err(|e| CuratorError::Store(e.to_string()))?;
            Ok((entries, canonical))
        })
        .await?;

        if entries.is_empty() {
            debug!("Nothing pending for task {}", task_id);
            return Ok(CurationReport::noop(task_id));
        }

        info!("Curating {} low-trust entries for task {}", entries.len(), task_id);

        let rendered = ReviewPromptBuilder::new(task_id, &entries)
            .with_canonical(&canonical, self.config.canonical_excerpt_chars)
            .build();
        let selected = entries.len();
        let request = ReviewRequest {
            task_id: task_id.to_string(),
            entries,
            canonical,
            rendered,
        };

        let response = timeout(oracle_timeout, self.call_oracle(request))
            .await
            .map_err(|_| {
                warn!("Oracle timed out for task {} after {:?}", task_id, oracle_timeout);
                CuratorError::OracleTimeout(oracle_timeout)
            })??;

        debug!("Oracle response length: {} chars", response.len());

        let decisions = parse_decisions(&response, self.config.default_promote_confidence)
            .map_err(|e| {
                warn!("Abandoning curation of task {}: {}", task_id, e);
                e
            })?;

        if decisions.is_empty() {
            info!("Oracle returned no decisions for task {}", task_id);
        }

        let store = Arc::clone(&self.store);
        let halt = self.halt.clone();
        let records = run_blocking(CuratorError::Store, move || {
            let records: Vec<DecisionRecord> = decisions
                .into_iter()
                .enumerate()
                .map(|(index, decoded)| match decoded {
                    Err(e) => DecisionRecord {
                        index,
                        decision: None,
                        result: Err(e),
                    },
                    Ok(decision) => {
                        let result = if halt.is_halted() {
                            Err(DecisionError::Halted)
                        } else {
                            apply_decision(store.as_ref(), &decision)
                        };
                        DecisionRecord {
                            index,
                            decision: Some(decision),
                            result,
                        }
                    }
                })
                .collect();
            Ok(records)
        })
        .await?;

        let report = CurationReport {
            task_id: task_id.to_string(),
            selected,
            records,
        };
        info!("{}", report);
        Ok(report)
    }

    /// Validate and apply one decision against the store
    ///
    /// Blocks on the store; async callers go through [`Self::curate`].
    pub fn apply(&self, decision: &Decision) -> Result<Applied, DecisionError> {
        apply_decision(self.store.as_ref(), decision)
    }

    /// Call the oracle off the async runtime
    async fn call_oracle(&self, request: ReviewRequest) -> Result<String, CuratorError> {
        let oracle = Arc::clone(&self.oracle);

        // Oracles are synchronous request/response
        run_blocking(CuratorError::OracleUnavailable, move || {
            oracle
                .review(&request)
                .map_err(|e| CuratorError::OracleUnavailable(e.to_string()))
        })
        .await
    }
}

async fn run_blocking<T, F>(
    on_join_error: fn(String) -> CuratorError,
    f: F,
) -> Result<T, CuratorError>
where
    F: FnOnce() -> Result<T, CuratorError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| on_join_error(format!("Task join error: {}", e)))?
}

fn apply_decision<S>(store: &S, decision: &Decision) -> Result<Applied, DecisionError>
where
    S: KnowledgeStore,
    S::Error: Display,
{
    let result = match decision {
        Decision::Promote {
            entry_id,
            target,
            confidence,
        } => {
            let request = PromotionRequest {
                entry_id: *entry_id,
                target: target.clone(),
                confidence: *confidence,
                source: promotion_provenance(entry_id),
            };
            match store.promote_entry(&request).map_err(store_error)? {
                PromotionOutcome::Promoted(key) => Ok(Applied::Promoted {
                    entry_id: *entry_id,
                    key,
                    confidence: *confidence,
                }),
                PromotionOutcome::EntryNotFound => Err(DecisionError::NotFound(*entry_id)),
                PromotionOutcome::NotPending(state) => Err(DecisionError::InvalidTransition {
                    entry_id: *entry_id,
                    action: decision.action(),
                    state,
                }),
                PromotionOutcome::KeyExists(key) => Err(DecisionError::AlreadyExists(key.id())),
            }
        }

        Decision::FlagConflict {
            entry_id,
            canonical_key,
            reason,
        } => {
            let dispute_id = store
                .record_dispute(*entry_id, canonical_key, reason)
                .map_err(store_error)?;
            Ok(Applied::Disputed {
                entry_id: *entry_id,
                dispute_id,
                canonical_key: canonical_key.clone(),
            })
        }

        Decision::Dismiss { entry_id, reason } => {
            match store.dismiss_entry(*entry_id).map_err(store_error)? {
                FlagUpdate::Applied => Ok(Applied::Dismissed {
                    entry_id: *entry_id,
                    reason: reason.clone(),
                    already: false,
                }),
                FlagUpdate::Unchanged => Ok(Applied::Dismissed {
                    entry_id: *entry_id,
                    reason: reason.clone(),
                    already: true,
                }),
                FlagUpdate::NotFound => Ok(Applied::NothingToDismiss { entry_id: *entry_id }),
                FlagUpdate::Blocked(state) => Err(DecisionError::InvalidTransition {
                    entry_id: *entry_id,
                    action: decision.action(),
                    state,
                }),
            }
        }
    };

    match &result {
        Ok(applied) => debug!("{}", applied),
        Err(e) => warn!("Rejected {}: {}", decision, e),
    }
    result
}

fn store_error<E: Display>(e: E) -> DecisionError {
    DecisionError::Store(e.to_string())
}
