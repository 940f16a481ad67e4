//! Mission lifecycle: start a task, delegate, finish with curation

use crate::config::HierarchyConfig;
use crate::error::AgentError;
use crate::scope::AgentScope;
use std::fmt::Display;
use std::sync::Arc;
use stratum_curator::{CurationReport, PromotionEngine};
use stratum_domain::traits::DecisionOracle;
use stratum_store::MemoryStore;
use tracing::info;
use uuid::Uuid;

/// Length of a minted task id
pub const TASK_ID_LEN: usize = 12;

/// One user request, from ledger initialisation to final curation
pub struct Mission {
    root: AgentScope,
    store: Arc<MemoryStore>,
}

impl Mission {
    /// Mint a task id, initialise its ledger record and hand back the mission
    pub fn start(
        store: Arc<MemoryStore>,
        prompt: &str,
        config: HierarchyConfig,
    ) -> Result<Self, AgentError> {
        config.validate().map_err(AgentError::Config)?;
        let task_id = mint_task_id();
        store.tasks().init(&task_id, prompt)?;
        info!("Mission {} started", task_id);

        let root = AgentScope::root(Arc::clone(&store), task_id, config);
        Ok(Self { root, store })
    }

    /// Task id of this mission
    pub fn task_id(&self) -> &str {
        self.root.task_id()
    }

    /// The orchestrator's scope
    pub fn root(&self) -> &AgentScope {
        &self.root
    }

    /// Record the final output and curate the task's pending claims
    ///
    /// The output is kept in the ledger truncated to `output_chars`. On a
    /// curation error the output is already recorded and every claim is
    /// still pending, so curation can be retried from the root scope.
    pub async fn finish<O>(
        self,
        output: &str,
        engine: &PromotionEngine<O, MemoryStore>,
    ) -> Result<CurationReport, AgentError>
    where
        O: DecisionOracle + Send + Sync + 'static,
        O::Error: Display,
    {
        self.root.record_output(output)?;

        let report = self.root.curate(engine).await?;
        info!("Mission {} finished: {}", self.task_id(), report);
        info!("{}", self.store.summary()?);
        Ok(report)
    }
}

// The tail of a v7 uuid is random, the head is a millisecond timestamp
fn mint_task_id() -> String {
    let simple = Uuid::now_v7().simple().to_string();
    simple[simple.len() - TASK_ID_LEN..].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_ids_are_short_and_distinct() {
        let a = mint_task_id();
        let b = mint_task_id();
        assert_eq!(a.len(), TASK_ID_LEN);
        assert_ne!(a, b);
    }

    #[test]
    fn test_start_initialises_ledger() {
        let store = Arc::new(MemoryStore::in_memory().unwrap());
        let mission =
            Mission::start(Arc::clone(&store), "Summarise X", HierarchyConfig::default()).unwrap();

        let record = store.tasks().read(mission.task_id()).unwrap().unwrap();
        assert_eq!(record.prompt, "Summarise X");
        assert_eq!(mission.root().depth(), 0);
    }

    #[test]
    fn test_start_rejects_invalid_config() {
        let store = Arc::new(MemoryStore::in_memory().unwrap());
        let config = HierarchyConfig {
            output_chars: 0,
            ..HierarchyConfig::default()
        };
        assert!(matches!(
            Mission::start(store, "p", config),
            Err(AgentError::Config(_))
        ));
    }
}
