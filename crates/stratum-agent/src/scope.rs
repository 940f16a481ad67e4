//! Agent scopes: what one agent in the hierarchy may read and write

use crate::config::HierarchyConfig;
use crate::error::AgentError;
use std::fmt::{self, Display};
use std::sync::Arc;
use stratum_curator::{CurationReport, PromotionEngine};
use stratum_domain::traits::DecisionOracle;
use stratum_domain::{CanonicalKey, Confidence, EntryId};
use stratum_store::{ContextAssembler, MemoryStore};
use tracing::{debug, info};

/// Writer id used by the root scope of every mission
pub const ORCHESTRATOR_ID: &str = "orchestrator";

/// Position of an agent in the hierarchy
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Role {
    /// The mission's root agent, holder of the trusted write path
    Orchestrator,

    /// A delegated agent, identified by name
    Specialist(String),
}

impl Role {
    /// Writer id recorded against everything this role writes
    pub fn writer_id(&self) -> &str {
        match self {
            Role::Orchestrator => ORCHESTRATOR_ID,
            Role::Specialist(name) => name,
        }
    }

    fn is_orchestrator(&self) -> bool {
        matches!(self, Role::Orchestrator)
    }
}

impl Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.writer_id())
    }
}

/// One agent's handle on the shared store for one task
///
/// Every scope can propose low-trust claims, keep scratch notes, record
/// ledger artifacts and outputs, and assemble its context. Writing to the
/// canonical layer and running curation are reserved for the orchestrator.
#[derive(Clone)]
pub struct AgentScope {
    store: Arc<MemoryStore>,
    task_id: String,
    role: Role,
    depth: usize,
    namespaces: Option<Vec<String>>,
    config: HierarchyConfig,
}

impl fmt::Debug for AgentScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AgentScope")
            .field("task_id", &self.task_id)
            .field("role", &self.role)
            .field("depth", &self.depth)
            .field("namespaces", &self.namespaces)
            .finish_non_exhaustive()
    }
}

impl AgentScope {
    pub(crate) fn root(store: Arc<MemoryStore>, task_id: String, config: HierarchyConfig) -> Self {
        Self {
            store,
            task_id,
            role: Role::Orchestrator,
            depth: 0,
            namespaces: None,
            config,
        }
    }

    /// Task this scope works on
    pub fn task_id(&self) -> &str {
        &self.task_id
    }

    /// Role of this scope
    pub fn role(&self) -> &Role {
        &self.role
    }

    /// Distance from the orchestrator
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Writer id used for scratch notes, outputs and claim origins
    pub fn writer_id(&self) -> &str {
        self.role.writer_id()
    }

    /// Restrict the canonical part of this scope's context to `namespaces`
    pub fn with_namespaces(mut self, namespaces: &[&str]) -> Self {
        self.namespaces = Some(namespaces.iter().map(|ns| ns.to_string()).collect());
        self
    }

    /// Delegate to a named specialist one level deeper
    ///
    /// # Errors
    ///
    /// [`AgentError::DepthExceeded`] when the child would sit deeper than
    /// `max_depth`.
    pub fn spawn_child(&self, name: impl Into<String>) -> Result<AgentScope, AgentError> {
        let depth = self.depth + 1;
        if depth > self.config.max_depth {
            return Err(AgentError::DepthExceeded {
                depth,
                max: self.config.max_depth,
            });
        }
        let name = name.into();
        if name.trim().is_empty() || name == ORCHESTRATOR_ID {
            return Err(AgentError::NotPermitted(format!(
                "'{}' is not a valid specialist name",
                name
            )));
        }
        debug!("{} delegates to {} at depth {}", self.role, name, depth);
        Ok(AgentScope {
            store: Arc::clone(&self.store),
            task_id: self.task_id.clone(),
            role: Role::Specialist(name),
            depth,
            namespaces: None,
            config: self.config.clone(),
        })
    }

    /// Record a tentative claim in the low-trust log
    ///
    /// `source` describes how the claim was obtained; the origin is this
    /// scope's writer id.
    pub fn propose(
        &self,
        claim: &str,
        source: &str,
        confidence: Option<f64>,
    ) -> Result<EntryId, AgentError> {
        let confidence = confidence.unwrap_or(self.config.default_claim_confidence);
        let id = self.store.low_trust().append(
            claim,
            source,
            self.writer_id(),
            &self.task_id,
            confidence,
        )?;
        Ok(id)
    }

    /// Keep a private working note
    pub fn note(&self, note: &str) -> Result<(), AgentError> {
        Ok(self.store.scratch().write(self.writer_id(), &self.task_id, note)?)
    }

    /// Record a named artifact in the task ledger
    pub fn record_artifact(&self, key: &str, value: &str) -> Result<(), AgentError> {
        Ok(self.store.tasks().write_artifact(&self.task_id, key, value)?)
    }

    /// Record this scope's output in the task ledger
    ///
    /// Only the first `output_chars` characters are kept.
    pub fn record_output(&self, output: &str) -> Result<(), AgentError> {
        let kept: String = output.chars().take(self.config.output_chars).collect();
        Ok(self
            .store
            .tasks()
            .write_output(&self.task_id, self.writer_id(), &kept)?)
    }

    /// Assemble this scope's context block
    pub fn context(&self) -> Result<String, AgentError> {
        let namespaces: Option<Vec<&str>> = self
            .namespaces
            .as_ref()
            .map(|list| list.iter().map(String::as_str).collect());
        let context = ContextAssembler::new(&self.store).assemble(
            &self.task_id,
            self.writer_id(),
            namespaces.as_deref(),
        )?;
        Ok(context)
    }

    /// Write a trusted entry straight into the canonical layer
    ///
    /// `source` records who vouched for the fact (e.g. `user_confirmed`,
    /// `test_passed`) and defaults to this scope's writer id. `confirmed`
    /// marks a fact a human has confirmed.
    ///
    /// # Errors
    ///
    /// [`AgentError::NotPermitted`] from any scope but the orchestrator, and
    /// a store error if the key is already taken.
    pub fn write_canonical(
        &self,
        namespace: &str,
        key: &str,
        content: &str,
        source: Option<&str>,
        confidence: Option<f64>,
        confirmed: bool,
    ) -> Result<CanonicalKey, AgentError> {
        self.require_orchestrator("write to the canonical store")?;
        let key = CanonicalKey::new(namespace, key).map_err(AgentError::InvalidInput)?;
        let confidence =
            Confidence::clamped(confidence.unwrap_or(self.config.default_canonical_confidence));
        let source = source.unwrap_or(self.writer_id());
        let key = self
            .store
            .canonical()
            .write(&key, content, source, confidence, confirmed)?;
        info!(
            "Orchestrator wrote Canonical[{}] for task {} (source: {})",
            key, self.task_id, source
        );
        Ok(key)
    }

    /// Run the Promotion Engine over this task's pending claims
    ///
    /// The engine must be bound to the same store as this scope.
    pub async fn curate<O>(
        &self,
        engine: &PromotionEngine<O, MemoryStore>,
    ) -> Result<CurationReport, AgentError>
    where
        O: DecisionOracle + Send + Sync + 'static,
        O::Error: Display,
    {
        self.require_orchestrator("run curation")?;
        if !Arc::ptr_eq(engine.store(), &self.store) {
            return Err(AgentError::NotPermitted(
                "curation engine is bound to a different store".to_string(),
            ));
        }
        Ok(engine.curate_task(&self.task_id).await?)
    }

    fn require_orchestrator(&self, what: &str) -> Result<(), AgentError> {
        if self.role.is_orchestrator() {
            Ok(())
        } else {
            Err(AgentError::NotPermitted(format!(
                "{} may not {}; propose a low-trust claim instead",
                self.role, what
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn root(max_depth: usize) -> AgentScope {
        let store = Arc::new(MemoryStore::in_memory().unwrap());
        store.tasks().init("t1", "prompt").unwrap();
        let config = HierarchyConfig {
            max_depth,
            ..HierarchyConfig::default()
        };
        AgentScope::root(store, "t1".to_string(), config)
    }

    #[test]
    fn test_depth_bound() {
        let root = root(2);
        let a = root.spawn_child("research").unwrap();
        let b = a.spawn_child("data").unwrap();
        assert_eq!(b.depth(), 2);

        match b.spawn_child("code") {
            Err(AgentError::DepthExceeded { depth, max }) => {
                assert_eq!(depth, 3);
                assert_eq!(max, 2);
            }
            other => panic!("expected DepthExceeded, got {:?}", other),
        }
    }

    #[test]
    fn test_zero_depth_allows_no_children() {
        assert!(matches!(
            root(0).spawn_child("research"),
            Err(AgentError::DepthExceeded { .. })
        ));
    }

    #[test]
    fn test_specialist_cannot_write_canonical() {
        let root = root(3);
        let child = root.spawn_child("research").unwrap();
        let err = child
            .write_canonical("facts", "X", "X=5", Some("user_confirmed"), None, true)
            .unwrap_err();
        assert!(matches!(err, AgentError::NotPermitted(_)));
        assert!(root.store.canonical().get("facts/X").unwrap().is_none());
    }

    #[test]
    fn test_specialist_cannot_impersonate_orchestrator() {
        assert!(matches!(
            root(3).spawn_child(ORCHESTRATOR_ID),
            Err(AgentError::NotPermitted(_))
        ));
    }

    #[test]
    fn test_propose_uses_writer_as_origin() {
        let root = root(3);
        let child = root.spawn_child("research").unwrap();
        let id = child.propose("X=5", "web search", None).unwrap();

        let entry = root.store.low_trust().get(id).unwrap().unwrap();
        assert_eq!(entry.origin, "research");
        assert_eq!(entry.source, "web search");
        assert_eq!(entry.task_id, "t1");
        assert_eq!(entry.confidence.value(), 0.5);
    }

    #[test]
    fn test_specialist_output_is_truncated() {
        let root = root(3);
        let child = root.spawn_child("writing").unwrap();
        child.record_output(&"w".repeat(600)).unwrap();

        let record = root.store.tasks().read("t1").unwrap().unwrap();
        assert_eq!(record.outputs.get("writing").unwrap().chars().count(), 500);
    }

    #[test]
    fn test_context_sees_only_own_scratch() {
        let root = root(3);
        let child = root.spawn_child("research").unwrap();
        child.note("check the second source").unwrap();
        root.note("orchestrator plan").unwrap();

        let context = child.with_namespaces(&["facts"]).context().unwrap();
        assert!(context.contains("check the second source"));
        assert!(!context.contains("orchestrator plan"));
    }
}
