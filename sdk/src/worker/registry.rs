//! Workflow registration.

use crate::workflow::context::WorkflowContext;
use cascade_core::api::common::Payloads;
use cascade_core::error::CascadeError;
use futures::future::BoxFuture;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// What a workflow run ultimately produces: encoded result payloads or an
/// error from the taxonomy (including the continue-as-new directive).
pub type WorkflowExecutionResult = Result<Option<Payloads>, CascadeError>;

/// A registered workflow implementation. Receives the context and the
/// encoded start input.
pub type WorkflowFunction = Arc<
    dyn Fn(WorkflowContext, Option<Payloads>) -> BoxFuture<'static, WorkflowExecutionResult>
        + Send
        + Sync,
>;

/// Maps workflow type names to implementations. Registration after workers
/// have started is allowed; lookups are point-in-time.
#[derive(Default)]
pub struct WorkflowRegistry {
    workflows: RwLock<HashMap<String, WorkflowFunction>>,
}

impl WorkflowRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `workflow` under `name`, replacing any previous entry.
    pub fn register<F>(&self, name: impl Into<String>, workflow: F)
    where
        F: Fn(WorkflowContext, Option<Payloads>) -> BoxFuture<'static, WorkflowExecutionResult>
            + Send
            + Sync
            + 'static,
    {
        self.workflows
            .write()
            .insert(name.into(), Arc::new(workflow));
    }

    pub fn get(&self, name: &str) -> Option<WorkflowFunction> {
        self.workflows.read().get(name).cloned()
    }

    pub fn registered_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.workflows.read().keys().cloned().collect();
        names.sort();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_and_lookup() {
        let registry = WorkflowRegistry::new();
        registry.register("greeting", |_ctx, _input| Box::pin(async { Ok(None) }));

        assert!(registry.get("greeting").is_some());
        assert!(registry.get("unknown").is_none());
        assert_eq!(registry.registered_names(), vec!["greeting"]);
    }

    #[test]
    fn test_register_replaces_existing() {
        let registry = WorkflowRegistry::new();
        registry.register("wf", |_ctx, _input| Box::pin(async { Ok(None) }));
        registry.register("wf", |_ctx, _input| Box::pin(async { Ok(None) }));
        assert_eq!(registry.registered_names().len(), 1);
    }
}
