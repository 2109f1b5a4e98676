//! Step registry: the immutable mapping from step name to runner.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use crate::application::ports::RemoteTarget;
use crate::application::services::steps::{
    CniDeploy, KubeadmInit, KubeadmJoin, KubeletConfigure, KubeletEnable, StepContext,
    UploadSecrets,
};
use crate::domain::steps;
use crate::domain::{RegistryError, UnknownStateError};

/// A named, idempotent provisioning action.
#[async_trait]
pub trait Runner: Send + Sync {
    /// Apply this step to `target`.
    ///
    /// # Errors
    ///
    /// Returns the first failure; later commands of the step are not run.
    async fn run(&self, target: &dyn RemoteTarget) -> anyhow::Result<()>;
}

/// Known steps. Built once, read-only afterwards.
#[derive(Clone)]
pub struct StateRegistry {
    runners: HashMap<String, Arc<dyn Runner>>,
}

impl StateRegistry {
    #[must_use]
    pub fn builder() -> StateRegistryBuilder {
        StateRegistryBuilder::default()
    }

    /// The built-in kubeadm bootstrap steps.
    #[must_use]
    pub fn builtin(ctx: Arc<StepContext>) -> Self {
        let runners: [(&str, Arc<dyn Runner>); 6] = [
            (steps::CNI_DEPLOY, Arc::new(CniDeploy)),
            (steps::KUBEADM_INIT, Arc::new(KubeadmInit::new(Arc::clone(&ctx)))),
            (steps::KUBEADM_JOIN, Arc::new(KubeadmJoin::new(Arc::clone(&ctx)))),
            (steps::KUBELET_CONFIGURE, Arc::new(KubeletConfigure::new(Arc::clone(&ctx)))),
            (steps::KUBELET_ENABLE, Arc::new(KubeletEnable)),
            (steps::KUBERNETES_UPLOAD_SECRETS, Arc::new(UploadSecrets::new(ctx))),
        ];
        Self {
            runners: runners
                .into_iter()
                .map(|(name, runner)| (name.to_string(), runner))
                .collect(),
        }
    }

    /// Runner registered as `name`.
    ///
    /// # Errors
    ///
    /// Returns [`UnknownStateError`] if no such step exists.
    pub fn get(&self, name: &str) -> Result<Arc<dyn Runner>, UnknownStateError> {
        self.runners
            .get(name)
            .cloned()
            .ok_or_else(|| UnknownStateError {
                name: name.to_string(),
            })
    }

    /// Registered step names, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.runners.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl std::fmt::Debug for StateRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateRegistry")
            .field("steps", &self.names())
            .finish()
    }
}

/// Collects runners; rejects duplicate names.
#[derive(Default)]
pub struct StateRegistryBuilder {
    runners: HashMap<String, Arc<dyn Runner>>,
}

impl StateRegistryBuilder {
    /// Register `runner` as `name`.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Duplicate`] if `name` is already taken.
    pub fn register(
        mut self,
        name: impl Into<String>,
        runner: impl Runner + 'static,
    ) -> Result<Self, RegistryError> {
        let name = name.into();
        if self.runners.contains_key(&name) {
            return Err(RegistryError::Duplicate(name));
        }
        self.runners.insert(name, Arc::new(runner));
        Ok(self)
    }

    #[must_use]
    pub fn build(self) -> StateRegistry {
        StateRegistry {
            runners: self.runners,
        }
    }
}
