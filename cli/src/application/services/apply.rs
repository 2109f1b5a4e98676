//! Application service — apply named steps to one target, in order.

use tracing::Instrument as _;

use crate::application::ports::{ProgressReporter, RemoteTarget};
use crate::application::services::registry::StateRegistry;
use crate::domain::ApplyError;

/// Run `names` against `target` in order, stopping at the first failure.
///
/// Each name is resolved when its turn comes, so steps before an unknown name
/// have already been applied when the error is returned. Steps are never
/// rolled back.
///
/// # Errors
///
/// Returns [`ApplyError::UnknownState`] for an unregistered name and
/// [`ApplyError::StepFailed`] when a runner fails.
pub async fn apply<S: AsRef<str>>(
    registry: &StateRegistry,
    target: &dyn RemoteTarget,
    names: &[S],
    reporter: &impl ProgressReporter,
) -> Result<(), ApplyError> {
    let node = target.node().to_string();
    for (index, name) in names.iter().enumerate() {
        let name = name.as_ref();
        let runner = registry.get(name)?;

        reporter.step(&format!("{name} on {node}"));
        let span = tracing::info_span!("step", node = %node, step = name);
        if let Err(source) = runner.run(target).instrument(span).await {
            tracing::warn!(node = %node, step = name, error = %format!("{source:#}"), "step failed");
            reporter.failure(name);
            return Err(ApplyError::StepFailed {
                step: name.to_string(),
                position: index + 1,
                completed: index,
                source,
            });
        }
        tracing::info!(node = %node, step = name, "step applied");
        reporter.success(name);
    }
    Ok(())
}
