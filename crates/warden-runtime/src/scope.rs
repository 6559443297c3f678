use anyhow::Result;
use async_trait::async_trait;

use crate::transport::MessageAuthor;

#[async_trait]
/// An isolated set of request-scoped service instances.
///
/// One container exists per live invocation. Whoever removes the container
/// from the in-flight registry calls `release` exactly once; the container
/// must not be used afterwards.
pub trait CommandScope: Send + Sync {
    /// Authentication/authorization side effect run before command execution.
    /// Failure aborts the invocation before the interpreter runs.
    async fn on_user_authenticated(&self, author: &MessageAuthor) -> Result<()>;
    /// Disposes every resource owned by the scope.
    async fn release(&self);
}

#[async_trait]
/// Produces resource scopes: one root scope for the service lifetime plus
/// one child scope per invocation.
pub trait ScopeFactory: Send + Sync {
    async fn create_scope(&self) -> Result<std::sync::Arc<dyn CommandScope>>;
}

#[async_trait]
/// Schema migration hook run during startup. Fatal on failure.
pub trait PersistenceBootstrap: Send + Sync {
    async fn run_migrations(&self) -> Result<()>;
}

#[async_trait]
/// A long-lived background behavior started after persistence bootstrap.
///
/// Behaviors start in declared order and stop in reverse during shutdown.
/// Stop failures are logged and never block the remaining cleanup.
pub trait Behavior: Send + Sync {
    fn name(&self) -> &str;
    async fn start(&self) -> Result<()>;
    async fn stop(&self) -> Result<()>;
}
