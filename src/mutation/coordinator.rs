use super::notify::{Notice, Notifier};
use super::phase::{
    MutationKind, MutationOutcome, MutationResult, MutationState, PendingMutation, validate_name,
};
use crate::cache::QueryCache;
use crate::client::RestaurantsApi;
use crate::core::{ClientError, Restaurant, RestaurantCreate, RestaurantUpdate, Result};
use std::future::Future;
use std::sync::Arc;
use tracing::{info, warn};

/// Error text recorded when a submission is dropped mid-call.
pub const CANCELLED_MESSAGE: &str = "request cancelled";

/// What happens to the query cache when a mutation settles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SettlePolicy {
    /// Invalidate after a failed write too, not only after a successful one
    pub invalidate_on_failure: bool,
    /// Re-read the active page right after invalidating
    pub refetch_after_settle: bool,
}

impl Default for SettlePolicy {
    fn default() -> Self {
        Self {
            invalidate_on_failure: true,
            refetch_after_settle: true,
        }
    }
}

/// Settles a submission whose future was dropped before the call returned.
///
/// The phase becomes a network failure so the dialog can retry or close, and
/// the cache is invalidated as for any failed write. No refetch happens here.
struct SubmitGuard<'a> {
    coordinator: &'a MutationCoordinator,
    state: &'a MutationState,
    kind: MutationKind,
    armed: bool,
}

impl SubmitGuard<'_> {
    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for SubmitGuard<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }

        warn!(kind = %self.kind, "mutation cancelled before it settled");
        self.state.settle(MutationOutcome::Failure(ClientError::network(
            CANCELLED_MESSAGE,
        )));
        if self.coordinator.policy.invalidate_on_failure {
            self.coordinator.cache.invalidate();
        }
    }
}

/// Runs create/update/delete calls and keeps the collection cache in step.
///
/// Exactly one API call per submission; there is no retry. Each call moves the
/// caller's [`MutationState`] through `Idle -> Submitting -> Settled`.
#[derive(Clone)]
pub struct MutationCoordinator {
    api: Arc<dyn RestaurantsApi>,
    cache: QueryCache,
    notifier: Arc<dyn Notifier>,
    policy: SettlePolicy,
}

impl MutationCoordinator {
    /// Uses the cache's own API client for writes.
    pub fn new(cache: QueryCache, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            api: cache.api().clone(),
            cache,
            notifier,
            policy: SettlePolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: SettlePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> SettlePolicy {
        self.policy
    }

    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    pub async fn create(
        &self,
        state: &MutationState,
        payload: RestaurantCreate,
    ) -> Result<Restaurant> {
        validate_name(Some(&payload.name))?;
        self.run(state, MutationKind::Create, self.api.create(&payload))
            .await
    }

    pub async fn update(
        &self,
        state: &MutationState,
        id: &str,
        payload: RestaurantUpdate,
    ) -> Result<Restaurant> {
        PendingMutation::update(id, payload.clone()).validate()?;
        self.run(state, MutationKind::Update, self.api.update(id, &payload))
            .await
    }

    pub async fn delete(&self, state: &MutationState, id: &str) -> Result<()> {
        PendingMutation::delete(id).validate()?;
        self.run(state, MutationKind::Delete, self.api.delete(id))
            .await
    }

    pub async fn submit(
        &self,
        state: &MutationState,
        pending: PendingMutation,
    ) -> Result<MutationResult> {
        match pending {
            PendingMutation::Create(payload) => self
                .create(state, payload)
                .await
                .map(MutationResult::Created),
            PendingMutation::Update { id, payload } => self
                .update(state, &id, payload)
                .await
                .map(MutationResult::Updated),
            PendingMutation::Delete { id } => self
                .delete(state, &id)
                .await
                .map(|()| MutationResult::Deleted(id)),
        }
    }

    async fn run<T, F>(&self, state: &MutationState, kind: MutationKind, call: F) -> Result<T>
    where
        F: Future<Output = Result<T>> + Send,
    {
        if !state.try_begin() {
            return Err(ClientError::Busy);
        }
        let guard = SubmitGuard {
            coordinator: self,
            state,
            kind,
            armed: true,
        };

        info!(kind = %kind, "mutation submitted");
        let result = call.await;
        guard.disarm();
        self.settle(state, kind, result.as_ref().err()).await;
        result
    }

    async fn settle(
        &self,
        state: &MutationState,
        kind: MutationKind,
        error: Option<&ClientError>,
    ) {
        match error {
            None => {
                info!(kind = %kind, "mutation succeeded");
                self.notifier.notify(Notice::success(kind.success_message()));
                state.settle(MutationOutcome::Success);
            }
            Some(err) => {
                warn!(kind = %kind, error = %err, "mutation failed");
                self.notifier.notify(Notice::error(err.user_message()));
                state.settle(MutationOutcome::Failure(err.clone()));
            }
        }

        if error.is_some() && !self.policy.invalidate_on_failure {
            return;
        }

        self.cache.invalidate();
        if self.policy.refetch_after_settle
            && let Some(Err(err)) = self.cache.refetch_active().await
        {
            warn!(error = %err, "refetch after mutation failed");
        }
    }
}
