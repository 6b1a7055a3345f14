//! Cancellation scopes for effect tasks.
//!
//! Every task the store spawns is tracked here. Tasks started inside an
//! [`Effect::Cancellable`](composable_mvi_core::Effect::Cancellable) also
//! belong to a scope. A scope carries a generation counter: superseding or
//! cancelling the scope bumps the generation and aborts its tasks, and any
//! feedback tagged with an older generation is rejected by [`EffectRegistry::is_current`].

use composable_mvi_core::EffectId;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::task::AbortHandle;

/// Identifies the scope generation a task was started in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ScopeToken {
    id: EffectId,
    generation: u64,
}

impl ScopeToken {
    pub(crate) const fn id(&self) -> EffectId {
        self.id
    }
}

#[derive(Debug, Default)]
struct Scope {
    generation: u64,
    tasks: Vec<AbortHandle>,
}

#[derive(Debug, Default)]
struct Registry {
    scopes: HashMap<EffectId, Scope>,
    detached: Vec<AbortHandle>,
}

/// Task and scope bookkeeping shared by all clones of a store.
#[derive(Debug, Default)]
pub(crate) struct EffectRegistry {
    inner: Mutex<Registry>,
}

impl EffectRegistry {
    fn lock(&self) -> MutexGuard<'_, Registry> {
        // Bookkeeping stays consistent even if a holder panicked
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Enter scope `id`, optionally superseding its in-flight tasks.
    ///
    /// Returns the token new tasks in the scope must carry.
    pub(crate) fn enter(&self, id: EffectId, cancel_in_flight: bool) -> ScopeToken {
        let mut registry = self.lock();
        let scope = registry.scopes.entry(id).or_default();

        if cancel_in_flight {
            scope.generation += 1;
            let aborted = abort_all(&mut scope.tasks);
            if aborted > 0 {
                tracing::debug!(scope = %id, aborted, "Superseded in-flight effects");
                metrics::counter!(crate::metrics::EFFECTS_CANCELLED).increment(aborted as u64);
            }
        }

        ScopeToken {
            id,
            generation: scope.generation,
        }
    }

    /// Cancel every task in scope `id` and invalidate its pending feedback.
    ///
    /// Returns the number of tasks that were still running.
    pub(crate) fn cancel(&self, id: EffectId) -> usize {
        let mut registry = self.lock();
        let Some(scope) = registry.scopes.get_mut(&id) else {
            return 0;
        };

        scope.generation += 1;
        let aborted = abort_all(&mut scope.tasks);
        metrics::counter!(crate::metrics::EFFECTS_CANCELLED).increment(aborted as u64);
        aborted
    }

    /// Whether feedback carrying `token` may still reach the reducer.
    pub(crate) fn is_current(&self, token: &ScopeToken) -> bool {
        self.lock()
            .scopes
            .get(&token.id)
            .is_some_and(|scope| scope.generation == token.generation)
    }

    /// Track a spawned task, inside `scope` if given.
    pub(crate) fn track(&self, scope: Option<&ScopeToken>, handle: AbortHandle) {
        let mut registry = self.lock();

        let Some(token) = scope else {
            registry.detached.retain(|task| !task.is_finished());
            registry.detached.push(handle);
            return;
        };

        let scope = registry.scopes.entry(token.id).or_default();
        if scope.generation != token.generation {
            // Scope moved on before the task was registered
            handle.abort();
            return;
        }
        scope.tasks.retain(|task| !task.is_finished());
        scope.tasks.push(handle);
    }

    /// Abort every tracked task and invalidate every scope.
    pub(crate) fn abort_everything(&self) -> usize {
        let mut registry = self.lock();
        let mut aborted = abort_all(&mut registry.detached);
        for scope in registry.scopes.values_mut() {
            scope.generation += 1;
            aborted += abort_all(&mut scope.tasks);
        }
        aborted
    }

    /// Number of tracked tasks that have not finished yet.
    pub(crate) fn running(&self) -> usize {
        let registry = self.lock();
        let scoped: usize = registry
            .scopes
            .values()
            .map(|scope| scope.tasks.iter().filter(|task| !task.is_finished()).count())
            .sum();
        scoped
            + registry
                .detached
                .iter()
                .filter(|task| !task.is_finished())
                .count()
    }
}

fn abort_all(tasks: &mut Vec<AbortHandle>) -> usize {
    let mut aborted = 0;
    for task in tasks.drain(..) {
        if !task.is_finished() {
            task.abort();
            aborted += 1;
        }
    }
    aborted
}
