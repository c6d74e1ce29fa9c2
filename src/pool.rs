//! Fixed-size pool of pre-connected controller sessions.
//!
//! Every session is connected before the pool is handed out; a pool that could
//! only open some of its sessions is torn down instead of running under
//! capacity. Sessions are lent through [`SessionLease`] guards. Waiting for a
//! free session parks the task on a fair semaphore, and the slot hand-off plus
//! the busy bookkeeping happen under a single lock, so a session is never
//! claimed twice and never stays marked busy after its lease is gone.

use std::collections::VecDeque;
use std::ops::{Deref, DerefMut};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use log::{debug, warn};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::config::PollerConfig;
use crate::controller::Controller;
use crate::error::WlcError;
use crate::session::Session;

const CONNECT_GRACE: Duration = Duration::from_secs(1);

/// One long-lived controller session and its exclusive-use flag.
struct PooledSession<S> {
    id: usize,
    client: Controller<S>,
    in_use: bool,
}

/// Point-in-time view of the pool bookkeeping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolStats {
    pub size: usize,
    pub busy: usize,
    pub idle: usize,
    /// Highest number of sessions leased at the same time.
    pub peak_busy: usize,
    pub closed: bool,
}

struct PoolState<S> {
    idle: VecDeque<PooledSession<S>>,
    busy: usize,
    peak_busy: usize,
    closed: bool,
}

struct PoolShared<S> {
    size: usize,
    state: Mutex<PoolState<S>>,
    /// One permit per idle session.
    available: Semaphore,
}

impl<S> PoolShared<S> {
    fn lock_state(&self) -> MutexGuard<'_, PoolState<S>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn give_back(&self, mut slot: PooledSession<S>) {
        {
            let mut state = self.lock_state();
            slot.in_use = false;
            state.busy -= 1;
            state.idle.push_back(slot);
        }
        self.available.add_permits(1);
    }
}

/// Bounded pool of connected [`Controller`]s.
pub struct ConnectionPool<S> {
    shared: Arc<PoolShared<S>>,
}

impl<S> Clone for ConnectionPool<S> {
    fn clone(&self) -> Self {
        Self {
            shared: self.shared.clone(),
        }
    }
}

impl<S: Session + 'static> ConnectionPool<S> {
    /// Builds `config.pool_size` controllers with `factory` and connects them
    /// concurrently.
    ///
    /// Fails if any session does not connect within the connect timeout; the
    /// sessions that did connect are closed again before returning.
    pub async fn connect<F>(config: &PollerConfig, mut factory: F) -> Result<Self, WlcError>
    where
        F: FnMut(usize) -> Controller<S>,
    {
        config.validate()?;
        let timeout = config.connect_timeout();
        // Sessions enforce `timeout` themselves and clean up before giving up.
        let hard_limit = timeout + CONNECT_GRACE;

        let mut tasks = JoinSet::new();
        for index in 0..config.pool_size {
            let mut client = factory(index);
            tasks.spawn(async move {
                let result = match tokio::time::timeout(hard_limit, client.connect(timeout)).await {
                    Ok(result) => result,
                    Err(_) => Err(WlcError::ConnectTimeout(timeout.as_secs())),
                };
                (index, client, result)
            });
        }

        let mut connected = Vec::with_capacity(config.pool_size);
        let mut failure = None;
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, client, Ok(()))) => {
                    debug!("pool session {} connected to {}", index, client.target());
                    connected.push(PooledSession {
                        id: index,
                        client,
                        in_use: false,
                    });
                }
                Ok((index, client, Err(err))) => {
                    warn!("pool session {} to {} failed: {}", index, client.target(), err);
                    failure.get_or_insert(WlcError::PoolInit {
                        index,
                        source: Box::new(err),
                    });
                }
                Err(err) => {
                    failure.get_or_insert(WlcError::Internal(format!(
                        "pool connect task failed: {err}"
                    )));
                }
            }
        }

        if let Some(err) = failure {
            for mut slot in connected {
                slot.client.disconnect().await;
            }
            return Err(err);
        }

        connected.sort_by_key(|slot| slot.id);
        debug!("connection pool ready with {} sessions", connected.len());
        Ok(Self {
            shared: Arc::new(PoolShared {
                size: config.pool_size,
                available: Semaphore::new(connected.len()),
                state: Mutex::new(PoolState {
                    idle: connected.into(),
                    busy: 0,
                    peak_busy: 0,
                    closed: false,
                }),
            }),
        })
    }

    /// Waits for a free session and leases it exclusively.
    pub async fn acquire(&self) -> Result<SessionLease<S>, WlcError> {
        let permit = self
            .shared
            .available
            .acquire()
            .await
            .map_err(|_| WlcError::PoolClosed)?;
        permit.forget();

        let mut state = self.shared.lock_state();
        let Some(mut slot) = state.idle.pop_front() else {
            return Err(WlcError::PoolClosed);
        };
        slot.in_use = true;
        state.busy += 1;
        state.peak_busy = state.peak_busy.max(state.busy);
        drop(state);

        Ok(SessionLease {
            slot: Some(slot),
            shared: self.shared.clone(),
        })
    }

    /// Returns a leased session; same as dropping the lease.
    pub fn release(&self, lease: SessionLease<S>) {
        drop(lease);
    }

    pub fn size(&self) -> usize {
        self.shared.size
    }

    /// Sessions currently leased.
    pub fn busy(&self) -> usize {
        self.shared.lock_state().busy
    }

    pub fn idle(&self) -> usize {
        self.shared.lock_state().idle.len()
    }

    pub fn stats(&self) -> PoolStats {
        let state = self.shared.lock_state();
        PoolStats {
            size: self.shared.size,
            busy: state.busy,
            idle: state.idle.len(),
            peak_busy: state.peak_busy,
            closed: state.closed,
        }
    }

    /// Waits for every lease to come back, then disconnects each session once
    /// and closes the pool. Later calls do nothing.
    pub async fn shutdown(&self) {
        let all = u32::try_from(self.shared.size).unwrap_or(u32::MAX);
        match self.shared.available.acquire_many(all).await {
            Ok(permits) => permits.forget(),
            Err(_) => {
                debug!("connection pool already closed");
                return;
            }
        }
        self.shared.available.close();

        let slots: Vec<PooledSession<S>> = {
            let mut state = self.shared.lock_state();
            state.closed = true;
            state.idle.drain(..).collect()
        };
        for mut slot in slots {
            debug!("closing pool session {} to {}", slot.id, slot.client.target());
            slot.client.disconnect().await;
        }
    }
}

/// Exclusive use of one pooled session; returned to the pool on drop.
pub struct SessionLease<S> {
    slot: Option<PooledSession<S>>,
    shared: Arc<PoolShared<S>>,
}

impl<S> SessionLease<S> {
    fn slot(&self) -> &PooledSession<S> {
        match &self.slot {
            Some(slot) => slot,
            None => unreachable!("lease used after release"),
        }
    }

    /// Pool slot of the leased session.
    pub fn id(&self) -> usize {
        self.slot().id
    }

    pub fn in_use(&self) -> bool {
        self.slot().in_use
    }
}

impl<S> Deref for SessionLease<S> {
    type Target = Controller<S>;

    fn deref(&self) -> &Self::Target {
        &self.slot().client
    }
}

impl<S> DerefMut for SessionLease<S> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        match &mut self.slot {
            Some(slot) => &mut slot.client,
            None => unreachable!("lease used after release"),
        }
    }
}

impl<S> Drop for SessionLease<S> {
    fn drop(&mut self) {
        if let Some(slot) = self.slot.take() {
            self.shared.give_back(slot);
        }
    }
}
