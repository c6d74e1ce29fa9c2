//! Fan-out of per-AP status polls over a [`ConnectionPool`].

use std::collections::HashMap;
use std::sync::Arc;

use log::{debug, warn};
use tokio::sync::Mutex;
use tokio::task::JoinSet;

use crate::models::{AccessPoint, ApStatus, PollReport};
use crate::pool::ConnectionPool;
use crate::session::Session;

/// Polls port status and LLDP neighbor of every AP in `aps`.
///
/// One task is spawned per AP; the pool caps how many run their queries at
/// once. Every AP contributes exactly one [`ApStatus`], zero-valued when no
/// session could be leased for it or its task died. Statuses appear in
/// completion order.
pub async fn poll_access_points<S>(pool: &ConnectionPool<S>, aps: &[AccessPoint]) -> PollReport
where
    S: Session + 'static,
{
    let results = Arc::new(Mutex::new(Vec::with_capacity(aps.len())));
    let mut tasks = JoinSet::new();
    let mut pending = HashMap::with_capacity(aps.len());

    for ap in aps {
        let task_ap = ap.clone();
        let pool = pool.clone();
        let results = results.clone();
        let handle = tasks.spawn(async move {
            let ap = task_ap;
            let status = match pool.acquire().await {
                Ok(mut lease) => {
                    let status = lease.poll_status(&ap).await;
                    pool.release(lease);
                    status
                }
                Err(e) => {
                    warn!("no session for AP {}: {}", ap.name, e);
                    ApStatus::unreachable(&ap)
                }
            };
            results.lock().await.push(status);
        });
        pending.insert(handle.id(), ap);
    }

    let mut lost = Vec::new();
    while let Some(joined) = tasks.join_next_with_id().await {
        match joined {
            Ok((id, ())) => {
                pending.remove(&id);
            }
            Err(e) => {
                let Some(ap) = pending.remove(&e.id()) else {
                    warn!("poll task failed: {}", e);
                    continue;
                };
                warn!("poll task for AP {} failed: {}", ap.name, e);
                lost.push(ApStatus::unreachable(ap));
            }
        }
    }

    let mut statuses = std::mem::take(&mut *results.lock().await);
    statuses.extend(lost);
    debug!("polled {} of {} APs", statuses.len(), aps.len());
    PollReport { statuses }
}
