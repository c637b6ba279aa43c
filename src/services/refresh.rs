use std::sync::Arc;

use futures::stream::{FuturesUnordered, StreamExt};
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::provider::PoolProvider;
use super::router_service::RouterService;

/// Outcome of one refresh sweep over the tracked denom pairs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RefreshSummary {
    pub refreshed: usize,
    pub failed: usize,
    pub cancelled: usize,
}

/// Recomputes and re-caches candidate routes for every tracked denom pair.
///
/// Runs each pair on a blocking worker behind a semaphore so that at most
/// `concurrency` recomputations are in flight, and drains the full task set
/// before returning, so callers get completion tracking instead of
/// fire-and-forget task growth. Cancellation stops scheduling new pairs;
/// pairs already in flight run to completion.
pub async fn refresh_candidate_routes<P>(
    service: Arc<RouterService<P>>,
    pairs: Vec<(String, String)>,
    concurrency: usize,
    cancel: CancellationToken,
) -> RefreshSummary
where
    P: PoolProvider + 'static,
{
    let semaphore = Arc::new(Semaphore::new(concurrency.max(1)));
    let mut tasks = FuturesUnordered::new();
    let mut summary = RefreshSummary::default();

    for (token_in_denom, token_out_denom) in pairs {
        if cancel.is_cancelled() {
            summary.cancelled += 1;
            continue;
        }

        let permit = match Arc::clone(&semaphore).acquire_owned().await {
            Ok(permit) => permit,
            Err(_) => break,
        };

        let service = Arc::clone(&service);
        tasks.push(tokio::task::spawn_blocking(move || {
            let result = service.recompute_candidate_routes(&token_in_denom, &token_out_denom);
            drop(permit);
            (token_in_denom, token_out_denom, result)
        }));
    }

    while let Some(joined) = tasks.next().await {
        match joined {
            Ok((token_in_denom, token_out_denom, Ok(routes))) => {
                debug!(
                    token_in = token_in_denom.as_str(),
                    token_out = token_out_denom.as_str(),
                    num_routes = routes.len(),
                    "refreshed candidate routes"
                );
                summary.refreshed += 1;
            }
            Ok((token_in_denom, token_out_denom, Err(err))) => {
                warn!(
                    token_in = token_in_denom.as_str(),
                    token_out = token_out_denom.as_str(),
                    error = %err,
                    "failed to refresh candidate routes"
                );
                summary.failed += 1;
            }
            Err(join_err) => {
                warn!(error = %join_err, "candidate route refresh task failed to join");
                summary.failed += 1;
            }
        }
    }

    summary
}
