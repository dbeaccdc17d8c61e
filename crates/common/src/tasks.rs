use std::future::Future;

use tokio_util::sync::CancellationToken;

/// Drive a long-running job until it finishes or `token` is cancelled
pub async fn run_until_cancelled<R>(token: CancellationToken, job: &str, f: impl Future<Output = R>) {
    tokio::select! {
        _ = token.cancelled() => log::debug!("{job} job cancelled"),
        _ = f => log::debug!("{job} job finished"),
    }
}
