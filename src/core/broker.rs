//! Rate-limited request broker in front of the narration service.
//!
//! One worker task drains a FIFO queue. Each queued request runs to
//! completion (retries included) before the next one starts, and the worker
//! sleeps `min_interval` between requests.

use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::{Duration, Instant};

use backon::{ConstantBuilder, Retryable};
use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use tokio::sync::{mpsc, oneshot, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::error::{ForecastError, NarrationError};
use crate::metrics::Metrics;
use crate::services::narration::{NarrationRequest, NarrationService};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BrokerConfig {
    /// Pause after every request before the next one is started.
    pub min_interval: Duration,
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            min_interval: Duration::from_secs(1),
        }
    }
}

/// Bounded attempts with a fixed delay between them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: usize,
    pub delay: Duration,
}

impl RetryPolicy {
    /// Single attempt.
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            delay: Duration::ZERO,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay: Duration::from_secs(2),
        }
    }
}

type Job = Box<dyn FnOnce() -> BoxFuture<'static, ()> + Send>;

/// Resolves to the value produced by a submitted request.
///
/// Dropping the handle does not retract the request; it still runs and its
/// result is discarded.
pub struct BrokerHandle<T> {
    rx: oneshot::Receiver<Result<T, NarrationError>>,
}

impl<T> Future for BrokerHandle<T> {
    type Output = Result<T, ForecastError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.rx).poll(cx).map(|received| match received {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(err)) => Err(ForecastError::Narration(err)),
            Err(_) => Err(ForecastError::BrokerUnavailable(
                "request was dropped before completing".to_string(),
            )),
        })
    }
}

pub struct NarrationBroker {
    service: Arc<dyn NarrationService>,
    config: BrokerConfig,
    metrics: Option<Arc<Metrics>>,
    sender: Arc<RwLock<Option<mpsc::UnboundedSender<Job>>>>,
    handle: Arc<RwLock<Option<JoinHandle<()>>>>,
}

impl NarrationBroker {
    pub fn new(
        service: Arc<dyn NarrationService>,
        config: BrokerConfig,
        metrics: Option<Arc<Metrics>>,
    ) -> Self {
        Self {
            service,
            config,
            metrics,
            sender: Arc::new(RwLock::new(None)),
            handle: Arc::new(RwLock::new(None)),
        }
    }

    pub fn config(&self) -> BrokerConfig {
        self.config
    }

    /// Spawns the worker. Calling it on a running broker is a no-op.
    pub async fn start(&self) {
        let mut sender = self.sender.write().await;
        let mut handle = self.handle.write().await;
        if sender.is_some() && handle.as_ref().is_some_and(|h| !h.is_finished()) {
            debug!("NarrationBroker: already running");
            return;
        }

        let (tx, rx) = mpsc::unbounded_channel::<Job>();
        let interval = self.config.min_interval;
        *handle = Some(tokio::spawn(run_worker(rx, interval)));
        *sender = Some(tx);

        info!(
            interval_ms = interval.as_millis() as u64,
            "NarrationBroker: started"
        );
    }

    /// Closes the queue and waits for already-queued requests to finish.
    pub async fn stop(&self) {
        // Dropping the last sender ends the worker loop once the queue drains.
        self.sender.write().await.take();
        let handle = self.handle.write().await.take();
        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                error!(error = %e, "NarrationBroker: worker ended abnormally");
            }
            info!("NarrationBroker: stopped");
        }
    }

    pub async fn is_running(&self) -> bool {
        let sender = self.sender.read().await;
        let handle = self.handle.read().await;
        sender.is_some() && handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Queues `request_fn` for execution under `policy`.
    ///
    /// Fails fast with [`ForecastError::BrokerUnavailable`] when the worker is
    /// not running.
    pub async fn submit<T, F, Fut>(
        &self,
        policy: RetryPolicy,
        request_fn: F,
    ) -> Result<BrokerHandle<T>, ForecastError>
    where
        T: Send + 'static,
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, NarrationError>> + Send + 'static,
    {
        let (tx, rx) = oneshot::channel();
        let interval = self.config.min_interval;
        let metrics = self.metrics.clone();

        let job: Job = Box::new(move || {
            async move {
                if let Some(m) = &metrics {
                    m.narration_queue_depth.dec();
                }
                let started = Instant::now();
                let result = run_with_retry(policy, interval, request_fn).await;
                if let Some(m) = &metrics {
                    m.narration_duration_seconds
                        .observe(started.elapsed().as_secs_f64());
                    if let Err(e) = &result {
                        m.narration_failures_total
                            .with_label_values(&[e.kind()])
                            .inc();
                    }
                }
                // The caller may have given up on the handle.
                let _ = tx.send(result);
            }
            .boxed()
        });

        let sender = self.sender.read().await;
        let Some(sender) = sender.as_ref() else {
            return Err(ForecastError::BrokerUnavailable(
                "broker is not running".to_string(),
            ));
        };

        if let Some(m) = &self.metrics {
            m.narration_queue_depth.inc();
        }
        if sender.send(job).is_err() {
            if let Some(m) = &self.metrics {
                m.narration_queue_depth.dec();
            }
            warn!("NarrationBroker: worker is gone, rejecting request");
            return Err(ForecastError::BrokerUnavailable(
                "broker worker has terminated".to_string(),
            ));
        }
        if let Some(m) = &self.metrics {
            m.narration_requests_total.inc();
        }

        Ok(BrokerHandle { rx })
    }

    /// Routes a narration request to the owned service.
    pub async fn narrate(
        &self,
        request: NarrationRequest,
        policy: RetryPolicy,
    ) -> Result<BrokerHandle<String>, ForecastError> {
        let service = self.service.clone();
        let request = Arc::new(request);
        debug!(
            symbol = %request.symbol,
            kind = request.kind.as_str(),
            "NarrationBroker: queueing narration"
        );
        self.submit(policy, move || {
            let service = service.clone();
            let request = request.clone();
            async move { service.generate(&request).await }
        })
        .await
    }
}

async fn run_with_retry<T, F, Fut>(
    policy: RetryPolicy,
    interval: Duration,
    request_fn: F,
) -> Result<T, NarrationError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, NarrationError>>,
{
    let backoff = ConstantBuilder::default()
        .with_delay(policy.delay.max(interval))
        .with_max_times(policy.max_attempts.saturating_sub(1));

    request_fn
        .retry(backoff)
        .sleep(tokio::time::sleep)
        .when(NarrationError::is_transient)
        .notify(|err: &NarrationError, delay: Duration| {
            warn!(
                error = %err,
                delay_ms = delay.as_millis() as u64,
                "NarrationBroker: request failed, retrying"
            );
        })
        .await
}

async fn run_worker(mut rx: mpsc::UnboundedReceiver<Job>, interval: Duration) {
    debug!("NarrationBroker: worker waiting for requests");
    while let Some(job) = rx.recv().await {
        if AssertUnwindSafe(job()).catch_unwind().await.is_err() {
            error!("NarrationBroker: request panicked, worker continues");
        }
        tokio::time::sleep(interval).await;
    }
    debug!("NarrationBroker: queue closed, worker exiting");
}
