use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use tokio::time::{Instant, sleep_until};
use tokio_util::sync::CancellationToken;
use tracing::{error, warn};

/// Compute the next wake target from a fixed origin.
///
/// `skip = floor(elapsed / interval) + 1`, so a run that overshoots one or
/// more whole intervals jumps past them instead of queueing catch-up runs.
/// Returns the new target and the number of missed targets (`skip - 1`).
pub fn next_target(target: Instant, now: Instant, interval: Duration) -> (Instant, u32) {
    debug_assert!(!interval.is_zero());
    let elapsed = now.saturating_duration_since(target);
    let skip = (elapsed.as_millis() / interval.as_millis()) as u32 + 1;
    (target + interval * skip, skip - 1)
}

/// Run `action` repeatedly so that invocations approximate wall-clock
/// multiples of `interval` from the starting instant.
///
/// A failed invocation is logged and the loop continues; cancellation via
/// the token stops the loop immediately, including mid-invocation. At most
/// one invocation is in flight at a time, and missed targets are dropped,
/// never executed back-to-back.
pub async fn repeat<F, Fut, E>(mut action: F, interval: Duration, cancel: CancellationToken)
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<(), E>>,
    E: Display,
{
    let mut target = Instant::now();
    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => return,
            result = action() => {
                if let Err(err) = result {
                    error!(%err, "ignoring error in repeated action");
                }
            }
        }

        let (next, missed) = next_target(target, Instant::now(), interval);
        if missed > 0 {
            warn!(missed, "skipping target times in the past");
        }
        target = next;

        tokio::select! {
            biased;
            _ = cancel.cancelled() => return,
            _ = sleep_until(target) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::convert::Infallible;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test(start_paused = true)]
    async fn next_target_skips_missed_intervals() {
        let interval = Duration::from_secs(60);
        let t0 = Instant::now();

        // Action finished 185s after its target: three targets were missed
        // and the next one is t0 + 240s.
        let (next, missed) = next_target(t0, t0 + Duration::from_secs(185), interval);
        assert_eq!(next, t0 + Duration::from_secs(240));
        assert_eq!(missed, 3);

        // On-time run advances by exactly one interval.
        let (next, missed) = next_target(t0, t0 + Duration::from_secs(1), interval);
        assert_eq!(next, t0 + Duration::from_secs(60));
        assert_eq!(missed, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn repeat_fires_on_interval_multiples_and_survives_errors() {
        let starts: Arc<parking_lot::Mutex<Vec<Instant>>> = Arc::default();
        let count = Arc::new(AtomicU32::new(0));
        let cancel = CancellationToken::new();

        let task = {
            let starts = starts.clone();
            let count = count.clone();
            let inner_cancel = cancel.clone();
            tokio::spawn(repeat(
                move || {
                    let starts = starts.clone();
                    let count = count.clone();
                    let cancel = inner_cancel.clone();
                    async move {
                        starts.lock().push(Instant::now());
                        let n = count.fetch_add(1, Ordering::SeqCst);
                        if n == 0 {
                            // Overrun the interval by more than three periods.
                            tokio::time::sleep(Duration::from_secs(185)).await;
                        }
                        if n == 2 {
                            cancel.cancel();
                        }
                        Err::<(), _>("synthetic failure")
                    }
                },
                Duration::from_secs(60),
                cancel.clone(),
            ))
        };

        task.await.unwrap();

        let starts = starts.lock();
        assert_eq!(starts.len(), 3);
        let t0 = starts[0];
        // First overrun pushes the next target to +240s, then cadence resumes.
        assert_eq!(starts[1] - t0, Duration::from_secs(240));
        assert_eq!(starts[2] - t0, Duration::from_secs(300));
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_interrupts_a_hung_action() {
        let cancel = CancellationToken::new();
        let task = tokio::spawn(repeat(
            || async {
                // Simulates a fetch that never completes.
                std::future::pending::<()>().await;
                Ok::<(), Infallible>(())
            },
            Duration::from_secs(60),
            cancel.clone(),
        ));

        tokio::time::sleep(Duration::from_secs(1)).await;
        cancel.cancel();
        task.await.unwrap();
    }
}
