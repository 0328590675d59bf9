//! Status polling
//!
//! Polling is a plain function of a status-fetch capability, an interval and
//! an optional deadline. It runs on `tokio::time`, so tests drive it with
//! paused time instead of real sleeps, and dropping the future cancels it.

use std::future::Future;
use std::time::Duration;

use chrono::{DateTime, Local};
use tokio::time::Instant;
use tracing::{error, info, warn};

use crate::error::AppResult;

/// Wall-clock source for result timestamps
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Local>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// Wall clock that follows `tokio::time`, so it advances with paused test time
#[cfg(test)]
#[derive(Debug, Clone, Copy)]
pub struct TokioClock {
    base: DateTime<Local>,
    origin: Instant,
}

#[cfg(test)]
impl TokioClock {
    pub fn starting_at(base: DateTime<Local>) -> Self {
        Self {
            base,
            origin: Instant::now(),
        }
    }
}

#[cfg(test)]
impl Clock for TokioClock {
    fn now(&self) -> DateTime<Local> {
        let elapsed = chrono::Duration::from_std(self.origin.elapsed())
            .unwrap_or_else(|_| chrono::Duration::zero());
        self.base + elapsed
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSettings {
    pub interval: Duration,
    /// `None` waits forever
    pub deadline: Option<Duration>,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(10),
            deadline: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    /// A terminal status was observed after `polls` fetches
    Completed { polls: u32 },
    /// The deadline passed first
    TimedOut {
        polls: u32,
        last_status: Option<String>,
    },
}

/// Consecutive failed status fetches tolerated before polling gives up
pub const MAX_CONSECUTIVE_FAILURES: u32 = 3;

/// Fetch a status every `interval` until `is_terminal` accepts it or the
/// deadline passes.
///
/// A failed fetch is logged and treated like a non-terminal status, unless
/// it is the `MAX_CONSECUTIVE_FAILURES`th in a row, in which case its error
/// is returned.
pub async fn poll_until<F, Fut, P>(
    settings: PollSettings,
    mut fetch: F,
    is_terminal: P,
) -> AppResult<PollOutcome>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = AppResult<String>>,
    P: Fn(&str) -> bool,
{
    let started = Instant::now();
    let mut polls = 0u32;
    let mut failures = 0u32;
    let mut last_status = None;

    loop {
        polls += 1;
        match fetch().await {
            Ok(status) => {
                if is_terminal(&status) {
                    return Ok(PollOutcome::Completed { polls });
                }
                failures = 0;
                info!(poll = polls, status = %status, "Not finished yet");
                last_status = Some(status);
            }
            Err(e) => {
                failures += 1;
                if failures >= MAX_CONSECUTIVE_FAILURES {
                    error!(poll = polls, "Giving up after {} failed status checks", failures);
                    return Err(e);
                }
                warn!(poll = polls, "Status check failed: {}", e);
            }
        }

        if let Some(deadline) = settings.deadline {
            if started.elapsed() + settings.interval > deadline {
                return Ok(PollOutcome::TimedOut { polls, last_status });
            }
        }

        tokio::time::sleep(settings.interval).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chaos::EXECUTION_SUCCESSFUL;
    use crate::error::AppError;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    fn scripted(
        responses: Vec<AppResult<String>>,
    ) -> impl FnMut() -> std::future::Ready<AppResult<String>> {
        let queue = Arc::new(Mutex::new(VecDeque::from(responses)));
        move || {
            let next = queue
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(String::new()));
            std::future::ready(next)
        }
    }

    fn is_done(status: &str) -> bool {
        status == EXECUTION_SUCCESSFUL
    }

    #[tokio::test(start_paused = true)]
    async fn test_completes_on_exact_match_only() {
        let fetch = scripted(vec![
            Ok(String::new()),
            Ok("Running".to_string()),
            Ok("execution successful".to_string()),
            Ok("Execution Successful ".to_string()),
            Ok(EXECUTION_SUCCESSFUL.to_string()),
        ]);

        let start = Instant::now();
        let outcome = poll_until(PollSettings::default(), fetch, is_done).await.unwrap();

        assert_eq!(outcome, PollOutcome::Completed { polls: 5 });
        assert!(start.elapsed() >= Duration::from_secs(40));
        assert!(start.elapsed() < Duration::from_secs(41));
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetch_errors_keep_polling() {
        let fetch = scripted(vec![
            Err(AppError::internal("connection refused")),
            Ok(EXECUTION_SUCCESSFUL.to_string()),
        ]);

        let outcome = poll_until(PollSettings::default(), fetch, is_done).await.unwrap();
        assert_eq!(outcome, PollOutcome::Completed { polls: 2 });
    }

    #[derive(Clone, Default)]
    struct LogBuffer(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for LogBuffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_pending_polls_logged_at_info() {
        let logs = LogBuffer::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::INFO)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let fetch = scripted(vec![
            Ok("Running".to_string()),
            Ok(EXECUTION_SUCCESSFUL.to_string()),
        ]);
        poll_until(PollSettings::default(), fetch, is_done).await.unwrap();

        let output = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
        assert!(output.contains("INFO"));
        assert!(output.contains("Not finished yet"));
        assert!(output.contains("Running"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_successful_fetch_resets_failure_count() {
        let fetch = scripted(vec![
            Err(AppError::internal("connection refused")),
            Err(AppError::internal("connection refused")),
            Ok("Running".to_string()),
            Err(AppError::internal("connection refused")),
            Err(AppError::internal("connection refused")),
            Ok(EXECUTION_SUCCESSFUL.to_string()),
        ]);

        let outcome = poll_until(PollSettings::default(), fetch, is_done).await.unwrap();
        assert_eq!(outcome, PollOutcome::Completed { polls: 6 });
    }

    #[tokio::test(start_paused = true)]
    async fn test_persistent_fetch_errors_end_polling() {
        let fetch = scripted(
            (0..100)
                .map(|_| Err(AppError::internal("chaosengines.litmuschaos.io not found")))
                .collect(),
        );

        let start = Instant::now();
        let result = poll_until(PollSettings::default(), fetch, is_done).await;

        match result {
            Err(AppError::Internal(message)) => assert!(message.contains("not found")),
            other => panic!("unexpected result: {other:?}"),
        }
        assert!(start.elapsed() < Duration::from_secs(21));
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline() {
        let fetch = scripted((0..100).map(|_| Ok("Running".to_string())).collect());
        let settings = PollSettings {
            interval: Duration::from_secs(10),
            deadline: Some(Duration::from_secs(30)),
        };

        let start = Instant::now();
        let outcome = poll_until(settings, fetch, is_done).await.unwrap();

        assert_eq!(
            outcome,
            PollOutcome::TimedOut {
                polls: 4,
                last_status: Some("Running".to_string()),
            }
        );
        assert!(start.elapsed() >= Duration::from_secs(30));
        assert!(start.elapsed() < Duration::from_secs(31));
    }

    #[tokio::test(start_paused = true)]
    async fn test_unbounded_poll_can_be_cancelled() {
        let fetch = scripted(Vec::new());
        let poll = poll_until(PollSettings::default(), fetch, is_done);

        let result = tokio::time::timeout(Duration::from_secs(3600), poll).await;
        assert!(result.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_tokio_clock_follows_paused_time() {
        let clock = TokioClock::starting_at(Local::now());
        let before = clock.now();
        tokio::time::sleep(Duration::from_secs(90)).await;
        assert!(clock.now() - before >= chrono::Duration::seconds(90));
    }
}
