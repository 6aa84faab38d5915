//! Wall-clock measurement of async operations.

use std::future::Future;
use std::time::{Duration, Instant};

/// Value produced by an operation together with how long it took.
///
/// When the operation is fallible, `value` is the `Result` itself: the
/// failure is handed back untouched next to the elapsed time.
#[derive(Debug, Clone)]
pub struct Timed<T> {
    pub value: T,
    pub elapsed: Duration,
}

impl<T> Timed<T> {
    /// Elapsed time in milliseconds, sub-millisecond precision.
    pub fn elapsed_ms(&self) -> f64 {
        duration_ms(self.elapsed)
    }

    pub fn into_parts(self) -> (T, Duration) {
        (self.value, self.elapsed)
    }
}

/// Run `operation` to completion on a monotonic clock.
pub async fn measure<F>(operation: F) -> Timed<F::Output>
where
    F: Future,
{
    let stopwatch = Stopwatch::start();
    let value = operation.await;
    Timed {
        value,
        elapsed: stopwatch.elapsed(),
    }
}

/// Manually started monotonic clock, for spans that cover several awaits.
#[derive(Debug, Clone, Copy)]
pub struct Stopwatch {
    started: Instant,
}

impl Stopwatch {
    pub fn start() -> Self {
        Self {
            started: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    pub fn elapsed_ms(&self) -> f64 {
        duration_ms(self.elapsed())
    }
}

pub fn duration_ms(d: Duration) -> f64 {
    d.as_secs_f64() * 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_measure_reports_elapsed() {
        let timed = measure(async {
            tokio::time::sleep(Duration::from_millis(20)).await;
            7
        })
        .await;
        assert_eq!(timed.value, 7);
        assert!(timed.elapsed >= Duration::from_millis(20));
        assert!(timed.elapsed_ms() >= 20.0);
    }

    #[tokio::test]
    async fn test_measure_keeps_failure() {
        let timed = measure(async {
            tokio::time::sleep(Duration::from_millis(5)).await;
            Err::<(), _>("boom")
        })
        .await;
        let (value, elapsed) = timed.into_parts();
        assert_eq!(value, Err("boom"));
        assert!(elapsed >= Duration::from_millis(5));
    }

    #[test]
    fn test_duration_ms_precision() {
        assert_eq!(duration_ms(Duration::from_micros(1500)), 1.5);
    }
}
