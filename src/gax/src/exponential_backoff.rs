// Copyright 2025 Google LLC
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     https://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Truncated exponential backoff.
//!
//! The n-th retry waits `initial_delay * scaling^(n-1)`, multiplied by a
//! random jitter factor in `[0.8, 1.3)`. The result never exceeds the
//! maximum delay.
//!
//! The invoker only consults this policy when the service did not send a
//! `Retry-After` header with the failed response.

use crate::backoff_policy::BackoffPolicy;
use std::ops::Range;
use std::time::{Duration, Instant};

const JITTER: Range<f64> = 0.8..1.3;
const DEFAULT_INITIAL_DELAY: Duration = Duration::from_millis(800);
const DEFAULT_MAXIMUM_DELAY: Duration = Duration::from_secs(60);
const DEFAULT_SCALING: f64 = 2.0;

/// Invalid parameters for [ExponentialBackoffBuilder::build].
#[derive(thiserror::Error, Debug, PartialEq)]
#[non_exhaustive]
pub enum Error {
    #[error("the scaling factor must be at least 1.0, got {0}")]
    InvalidScalingFactor(f64),
    #[error("the initial delay must be positive, got {0:?}")]
    InvalidInitialDelay(Duration),
    #[error("the maximum delay ({maximum:?}) is smaller than the initial delay ({initial:?})")]
    EmptyRange {
        maximum: Duration,
        initial: Duration,
    },
}

/// Configures an [ExponentialBackoff].
///
/// # Example
/// ```
/// # use gax::exponential_backoff::{Error, ExponentialBackoffBuilder};
/// use std::time::Duration;
/// let backoff = ExponentialBackoffBuilder::new()
///     .with_initial_delay(Duration::from_millis(250))
///     .with_maximum_delay(Duration::from_secs(10))
///     .with_scaling(3.0)
///     .build()?;
/// # Ok::<(), Error>(())
/// ```
#[derive(Clone, Debug)]
pub struct ExponentialBackoffBuilder {
    initial_delay: Duration,
    maximum_delay: Duration,
    scaling: f64,
}

impl Default for ExponentialBackoffBuilder {
    fn default() -> Self {
        Self {
            initial_delay: DEFAULT_INITIAL_DELAY,
            maximum_delay: DEFAULT_MAXIMUM_DELAY,
            scaling: DEFAULT_SCALING,
        }
    }
}

impl ExponentialBackoffBuilder {
    /// Starts with an 800ms initial delay, a 60s maximum, and doubling delays.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_initial_delay<V: Into<Duration>>(mut self, v: V) -> Self {
        self.initial_delay = v.into();
        self
    }

    pub fn with_maximum_delay<V: Into<Duration>>(mut self, v: V) -> Self {
        self.maximum_delay = v.into();
        self
    }

    pub fn with_scaling<V: Into<f64>>(mut self, v: V) -> Self {
        self.scaling = v.into();
        self
    }

    /// Validates the parameters and creates the policy.
    ///
    /// ```
    /// # use gax::exponential_backoff::{Error, ExponentialBackoffBuilder};
    /// use std::time::Duration;
    /// let err = ExponentialBackoffBuilder::new()
    ///     .with_initial_delay(Duration::from_secs(10))
    ///     .with_maximum_delay(Duration::from_secs(1))
    ///     .build()
    ///     .unwrap_err();
    /// assert!(matches!(err, Error::EmptyRange { .. }));
    /// ```
    pub fn build(self) -> Result<ExponentialBackoff, Error> {
        if self.scaling.is_nan() || self.scaling < 1.0 {
            return Err(Error::InvalidScalingFactor(self.scaling));
        }
        if self.initial_delay.is_zero() {
            return Err(Error::InvalidInitialDelay(self.initial_delay));
        }
        if self.initial_delay > self.maximum_delay {
            return Err(Error::EmptyRange {
                maximum: self.maximum_delay,
                initial: self.initial_delay,
            });
        }
        Ok(ExponentialBackoff {
            initial_delay: self.initial_delay,
            maximum_delay: self.maximum_delay,
            scaling: self.scaling,
        })
    }

    /// Creates the policy, adjusting out of range parameters.
    ///
    /// The maximum delay is forced into `[1s, 24h]`, then the initial delay
    /// into `[1ms, maximum]`, and the scaling factor into `[1.0, 32.0]`.
    pub fn clamp(self) -> ExponentialBackoff {
        let maximum_delay = self
            .maximum_delay
            .clamp(Duration::from_secs(1), Duration::from_secs(24 * 60 * 60));
        let initial_delay = self
            .initial_delay
            .clamp(Duration::from_millis(1), maximum_delay);
        let scaling = if self.scaling.is_nan() {
            DEFAULT_SCALING
        } else {
            self.scaling.clamp(1.0, 32.0)
        };
        ExponentialBackoff {
            initial_delay,
            maximum_delay,
            scaling,
        }
    }
}

/// A [BackoffPolicy] with exponentially growing, jittered delays.
///
/// This is the default backoff policy of the request invoker.
#[derive(Clone, Debug)]
pub struct ExponentialBackoff {
    initial_delay: Duration,
    maximum_delay: Duration,
    scaling: f64,
}

impl Default for ExponentialBackoff {
    fn default() -> Self {
        ExponentialBackoffBuilder::default().clamp()
    }
}

impl ExponentialBackoff {
    /// The delay before jitter for the given attempt. Attempts start at 1.
    fn base_delay(&self, attempt_count: u32) -> Duration {
        let exponent = attempt_count.saturating_sub(1).min(i32::MAX as u32) as i32;
        let secs = self.initial_delay.as_secs_f64() * self.scaling.powi(exponent);
        if secs >= self.maximum_delay.as_secs_f64() {
            return self.maximum_delay;
        }
        Duration::try_from_secs_f64(secs).unwrap_or(self.maximum_delay)
    }

    fn jittered(&self, attempt_count: u32, rng: &mut impl rand::Rng) -> Duration {
        let factor = rng.random_range(JITTER);
        self.base_delay(attempt_count)
            .mul_f64(factor)
            .min(self.maximum_delay)
    }
}

impl BackoffPolicy for ExponentialBackoff {
    fn on_failure(&self, _loop_start: Instant, attempt_count: u32) -> Duration {
        self.jittered(attempt_count, &mut rand::rng())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    // Always returns the same value, so `random_range()` is predictable.
    struct FixedRng(u64);

    impl rand::RngCore for FixedRng {
        fn next_u32(&mut self) -> u32 {
            self.0 as u32
        }
        fn next_u64(&mut self) -> u64 {
            self.0
        }
        fn fill_bytes(&mut self, dst: &mut [u8]) {
            rand::rand_core::impls::fill_bytes_via_next(self, dst)
        }
    }

    fn backoff(initial: u64, maximum: u64, scaling: f64) -> ExponentialBackoff {
        ExponentialBackoffBuilder::new()
            .with_initial_delay(Duration::from_secs(initial))
            .with_maximum_delay(Duration::from_secs(maximum))
            .with_scaling(scaling)
            .build()
            .expect("valid test parameters")
    }

    #[test]
    fn defaults() {
        let got = ExponentialBackoff::default();
        assert_eq!(got.initial_delay, DEFAULT_INITIAL_DELAY);
        assert_eq!(got.maximum_delay, DEFAULT_MAXIMUM_DELAY);
        assert_eq!(got.scaling, DEFAULT_SCALING);
        assert!(ExponentialBackoffBuilder::new().build().is_ok());
    }

    #[test_case(Duration::ZERO, Duration::from_secs(5), 2.0, Error::InvalidInitialDelay(Duration::ZERO))]
    #[test_case(Duration::from_secs(1), Duration::from_secs(5), 0.5, Error::InvalidScalingFactor(0.5))]
    #[test_case(Duration::from_secs(1), Duration::from_secs(5), -2.0, Error::InvalidScalingFactor(-2.0))]
    #[test_case(
        Duration::from_secs(6),
        Duration::from_secs(5),
        2.0,
        Error::EmptyRange { maximum: Duration::from_secs(5), initial: Duration::from_secs(6) }
    )]
    fn build_errors(initial: Duration, maximum: Duration, scaling: f64, want: Error) {
        let got = ExponentialBackoffBuilder::new()
            .with_initial_delay(initial)
            .with_maximum_delay(maximum)
            .with_scaling(scaling)
            .build()
            .expect_err("invalid parameters");
        assert_eq!(got, want);
    }

    #[test]
    fn build_nan_scaling() {
        let got = ExponentialBackoffBuilder::new().with_scaling(f64::NAN).build();
        assert!(matches!(got, Err(Error::InvalidScalingFactor(_))), "{got:?}");
        let got = ExponentialBackoffBuilder::new().with_scaling(f64::NAN).clamp();
        assert_eq!(got.scaling, DEFAULT_SCALING);
    }

    #[test_case(Duration::ZERO, Duration::ZERO, 0.0)]
    #[test_case(Duration::from_secs(30), Duration::from_secs(10), 100.0)]
    #[test_case(Duration::from_secs(1), Duration::MAX, 8.0)]
    #[test_case(Duration::from_nanos(1), Duration::from_millis(1), 1.0)]
    fn clamp(initial: Duration, maximum: Duration, scaling: f64) {
        let got = ExponentialBackoffBuilder::new()
            .with_initial_delay(initial)
            .with_maximum_delay(maximum)
            .with_scaling(scaling)
            .clamp();
        assert!((1.0..=32.0).contains(&got.scaling), "{got:?}");
        assert!(got.maximum_delay >= Duration::from_secs(1), "{got:?}");
        assert!(got.maximum_delay <= Duration::from_secs(24 * 60 * 60), "{got:?}");
        assert!(got.initial_delay >= Duration::from_millis(1), "{got:?}");
        assert!(got.initial_delay <= got.maximum_delay, "{got:?}");
    }

    #[test]
    fn base_delay_grows_until_maximum() {
        let b = backoff(2, 20, 3.0);
        let got: Vec<_> = (1..=4).map(|a| b.base_delay(a)).collect();
        let want = [2, 6, 18, 20].map(Duration::from_secs);
        assert_eq!(got, want);
        assert_eq!(b.base_delay(u32::MAX), Duration::from_secs(20));
        assert_eq!(b.base_delay(0), Duration::from_secs(2));
    }

    #[test]
    fn jitter_range() {
        let b = backoff(10, 100, 2.0);
        let low = b.jittered(1, &mut FixedRng(0));
        assert!(
            low >= Duration::from_millis(7_999) && low <= Duration::from_millis(8_001),
            "{low:?}"
        );
        let high = b.jittered(1, &mut FixedRng(u64::MAX));
        assert!(
            high > Duration::from_millis(12_900) && high <= Duration::from_secs(13),
            "{high:?}"
        );
    }

    #[test]
    fn jitter_never_exceeds_maximum() {
        let b = backoff(10, 10, 2.0);
        for attempt in [1, 2, 10] {
            assert_eq!(
                b.jittered(attempt, &mut FixedRng(u64::MAX)),
                Duration::from_secs(10)
            );
        }
    }

    #[test]
    fn on_failure() {
        let b = backoff(1, 4, 2.0);
        let start = Instant::now();
        for (attempt, base) in [(1, 1_000), (2, 2_000), (3, 4_000), (7, 4_000)] {
            let got = b.on_failure(start, attempt);
            let low = Duration::from_millis(base * 8 / 10 - 1);
            assert!(got >= low, "attempt={attempt} {got:?}");
            assert!(got <= Duration::from_secs(4), "attempt={attempt} {got:?}");
        }
    }
}
