// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Retry with exponential backoff for transient HTTP failures.

use std::future::Future;
use std::time::Duration;

use tracing::warn;

/// Configuration for retry behavior.
#[derive(Debug, Clone)]
pub struct RetryConfig {
	/// Maximum number of retries after the initial attempt.
	pub max_retries: u32,
	/// Backoff before the first retry; doubles per attempt.
	pub initial_backoff: Duration,
	/// Upper bound on the backoff between attempts.
	pub max_backoff: Duration,
}

impl Default for RetryConfig {
	fn default() -> Self {
		Self {
			max_retries: 3,
			initial_backoff: Duration::from_millis(500),
			max_backoff: Duration::from_secs(10),
		}
	}
}

/// Errors that can classify themselves as transient.
pub trait RetryableError {
	/// Returns true if the operation that produced this error is worth
	/// retrying.
	fn is_retryable(&self) -> bool;
}

impl RetryableError for reqwest::Error {
	fn is_retryable(&self) -> bool {
		if self.is_timeout() || self.is_connect() {
			return true;
		}
		match self.status() {
			Some(status) => matches!(status.as_u16(), 429 | 408 | 500 | 502 | 503 | 504),
			None => false,
		}
	}
}

/// Runs `op`, retrying retryable failures with exponential backoff and
/// full jitter. Non-retryable errors and exhausted budgets return the
/// last error unchanged.
pub async fn retry<T, E, F, Fut>(config: &RetryConfig, mut op: F) -> Result<T, E>
where
	E: RetryableError + std::fmt::Display,
	F: FnMut() -> Fut,
	Fut: Future<Output = Result<T, E>>,
{
	let mut attempt: u32 = 0;
	loop {
		match op().await {
			Ok(value) => return Ok(value),
			Err(e) => {
				if attempt >= config.max_retries || !e.is_retryable() {
					return Err(e);
				}
				let backoff = backoff_for_attempt(config, attempt);
				warn!(
					attempt = attempt + 1,
					backoff_ms = backoff.as_millis() as u64,
					error = %e,
					"retrying after transient failure"
				);
				tokio::time::sleep(backoff).await;
				attempt += 1;
			}
		}
	}
}

fn backoff_for_attempt(config: &RetryConfig, attempt: u32) -> Duration {
	let exp = config
		.initial_backoff
		.saturating_mul(2u32.saturating_pow(attempt));
	let capped = exp.min(config.max_backoff);
	// Full jitter: uniform in [0, capped].
	Duration::from_millis(fastrand::u64(0..=capped.as_millis() as u64))
}
