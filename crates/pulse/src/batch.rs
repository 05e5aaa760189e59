// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Event queue and flush triggers.
//!
//! The processor owns the in-memory queue and the two flush triggers:
//! the record-count threshold checked on every enqueue and the repeating
//! interval driven by [`BatchProcessor::run`]. Both funnel into the same
//! flush operation, which is serialized by an in-flight guard so
//! overlapping triggers never produce duplicate deliveries.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use pulse_core::EventRecord;
use tokio::sync::{Mutex, Notify};
use tracing::{debug, error, info};

use crate::error::{Result, TelemetryError};

/// Configuration for the event queue and its flush triggers.
#[derive(Debug, Clone)]
pub struct BatchConfig {
	/// Queue length at which a flush is triggered immediately.
	pub flush_at: usize,
	/// Interval between time-driven flushes.
	pub flush_interval: Duration,
}

impl Default for BatchConfig {
	fn default() -> Self {
		Self {
			flush_at: 20,
			flush_interval: Duration::from_secs(5),
		}
	}
}

/// Handler for delivering a batch of records upstream.
#[async_trait::async_trait]
pub trait BatchSender: Send + Sync {
	/// Delivers one batch. An `Err` means the records were not accepted
	/// and must stay queued.
	async fn send_batch(&self, records: Vec<EventRecord>) -> Result<()>;
}

/// The queue and trigger controller.
///
/// Queue lifecycle: created empty, appended to by every enqueue, drained
/// only up to the flushed snapshot on confirmed delivery, untouched on
/// failure.
pub struct BatchProcessor {
	config: BatchConfig,
	sender: Arc<dyn BatchSender>,
	queue: Mutex<Vec<EventRecord>>,
	in_flight: AtomicBool,
	shutdown: AtomicBool,
	flush_notify: Notify,
}

impl BatchProcessor {
	pub fn new(config: BatchConfig, sender: Arc<dyn BatchSender>) -> Self {
		Self {
			config,
			sender,
			queue: Mutex::new(Vec::new()),
			in_flight: AtomicBool::new(false),
			shutdown: AtomicBool::new(false),
			flush_notify: Notify::new(),
		}
	}

	/// Appends a record to the queue tail. Crossing the `flush_at`
	/// threshold wakes the background flusher; the enqueue itself never
	/// performs network I/O on the caller's path.
	pub async fn enqueue(&self, record: EventRecord) -> Result<()> {
		if self.shutdown.load(Ordering::SeqCst) {
			return Err(TelemetryError::ClientShutdown);
		}

		let len = {
			let mut queue = self.queue.lock().await;
			queue.push(record);
			queue.len()
		};

		if len >= self.config.flush_at {
			debug!(queued = len, flush_at = self.config.flush_at, "queue threshold reached");
			self.flush_notify.notify_one();
		}

		Ok(())
	}

	/// Flushes a snapshot of the queue. Idempotent: an empty queue and a
	/// flush already in progress are both no-ops.
	pub async fn flush(&self) -> Result<()> {
		// Overlapping triggers (timer vs. threshold) must not re-send the
		// same records while an upload is in flight.
		if self
			.in_flight
			.compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
			.is_err()
		{
			debug!("flush already in progress, skipping");
			return Ok(());
		}

		let result = self.flush_snapshot().await;
		self.in_flight.store(false, Ordering::SeqCst);
		result
	}

	async fn flush_snapshot(&self) -> Result<()> {
		let snapshot = {
			let queue = self.queue.lock().await;
			queue.clone()
		};

		if snapshot.is_empty() {
			return Ok(());
		}

		let count = snapshot.len();
		debug!(count, "flushing event batch");
		self.sender.send_batch(snapshot).await?;

		// Drain exactly the uploaded prefix; records appended while the
		// upload was in flight stay queued for the next trigger.
		let mut queue = self.queue.lock().await;
		queue.drain(..count);
		Ok(())
	}

	/// Returns the number of records currently queued.
	pub async fn queue_len(&self) -> usize {
		self.queue.lock().await.len()
	}

	/// Signals the processor to shut down. The run loop performs one
	/// final flush before exiting.
	pub fn shutdown(&self) {
		self.shutdown.store(true, Ordering::SeqCst);
		self.flush_notify.notify_one();
	}

	pub fn is_shutdown(&self) -> bool {
		self.shutdown.load(Ordering::SeqCst)
	}

	/// Runs the background flush loop until shutdown.
	pub async fn run(&self) {
		info!(
			flush_interval_secs = self.config.flush_interval.as_secs(),
			flush_at = self.config.flush_at,
			"starting telemetry batch processor"
		);

		loop {
			tokio::select! {
				_ = tokio::time::sleep(self.config.flush_interval) => {
					if self.shutdown.load(Ordering::SeqCst) {
						break;
					}

					if let Err(e) = self.flush().await {
						error!(error = %e, "failed to flush telemetry batch");
					}
				}
				_ = self.flush_notify.notified() => {
					if self.shutdown.load(Ordering::SeqCst) {
						// Final flush before shutdown.
						if let Err(e) = self.flush().await {
							error!(error = %e, "failed to flush telemetry batch on shutdown");
						}
						break;
					}

					if let Err(e) = self.flush().await {
						error!(error = %e, "failed to flush telemetry batch");
					}
				}
			}
		}

		info!("telemetry batch processor stopped");
	}
}
