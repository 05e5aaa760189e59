// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Batch upload to the collection endpoint.

use std::sync::Arc;

use pulse_common_http::RetryConfig;
use pulse_core::{BatchEnvelope, EventRecord, WriteKey};
use reqwest::{Client, StatusCode, Url};
use tracing::{debug, error};

use crate::batch::BatchSender;
use crate::context::ContextProvider;
use crate::error::{Result, TelemetryError};

/// Sends batches as one JSON POST per flush: the queued records plus a
/// fresh context snapshot, Basic-authenticated with the write key.
pub(crate) struct HttpUploader {
	http: Client,
	endpoint: Url,
	write_key: WriteKey,
	retry_config: RetryConfig,
	context: Arc<ContextProvider>,
}

impl HttpUploader {
	pub(crate) fn new(
		http: Client,
		endpoint: Url,
		write_key: WriteKey,
		retry_config: RetryConfig,
		context: Arc<ContextProvider>,
	) -> Self {
		Self {
			http,
			endpoint,
			write_key,
			retry_config,
			context,
		}
	}
}

#[async_trait::async_trait]
impl BatchSender for HttpUploader {
	async fn send_batch(&self, records: Vec<EventRecord>) -> Result<()> {
		let context = self.context.snapshot().await;
		let envelope = BatchEnvelope::new(&records, context);
		// A record that cannot be encoded aborts this flush; the queue
		// stays intact and the next trigger retries.
		let body = serde_json::to_vec(&envelope)?;

		let response = pulse_common_http::retry(&self.retry_config, || async {
			self.http
				.post(self.endpoint.clone())
				.header("Accept-Encoding", "gzip")
				.header("Content-Type", "application/json")
				.header("Authorization", self.write_key.authorization())
				.body(body.clone())
				.send()
				.await
		})
		.await
		.map_err(TelemetryError::RequestFailed)?;

		if response.status() == StatusCode::TOO_MANY_REQUESTS {
			let retry_after = response
				.headers()
				.get("Retry-After")
				.and_then(|v| v.to_str().ok())
				.and_then(|s| s.parse().ok());
			return Err(TelemetryError::RateLimited {
				retry_after_secs: retry_after,
			});
		}

		if !response.status().is_success() {
			let status = response.status().as_u16();
			let message = response.text().await.unwrap_or_default();
			error!(status, message = %message, "collection endpoint rejected batch");
			return Err(TelemetryError::ServerError { status, message });
		}

		debug!(count = records.len(), bytes = body.len(), "batch uploaded");
		Ok(())
	}
}
