// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error types for the telemetry SDK.

use pulse_common_http::RetryableError;
use thiserror::Error;

/// Telemetry SDK errors.
#[derive(Debug, Error)]
pub enum TelemetryError {
	/// Write key is missing or empty.
	#[error("invalid write key: {0}")]
	InvalidWriteKey(#[from] pulse_core::WriteKeyError),

	/// Collection endpoint URL could not be parsed.
	#[error("invalid collection endpoint URL")]
	InvalidEndpoint,

	/// HTTP request failed.
	#[error("HTTP request failed: {0}")]
	RequestFailed(#[from] reqwest::Error),

	/// Server returned an error response.
	#[error("server error ({status}): {message}")]
	ServerError { status: u16, message: String },

	/// Rate limited by the server.
	#[error("rate limited, retry after {retry_after_secs:?} seconds")]
	RateLimited { retry_after_secs: Option<u64> },

	/// Client has been shut down.
	#[error("client has been shut down")]
	ClientShutdown,

	/// Envelope could not be encoded.
	#[error("serialization error: {0}")]
	SerializationError(#[from] serde_json::Error),
}

impl RetryableError for TelemetryError {
	fn is_retryable(&self) -> bool {
		match self {
			TelemetryError::RequestFailed(e) => e.is_retryable(),
			TelemetryError::ServerError { status, .. } => {
				matches!(*status, 429 | 408 | 500 | 502 | 503 | 504)
			}
			TelemetryError::RateLimited { .. } => true,
			_ => false,
		}
	}
}

/// Result type alias for telemetry operations.
pub type Result<T> = std::result::Result<T, TelemetryError>;

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn server_error_retryable_statuses() {
		for status in [429, 408, 500, 502, 503, 504] {
			let err = TelemetryError::ServerError {
				status,
				message: "test".to_string(),
			};
			assert!(err.is_retryable(), "status {status} should be retryable");
		}
	}

	#[test]
	fn server_error_non_retryable_statuses() {
		for status in [400, 401, 403, 404, 422] {
			let err = TelemetryError::ServerError {
				status,
				message: "test".to_string(),
			};
			assert!(
				!err.is_retryable(),
				"status {status} should not be retryable"
			);
		}
	}

	#[test]
	fn rate_limited_is_retryable() {
		let err = TelemetryError::RateLimited {
			retry_after_secs: Some(30),
		};
		assert!(err.is_retryable());
	}

	#[test]
	fn local_errors_not_retryable() {
		assert!(!TelemetryError::ClientShutdown.is_retryable());
		assert!(!TelemetryError::InvalidEndpoint.is_retryable());
	}
}
