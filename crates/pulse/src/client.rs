// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Public SDK surface.
//!
//! One [`Client`] instance owns the queue, the background flusher, and
//! the context provider. The caller constructs it at app start and
//! releases it with [`Client::shutdown`]; there is no shared global
//! state.

use std::sync::Arc;
use std::time::Duration;

use pulse_common_http::RetryConfig;
use pulse_core::{AnonymousId, EventRecord, WriteKey};
use reqwest::Url;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::batch::{BatchConfig, BatchProcessor, BatchSender};
use crate::context::{AppInfo, ContextProvider, DeviceInfo, ScreenSize, IP_REFRESH_INTERVAL};
use crate::error::{Result, TelemetryError};
use crate::net::NetworkStatus;
use crate::properties::Properties;
use crate::upload::HttpUploader;
use crate::{SDK_NAME, SDK_VERSION};

/// Default collection endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://api.pulse-analytics.dev/v1/import";

/// Configuration for the client's HTTP behavior.
#[derive(Debug, Clone)]
pub struct ClientConfig {
	/// Timeout for upload requests.
	pub request_timeout: Duration,
	/// Retry configuration for upload requests.
	pub retry_config: RetryConfig,
}

impl Default for ClientConfig {
	fn default() -> Self {
		Self {
			request_timeout: Duration::from_secs(30),
			retry_config: RetryConfig::default(),
		}
	}
}

/// Builder for constructing a [`Client`].
pub struct ClientBuilder {
	write_key: Option<String>,
	endpoint: Option<String>,
	batch_config: BatchConfig,
	config: ClientConfig,
	app: AppInfo,
	screen: ScreenSize,
	device: Option<DeviceInfo>,
	os_version: Option<String>,
	resolve_external_ip: bool,
}

impl ClientBuilder {
	pub fn new() -> Self {
		Self {
			write_key: None,
			endpoint: None,
			batch_config: BatchConfig::default(),
			config: ClientConfig::default(),
			app: AppInfo::default(),
			screen: ScreenSize::default(),
			device: None,
			os_version: None,
			resolve_external_ip: true,
		}
	}

	/// Sets the write credential. Required.
	pub fn write_key(mut self, key: impl Into<String>) -> Self {
		self.write_key = Some(key.into());
		self
	}

	/// Overrides the collection endpoint URL.
	pub fn endpoint(mut self, url: impl Into<String>) -> Self {
		self.endpoint = Some(url.into());
		self
	}

	/// Sets the queue length at which a flush triggers immediately.
	pub fn flush_at(mut self, count: usize) -> Self {
		self.batch_config.flush_at = count.max(1);
		self
	}

	/// Sets the interval between time-driven flushes.
	pub fn flush_interval(mut self, interval: Duration) -> Self {
		self.batch_config.flush_interval = interval;
		self
	}

	/// Sets the HTTP request timeout.
	pub fn request_timeout(mut self, timeout: Duration) -> Self {
		self.config.request_timeout = timeout;
		self
	}

	/// Sets the retry configuration.
	pub fn retry_config(mut self, config: RetryConfig) -> Self {
		self.config.retry_config = config;
		self
	}

	/// Sets the host application identity reported in the context.
	pub fn app(mut self, app: AppInfo) -> Self {
		self.app = app;
		self
	}

	/// Sets the display dimensions reported in the context.
	pub fn screen_size(mut self, width: u32, height: u32) -> Self {
		self.screen = ScreenSize { width, height };
		self
	}

	/// Overrides the detected device identity.
	pub fn device(mut self, device: DeviceInfo) -> Self {
		self.device = Some(device);
		self
	}

	/// Sets the OS version reported in the context.
	pub fn os_version(mut self, version: impl Into<String>) -> Self {
		self.os_version = Some(version.into());
		self
	}

	/// Enables or disables the background external-IP lookup. When
	/// disabled the context reports the placeholder address.
	pub fn resolve_external_ip(mut self, enabled: bool) -> Self {
		self.resolve_external_ip = enabled;
		self
	}

	/// Builds the client and starts its background flusher.
	///
	/// Must be called within a Tokio runtime. Configuration is fixed
	/// from this point on.
	pub fn build(self) -> Result<Client> {
		let write_key = WriteKey::new(self.write_key.unwrap_or_default())?;
		let endpoint = Url::parse(self.endpoint.as_deref().unwrap_or(DEFAULT_ENDPOINT))
			.map_err(|_| TelemetryError::InvalidEndpoint)?;

		let http = pulse_common_http::builder()
			.timeout(self.config.request_timeout)
			.build()
			.map_err(TelemetryError::RequestFailed)?;

		let anonymous_id = AnonymousId::new();
		let network = NetworkStatus::new();
		let provider = Arc::new(ContextProvider::new(
			self.app,
			self.screen,
			self.device.unwrap_or_else(DeviceInfo::detect),
			self.os_version.unwrap_or_else(|| "-".to_string()),
			network.clone(),
		));

		let uploader: Arc<dyn BatchSender> = Arc::new(HttpUploader::new(
			http.clone(),
			endpoint.clone(),
			write_key,
			self.config.retry_config.clone(),
			provider.clone(),
		));
		let processor = Arc::new(BatchProcessor::new(self.batch_config.clone(), uploader));

		let run_task = {
			let processor = processor.clone();
			tokio::spawn(async move { processor.run().await })
		};

		let ip_task = self.resolve_external_ip.then(|| {
			let provider = provider.clone();
			tokio::spawn(async move {
				loop {
					provider.refresh_external_ip(&http).await;
					tokio::time::sleep(IP_REFRESH_INTERVAL).await;
				}
			})
		});

		info!(
			endpoint = %endpoint,
			flush_at = self.batch_config.flush_at,
			flush_interval_secs = self.batch_config.flush_interval.as_secs(),
			sdk_name = SDK_NAME,
			sdk_version = SDK_VERSION,
			"telemetry client initialized"
		);

		Ok(Client {
			inner: Arc::new(ClientInner {
				anonymous_id,
				processor,
				network,
				run_task: Mutex::new(Some(run_task)),
				ip_task: Mutex::new(ip_task),
			}),
		})
	}
}

impl Default for ClientBuilder {
	fn default() -> Self {
		Self::new()
	}
}

struct ClientInner {
	anonymous_id: AnonymousId,
	processor: Arc<BatchProcessor>,
	network: NetworkStatus,
	run_task: Mutex<Option<JoinHandle<()>>>,
	ip_task: Mutex<Option<JoinHandle<()>>>,
}

/// Telemetry client.
///
/// # Example
///
/// ```ignore
/// use pulse::{Client, Properties};
///
/// let client = Client::builder()
///     .write_key("your_write_key")
///     .build()?;
///
/// client.identify(Some("user_123"), None).await?;
/// client.screen("Home").await?;
/// client
///     .track("Purchased", Some(Properties::new().insert("sku", "A1")))
///     .await?;
///
/// client.shutdown().await?;
/// ```
#[derive(Clone)]
pub struct Client {
	inner: Arc<ClientInner>,
}

impl Client {
	/// Creates a new builder for constructing a Client.
	pub fn builder() -> ClientBuilder {
		ClientBuilder::new()
	}

	/// Links the anonymous id to a user id and/or traits.
	///
	/// A call with neither produces nothing: no record is queued and no
	/// error is surfaced.
	pub async fn identify(&self, user_id: Option<&str>, traits: Option<Properties>) -> Result<()> {
		let record = EventRecord::identify(
			self.inner.anonymous_id,
			user_id.map(str::to_string),
			traits.map(Properties::into_map),
		);

		match record {
			Some(record) => self.inner.processor.enqueue(record).await,
			None => {
				debug!("identify dropped: neither user id nor traits supplied");
				Ok(())
			}
		}
	}

	/// Records a screen view.
	pub async fn screen(&self, name: impl Into<String>) -> Result<()> {
		let record = EventRecord::screen(self.inner.anonymous_id, name);
		self.inner.processor.enqueue(record).await
	}

	/// Records a named event with optional properties.
	pub async fn track(
		&self,
		event: impl Into<String>,
		properties: Option<Properties>,
	) -> Result<()> {
		let record = EventRecord::track(
			self.inner.anonymous_id,
			event,
			properties.map(Properties::into_map),
		);
		self.inner.processor.enqueue(record).await
	}

	/// Forces an immediate flush of the queue.
	pub async fn flush(&self) -> Result<()> {
		self.inner.processor.flush().await
	}

	/// Shuts the client down: one final flush, then the background tasks
	/// stop. Idempotent.
	pub async fn shutdown(&self) -> Result<()> {
		if self.inner.processor.is_shutdown() {
			return Ok(());
		}

		self.inner.processor.shutdown();

		if let Some(handle) = self.inner.run_task.lock().await.take() {
			if let Err(e) = handle.await {
				warn!(error = %e, "flush task ended abnormally during shutdown");
			}
		}
		if let Some(handle) = self.inner.ip_task.lock().await.take() {
			handle.abort();
		}

		info!("telemetry client shutdown");
		Ok(())
	}

	/// The reachability handle the host's network observer writes into.
	pub fn network(&self) -> NetworkStatus {
		self.inner.network.clone()
	}

	/// The pseudonymous identifier carried by every record from this
	/// client.
	pub fn anonymous_id(&self) -> AnonymousId {
		self.inner.anonymous_id
	}

	/// The number of records currently queued.
	pub async fn queue_len(&self) -> usize {
		self.inner.processor.queue_len().await
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::time::Duration;
	use wiremock::matchers::method;
	use wiremock::{Mock, MockServer, ResponseTemplate};

	fn test_builder(endpoint: &str) -> ClientBuilder {
		Client::builder()
			.write_key("test-key")
			.endpoint(endpoint)
			.flush_interval(Duration::from_secs(60))
			.resolve_external_ip(false)
	}

	async fn wait_for_requests(server: &MockServer, count: usize) -> Vec<wiremock::Request> {
		for _ in 0..200 {
			let requests = server.received_requests().await.unwrap();
			if requests.len() >= count {
				return requests;
			}
			tokio::time::sleep(Duration::from_millis(10)).await;
		}
		panic!("collection endpoint never received {count} request(s)");
	}

	#[tokio::test]
	async fn build_requires_write_key() {
		let result = Client::builder().build();
		assert!(matches!(result, Err(TelemetryError::InvalidWriteKey(_))));
	}

	#[tokio::test]
	async fn build_rejects_bad_endpoint() {
		let result = Client::builder()
			.write_key("test-key")
			.endpoint("not a url")
			.build();
		assert!(matches!(result, Err(TelemetryError::InvalidEndpoint)));
	}

	#[tokio::test]
	async fn identify_without_user_or_traits_queues_nothing() {
		let server = MockServer::start().await;
		let client = test_builder(&server.uri()).build().unwrap();

		client.identify(None, None).await.unwrap();

		assert_eq!(client.queue_len().await, 0);
		client.shutdown().await.unwrap();
	}

	#[tokio::test]
	async fn calls_queue_records_below_threshold() {
		let server = MockServer::start().await;
		let client = test_builder(&server.uri()).build().unwrap();

		client.identify(Some("u1"), None).await.unwrap();
		client.screen("Home").await.unwrap();
		client
			.track("Purchased", Some(Properties::new().insert("sku", "A1")))
			.await
			.unwrap();

		assert_eq!(client.queue_len().await, 3);
		// Below flush_at and before the interval: nothing uploaded yet.
		assert!(server.received_requests().await.unwrap().is_empty());
	}

	#[tokio::test]
	async fn threshold_crossing_uploads_batch() {
		let server = MockServer::start().await;
		Mock::given(method("POST"))
			.respond_with(ResponseTemplate::new(200))
			.mount(&server)
			.await;

		let client = test_builder(&server.uri()).flush_at(2).build().unwrap();

		client.screen("Home").await.unwrap();
		client.track("Purchased", None).await.unwrap();

		let requests = wait_for_requests(&server, 1).await;
		let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
		assert_eq!(body["batch"].as_array().unwrap().len(), 2);
		assert_eq!(client.queue_len().await, 0);

		client.shutdown().await.unwrap();
	}

	#[tokio::test]
	async fn manual_flush_uploads_and_clears() {
		let server = MockServer::start().await;
		Mock::given(method("POST"))
			.respond_with(ResponseTemplate::new(200))
			.mount(&server)
			.await;

		let client = test_builder(&server.uri()).build().unwrap();
		client.screen("Settings").await.unwrap();
		client.flush().await.unwrap();

		assert_eq!(client.queue_len().await, 0);
		assert_eq!(server.received_requests().await.unwrap().len(), 1);

		client.shutdown().await.unwrap();
	}

	#[tokio::test]
	async fn failed_upload_keeps_queue() {
		let server = MockServer::start().await;
		Mock::given(method("POST"))
			.respond_with(ResponseTemplate::new(500))
			.mount(&server)
			.await;

		let client = test_builder(&server.uri()).build().unwrap();
		client.screen("Home").await.unwrap();

		let result = client.flush().await;
		assert!(matches!(result, Err(TelemetryError::ServerError { .. })));
		assert_eq!(client.queue_len().await, 1);

		client.shutdown().await.unwrap();
	}

	#[tokio::test]
	async fn records_share_one_anonymous_id() {
		let server = MockServer::start().await;
		Mock::given(method("POST"))
			.respond_with(ResponseTemplate::new(200))
			.mount(&server)
			.await;

		let client = test_builder(&server.uri()).build().unwrap();
		let expected = client.anonymous_id().to_string();

		client.identify(Some("u1"), None).await.unwrap();
		client.screen("Home").await.unwrap();
		client.flush().await.unwrap();

		let requests = server.received_requests().await.unwrap();
		let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
		for record in body["batch"].as_array().unwrap() {
			assert_eq!(record["anonymousId"], expected.as_str());
		}

		client.shutdown().await.unwrap();
	}

	#[tokio::test]
	async fn shutdown_flushes_remainder_and_rejects_new_calls() {
		let server = MockServer::start().await;
		Mock::given(method("POST"))
			.respond_with(ResponseTemplate::new(200))
			.mount(&server)
			.await;

		let client = test_builder(&server.uri()).build().unwrap();
		client.track("Last Event", None).await.unwrap();

		client.shutdown().await.unwrap();

		assert_eq!(server.received_requests().await.unwrap().len(), 1);
		let result = client.track("Too Late", None).await;
		assert!(matches!(result, Err(TelemetryError::ClientShutdown)));

		// Idempotent.
		client.shutdown().await.unwrap();
	}
}
