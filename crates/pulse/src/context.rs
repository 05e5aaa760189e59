// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Assembles the per-flush context snapshot.
//!
//! Everything here is inert data collection: host-supplied app/screen
//! facts, process introspection for the device block, locale and
//! timezone detection, the host-updated network flags, and a cached
//! external IP refreshed out-of-band so no flush ever blocks on a
//! lookup.

use std::time::Duration;

use pulse_core::{
	AppContext, ContextSnapshot, DeviceContext, LibraryContext, NetworkContext, OsContext,
	ScreenContext,
};
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use crate::net::NetworkStatus;
use crate::{SDK_NAME, SDK_VERSION};

/// Environment variable overriding the detected device model, for
/// emulator/CI environments that should report a realistic value.
pub const DEVICE_MODEL_ENV: &str = "PULSE_DEVICE_MODEL";

/// Placeholder reported until (and unless) the external IP resolves.
pub const FALLBACK_IP: &str = "0.0.0.0";

/// Fixed third-party service used for the external IP lookup.
pub(crate) const IP_LOOKUP_URL: &str = "https://api.ipify.org";

/// How often the cached external IP is refreshed.
pub(crate) const IP_REFRESH_INTERVAL: Duration = Duration::from_secs(300);

const UNKNOWN: &str = "-";

/// Host application identity, supplied at client construction.
#[derive(Debug, Clone)]
pub struct AppInfo {
	pub name: String,
	pub version: String,
	pub namespace: String,
	pub build: String,
}

impl Default for AppInfo {
	fn default() -> Self {
		Self {
			name: UNKNOWN.to_string(),
			version: UNKNOWN.to_string(),
			namespace: UNKNOWN.to_string(),
			build: UNKNOWN.to_string(),
		}
	}
}

/// Display dimensions, supplied by the host. Headless hosts report 0x0.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScreenSize {
	pub width: u32,
	pub height: u32,
}

/// Device identity block.
#[derive(Debug, Clone)]
pub struct DeviceInfo {
	pub id: String,
	pub manufacturer: String,
	pub model: String,
	pub name: String,
	pub kind: String,
	pub advertising_id: String,
	pub ad_tracking_enabled: bool,
}

impl DeviceInfo {
	/// Detects what the process can see on its own: the model from the
	/// `PULSE_DEVICE_MODEL` override or the CPU architecture, the name
	/// from the hostname, the kind from the OS family. The id is
	/// generated fresh per process.
	pub fn detect() -> Self {
		let model = std::env::var(DEVICE_MODEL_ENV)
			.ok()
			.filter(|model| !model.trim().is_empty())
			.unwrap_or_else(|| std::env::consts::ARCH.to_string());

		let name = hostname::get()
			.ok()
			.and_then(|name| name.into_string().ok())
			.unwrap_or_else(|| UNKNOWN.to_string());

		Self {
			id: Uuid::new_v4().to_string(),
			manufacturer: UNKNOWN.to_string(),
			model,
			name,
			kind: std::env::consts::OS.to_string(),
			advertising_id: UNKNOWN.to_string(),
			ad_tracking_enabled: false,
		}
	}
}

/// Builds context snapshots for the uploader.
pub struct ContextProvider {
	app: AppInfo,
	screen: ScreenSize,
	device: DeviceInfo,
	os_version: String,
	network: NetworkStatus,
	external_ip: RwLock<String>,
}

impl ContextProvider {
	pub fn new(
		app: AppInfo,
		screen: ScreenSize,
		device: DeviceInfo,
		os_version: String,
		network: NetworkStatus,
	) -> Self {
		Self {
			app,
			screen,
			device,
			os_version,
			network,
			external_ip: RwLock::new(FALLBACK_IP.to_string()),
		}
	}

	/// Assembles a fresh snapshot. Locale and timezone are re-detected
	/// every time; the network flags and external IP are reads of
	/// background-maintained state.
	pub async fn snapshot(&self) -> ContextSnapshot {
		ContextSnapshot {
			library: LibraryContext {
				name: SDK_NAME.to_string(),
				version: SDK_VERSION.to_string(),
			},
			app: AppContext {
				build: self.app.build.clone(),
				name: self.app.name.clone(),
				namespace: self.app.namespace.clone(),
				version: self.app.version.clone(),
			},
			screen: ScreenContext {
				height: self.screen.height,
				width: self.screen.width,
			},
			network: NetworkContext {
				carrier: self.network.carrier(),
				cellular: self.network.is_cellular(),
				wifi: self.network.is_wifi(),
			},
			os: OsContext {
				name: std::env::consts::OS.to_string(),
				version: self.os_version.clone(),
			},
			device: DeviceContext {
				ad_tracking_enabled: self.device.ad_tracking_enabled,
				advertising_id: self.device.advertising_id.clone(),
				id: self.device.id.clone(),
				manufacturer: self.device.manufacturer.clone(),
				model: self.device.model.clone(),
				kind: self.device.kind.clone(),
				name: self.device.name.clone(),
			},
			ip: self.external_ip.read().await.clone(),
			locale: detect_locale(),
			timezone: detect_timezone(),
			traits: Vec::new(),
		}
	}

	/// Refreshes the cached external IP. Any failure leaves the current
	/// value in place; the snapshot degrades to the placeholder rather
	/// than blocking or failing a flush.
	pub async fn refresh_external_ip(&self, http: &reqwest::Client) {
		let response = match http.get(IP_LOOKUP_URL).send().await {
			Ok(response) => response,
			Err(e) => {
				debug!(error = %e, "external IP lookup failed");
				return;
			}
		};

		if !response.status().is_success() {
			debug!(status = response.status().as_u16(), "external IP lookup failed");
			return;
		}

		match response.text().await {
			Ok(body) => {
				let ip = body.trim();
				if !ip.is_empty() {
					*self.external_ip.write().await = ip.to_string();
					debug!(ip, "external IP refreshed");
				}
			}
			Err(e) => debug!(error = %e, "external IP lookup failed"),
		}
	}

	#[cfg(test)]
	pub(crate) async fn set_external_ip(&self, ip: &str) {
		*self.external_ip.write().await = ip.to_string();
	}
}

/// Detects the `lang-region` locale string. Missing parts are left
/// empty, an undetectable locale degrades to `-`.
fn detect_locale() -> String {
	match sys_locale::get_locale() {
		Some(locale) => {
			let mut parts = locale.split(['_', '-', '.']);
			let lang = parts.next().unwrap_or_default();
			let region = parts.next().unwrap_or_default();
			format!("{}-{}", lang, region)
		}
		None => UNKNOWN.to_string(),
	}
}

/// Detects the IANA timezone identifier, `-` when unavailable.
fn detect_timezone() -> String {
	iana_time_zone::get_timezone().unwrap_or_else(|_| UNKNOWN.to_string())
}
