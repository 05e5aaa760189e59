// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The per-flush context snapshot attached to every upload.
//!
//! A snapshot is ephemeral: it is assembled fresh for each flush and
//! attached once per upload, never per record.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Identity of the SDK itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LibraryContext {
	pub name: String,
	pub version: String,
}

/// Identity of the host application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppContext {
	pub build: String,
	pub name: String,
	pub namespace: String,
	pub version: String,
}

/// Display dimensions reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ScreenContext {
	pub height: u32,
	pub width: u32,
}

/// Reachability classification at snapshot time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkContext {
	pub carrier: String,
	pub cellular: bool,
	pub wifi: bool,
}

/// Operating system identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OsContext {
	pub name: String,
	pub version: String,
}

/// Device identity and advertising flags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceContext {
	#[serde(rename = "adTrackingEnabled")]
	pub ad_tracking_enabled: bool,
	#[serde(rename = "advertisingId")]
	pub advertising_id: String,
	pub id: String,
	pub manufacturer: String,
	pub model: String,
	#[serde(rename = "type")]
	pub kind: String,
	pub name: String,
}

/// Device/app/network/locale facts captured once per flush.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextSnapshot {
	pub library: LibraryContext,
	pub app: AppContext,
	pub screen: ScreenContext,
	pub network: NetworkContext,
	pub os: OsContext,
	pub device: DeviceContext,
	pub ip: String,
	pub locale: String,
	pub timezone: String,
	#[serde(default)]
	pub traits: Vec<Value>,
}

#[cfg(test)]
mod tests {
	use super::*;

	fn snapshot() -> ContextSnapshot {
		ContextSnapshot {
			library: LibraryContext {
				name: "pulse-rust".to_string(),
				version: "0.1.0".to_string(),
			},
			app: AppContext {
				build: "42".to_string(),
				name: "Demo".to_string(),
				namespace: "dev.pulse.demo".to_string(),
				version: "1.2.3".to_string(),
			},
			screen: ScreenContext {
				height: 1080,
				width: 1920,
			},
			network: NetworkContext {
				carrier: "-".to_string(),
				cellular: false,
				wifi: true,
			},
			os: OsContext {
				name: "linux".to_string(),
				version: "-".to_string(),
			},
			device: DeviceContext {
				ad_tracking_enabled: false,
				advertising_id: "-".to_string(),
				id: "d1".to_string(),
				manufacturer: "-".to_string(),
				model: "x86_64".to_string(),
				kind: "linux".to_string(),
				name: "workstation".to_string(),
			},
			ip: "0.0.0.0".to_string(),
			locale: "en-US".to_string(),
			timezone: "Europe/Berlin".to_string(),
			traits: Vec::new(),
		}
	}

	#[test]
	fn snapshot_serializes_wire_field_names() {
		let json = serde_json::to_value(snapshot()).unwrap();

		assert_eq!(json["library"]["name"], "pulse-rust");
		assert_eq!(json["device"]["adTrackingEnabled"], false);
		assert_eq!(json["device"]["advertisingId"], "-");
		assert_eq!(json["device"]["type"], "linux");
		assert_eq!(json["network"]["wifi"], true);
		assert_eq!(json["traits"], serde_json::json!([]));
	}

	#[test]
	fn snapshot_roundtrip() {
		let original = snapshot();
		let json = serde_json::to_string(&original).unwrap();
		let parsed: ContextSnapshot = serde_json::from_str(&json).unwrap();
		assert_eq!(parsed, original);
	}
}
