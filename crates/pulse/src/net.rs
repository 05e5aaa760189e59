// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Shared network reachability state.
//!
//! The SDK does not classify connectivity itself; the host application's
//! reachability observer writes into this handle and every flush reads
//! from it. Both flags default to false and the carrier to `"-"` until
//! the host reports otherwise.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

const UNKNOWN_CARRIER: &str = "-";

struct NetworkStatusInner {
	wifi: AtomicBool,
	cellular: AtomicBool,
	carrier: RwLock<String>,
}

/// Cheaply cloneable handle over the wifi/cellular flags and carrier
/// name. One writer (the host's observer callback), many readers (every
/// flush snapshot).
#[derive(Clone)]
pub struct NetworkStatus {
	inner: Arc<NetworkStatusInner>,
}

impl NetworkStatus {
	pub fn new() -> Self {
		Self {
			inner: Arc::new(NetworkStatusInner {
				wifi: AtomicBool::new(false),
				cellular: AtomicBool::new(false),
				carrier: RwLock::new(UNKNOWN_CARRIER.to_string()),
			}),
		}
	}

	/// Updates both reachability flags in one call.
	pub fn set_connectivity(&self, wifi: bool, cellular: bool) {
		self.inner.wifi.store(wifi, Ordering::SeqCst);
		self.inner.cellular.store(cellular, Ordering::SeqCst);
	}

	pub fn set_carrier(&self, name: impl Into<String>) {
		if let Ok(mut carrier) = self.inner.carrier.write() {
			*carrier = name.into();
		}
	}

	pub fn is_wifi(&self) -> bool {
		self.inner.wifi.load(Ordering::SeqCst)
	}

	pub fn is_cellular(&self) -> bool {
		self.inner.cellular.load(Ordering::SeqCst)
	}

	pub fn carrier(&self) -> String {
		self.inner
			.carrier
			.read()
			.map(|carrier| carrier.clone())
			.unwrap_or_else(|_| UNKNOWN_CARRIER.to_string())
	}
}

impl Default for NetworkStatus {
	fn default() -> Self {
		Self::new()
	}
}

impl std::fmt::Debug for NetworkStatus {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("NetworkStatus")
			.field("wifi", &self.is_wifi())
			.field("cellular", &self.is_cellular())
			.field("carrier", &self.carrier())
			.finish()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn defaults_are_offline_and_unknown() {
		let status = NetworkStatus::new();
		assert!(!status.is_wifi());
		assert!(!status.is_cellular());
		assert_eq!(status.carrier(), "-");
	}

	#[test]
	fn connectivity_updates_are_visible_to_clones() {
		let status = NetworkStatus::new();
		let reader = status.clone();

		status.set_connectivity(true, false);
		assert!(reader.is_wifi());
		assert!(!reader.is_cellular());

		status.set_connectivity(false, true);
		assert!(!reader.is_wifi());
		assert!(reader.is_cellular());
	}

	#[test]
	fn carrier_updates() {
		let status = NetworkStatus::new();
		status.set_carrier("ExampleTel");
		assert_eq!(status.carrier(), "ExampleTel");
	}
}
