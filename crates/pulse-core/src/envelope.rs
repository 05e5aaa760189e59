// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The batch envelope: one upload payload.

use serde::{Deserialize, Serialize};

use crate::context::ContextSnapshot;
use crate::event::{EventRecord, WireRecord};

/// One upload payload: the queued records in insertion order plus one
/// context snapshot for the whole batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchEnvelope {
	pub batch: Vec<WireRecord>,
	pub context: ContextSnapshot,
}

impl BatchEnvelope {
	/// Builds the envelope from a queue snapshot, preserving record order.
	pub fn new(records: &[EventRecord], context: ContextSnapshot) -> Self {
		Self {
			batch: records.iter().map(EventRecord::to_wire).collect(),
			context,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::context::{
		AppContext, DeviceContext, LibraryContext, NetworkContext, OsContext, ScreenContext,
	};
	use crate::event::AnonymousId;

	fn context() -> ContextSnapshot {
		ContextSnapshot {
			library: LibraryContext {
				name: "pulse-rust".to_string(),
				version: "0.1.0".to_string(),
			},
			app: AppContext {
				build: "-".to_string(),
				name: "-".to_string(),
				namespace: "-".to_string(),
				version: "-".to_string(),
			},
			screen: ScreenContext::default(),
			network: NetworkContext {
				carrier: "-".to_string(),
				cellular: false,
				wifi: false,
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
				name: "host".to_string(),
			},
			ip: "0.0.0.0".to_string(),
			locale: "en-US".to_string(),
			timezone: "UTC".to_string(),
			traits: Vec::new(),
		}
	}

	#[test]
	fn envelope_preserves_length_and_order() {
		let anon = AnonymousId::new();
		let records = vec![
			EventRecord::screen(anon, "Home"),
			EventRecord::track(anon, "Purchased", None),
			EventRecord::screen(anon, "Cart"),
		];

		let envelope = BatchEnvelope::new(&records, context());
		let json = serde_json::to_string(&envelope).unwrap();
		let decoded: BatchEnvelope = serde_json::from_str(&json).unwrap();

		assert_eq!(decoded.batch.len(), records.len());
		assert_eq!(decoded.batch[0].name.as_deref(), Some("Home"));
		assert_eq!(decoded.batch[1].event.as_deref(), Some("Purchased"));
		assert_eq!(decoded.batch[2].name.as_deref(), Some("Cart"));
	}

	#[test]
	fn envelope_has_batch_and_context_keys() {
		let envelope = BatchEnvelope::new(&[], context());
		let json = serde_json::to_value(&envelope).unwrap();
		let obj = json.as_object().unwrap();

		assert!(obj.contains_key("batch"));
		assert!(obj.contains_key("context"));
		assert_eq!(obj.len(), 2);
	}
}
