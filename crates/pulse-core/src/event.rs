// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Event records and their serialized wire shapes.
//!
//! Records are a tagged union over the three call types. The
//! optional-field shape the collection endpoint expects is produced only
//! at serialization time via [`WireRecord`]; everything upstream of the
//! uploader works with [`EventRecord`].

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Sentinel `userId` carried by screen/track records for users that have
/// not been identified.
pub const UNIDENTIFIED_USER: &str = "_";

/// Pseudonymous identifier for the current process lifetime.
///
/// Generated once per client and immutable thereafter. It is never
/// persisted, so a restarted process gets a fresh one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AnonymousId(pub Uuid);

impl AnonymousId {
	pub fn new() -> Self {
		Self(Uuid::new_v4())
	}
}

impl Default for AnonymousId {
	fn default() -> Self {
		Self::new()
	}
}

impl std::fmt::Display for AnonymousId {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.0)
	}
}

impl std::str::FromStr for AnonymousId {
	type Err = uuid::Error;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Ok(Self(Uuid::parse_str(s)?))
	}
}

/// Unique identifier generated per record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(pub Uuid);

impl MessageId {
	pub fn new() -> Self {
		Self(Uuid::new_v4())
	}
}

impl Default for MessageId {
	fn default() -> Self {
		Self::new()
	}
}

impl std::fmt::Display for MessageId {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.0)
	}
}

impl std::str::FromStr for MessageId {
	type Err = uuid::Error;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Ok(Self(Uuid::parse_str(s)?))
	}
}

/// The three call types accepted by the SDK.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
	Identify,
	Screen,
	Track,
}

impl RecordKind {
	pub fn as_str(&self) -> &'static str {
		match self {
			RecordKind::Identify => "identify",
			RecordKind::Screen => "screen",
			RecordKind::Track => "track",
		}
	}
}

impl std::fmt::Display for RecordKind {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.as_str())
	}
}

impl std::str::FromStr for RecordKind {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"identify" => Ok(RecordKind::Identify),
			"screen" => Ok(RecordKind::Screen),
			"track" => Ok(RecordKind::Track),
			_ => Err(format!("invalid record kind: {}", s)),
		}
	}
}

/// Per-record metadata shared by screen and track records.
///
/// `timestamp` and `sent_at` are both captured when the record is built,
/// not when the batch is uploaded.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordEnvelope {
	pub message_id: MessageId,
	pub anonymous_id: AnonymousId,
	pub timestamp: DateTime<Utc>,
	pub sent_at: DateTime<Utc>,
}

impl RecordEnvelope {
	pub fn new(anonymous_id: AnonymousId) -> Self {
		let now = Utc::now();
		Self {
			message_id: MessageId::new(),
			anonymous_id,
			timestamp: now,
			sent_at: now,
		}
	}
}

/// One queued telemetry record.
///
/// Identify records deliberately carry no [`RecordEnvelope`]: the wire
/// format omits `messageId`/`timestamp`/`sentAt`/`integrations` for them,
/// and that asymmetry is preserved for compatibility.
#[derive(Debug, Clone, PartialEq)]
pub enum EventRecord {
	Identify {
		anonymous_id: AnonymousId,
		user_id: Option<String>,
		traits: Option<Map<String, Value>>,
	},
	Screen {
		envelope: RecordEnvelope,
		name: String,
	},
	Track {
		envelope: RecordEnvelope,
		event: String,
		properties: Option<Map<String, Value>>,
	},
}

impl EventRecord {
	/// Builds an identify record, or `None` when both `user_id` and
	/// `traits` are absent; such a call produces nothing.
	pub fn identify(
		anonymous_id: AnonymousId,
		user_id: Option<String>,
		traits: Option<Map<String, Value>>,
	) -> Option<Self> {
		if user_id.is_none() && traits.is_none() {
			return None;
		}
		Some(EventRecord::Identify {
			anonymous_id,
			user_id,
			traits,
		})
	}

	/// Builds a screen record with a fresh envelope.
	pub fn screen(anonymous_id: AnonymousId, name: impl Into<String>) -> Self {
		EventRecord::Screen {
			envelope: RecordEnvelope::new(anonymous_id),
			name: name.into(),
		}
	}

	/// Builds a track record with a fresh envelope.
	pub fn track(
		anonymous_id: AnonymousId,
		event: impl Into<String>,
		properties: Option<Map<String, Value>>,
	) -> Self {
		EventRecord::Track {
			envelope: RecordEnvelope::new(anonymous_id),
			event: event.into(),
			properties,
		}
	}

	pub fn kind(&self) -> RecordKind {
		match self {
			EventRecord::Identify { .. } => RecordKind::Identify,
			EventRecord::Screen { .. } => RecordKind::Screen,
			EventRecord::Track { .. } => RecordKind::Track,
		}
	}

	/// Converts the record to its serialized wire shape.
	pub fn to_wire(&self) -> WireRecord {
		match self {
			EventRecord::Identify {
				anonymous_id,
				user_id,
				traits,
			} => WireRecord {
				kind: RecordKind::Identify,
				anonymous_id: *anonymous_id,
				user_id: user_id.clone(),
				traits: traits.clone(),
				message_id: None,
				timestamp: None,
				sent_at: None,
				integrations: None,
				name: None,
				event: None,
				properties: None,
			},
			EventRecord::Screen { envelope, name } => WireRecord {
				name: Some(name.clone()),
				..WireRecord::generic(RecordKind::Screen, envelope)
			},
			EventRecord::Track {
				envelope,
				event,
				properties,
			} => WireRecord {
				event: Some(event.clone()),
				properties: properties.clone(),
				..WireRecord::generic(RecordKind::Track, envelope)
			},
		}
	}
}

/// The optional-field record shape the collection endpoint expects.
///
/// Unset fields are absent from the payload, never `null`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireRecord {
	#[serde(rename = "userId", skip_serializing_if = "Option::is_none", default)]
	pub user_id: Option<String>,
	#[serde(rename = "messageId", skip_serializing_if = "Option::is_none", default)]
	pub message_id: Option<MessageId>,
	#[serde(rename = "anonymousId")]
	pub anonymous_id: AnonymousId,
	#[serde(rename = "type")]
	pub kind: RecordKind,
	#[serde(
		with = "ts_millis",
		skip_serializing_if = "Option::is_none",
		default
	)]
	pub timestamp: Option<DateTime<Utc>>,
	#[serde(
		rename = "sentAt",
		with = "ts_millis",
		skip_serializing_if = "Option::is_none",
		default
	)]
	pub sent_at: Option<DateTime<Utc>>,
	#[serde(skip_serializing_if = "Option::is_none", default)]
	pub integrations: Option<Vec<Value>>,
	#[serde(skip_serializing_if = "Option::is_none", default)]
	pub traits: Option<Map<String, Value>>,
	#[serde(skip_serializing_if = "Option::is_none", default)]
	pub name: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none", default)]
	pub event: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none", default)]
	pub properties: Option<Map<String, Value>>,
}

impl WireRecord {
	/// The generic envelope shared by screen/track wire records: sentinel
	/// `userId`, message id, both timestamps, empty `integrations`.
	fn generic(kind: RecordKind, envelope: &RecordEnvelope) -> Self {
		Self {
			user_id: Some(UNIDENTIFIED_USER.to_string()),
			message_id: Some(envelope.message_id),
			anonymous_id: envelope.anonymous_id,
			kind,
			timestamp: Some(envelope.timestamp),
			sent_at: Some(envelope.sent_at),
			integrations: Some(Vec::new()),
			traits: None,
			name: None,
			event: None,
			properties: None,
		}
	}
}

/// Formats a timestamp the way the wire expects it: ISO-8601 UTC with
/// millisecond precision and a `Z` suffix.
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
	ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

mod ts_millis {
	use chrono::{DateTime, SecondsFormat, Utc};
	use serde::{Deserialize, Deserializer, Serializer};

	pub fn serialize<S>(value: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		match value {
			Some(ts) => serializer.serialize_str(&ts.to_rfc3339_opts(SecondsFormat::Millis, true)),
			None => serializer.serialize_none(),
		}
	}

	pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
	where
		D: Deserializer<'de>,
	{
		let value: Option<String> = Option::deserialize(deserializer)?;
		match value {
			Some(s) => DateTime::parse_from_rfc3339(&s)
				.map(|ts| Some(ts.with_timezone(&Utc)))
				.map_err(serde::de::Error::custom),
			None => Ok(None),
		}
	}
}
