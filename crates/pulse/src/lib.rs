// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Rust SDK client for Pulse telemetry batching.
//!
//! Host applications call [`Client::identify`], [`Client::screen`], and
//! [`Client::track`]; records buffer in memory and a background task
//! uploads them in batches, either when the queue reaches `flush_at`
//! records or every `flush_interval`. Each upload carries one context
//! snapshot (device, app, network, locale). Delivery is at-least-once
//! and fire-and-forget: failed batches stay queued for the next trigger
//! and nothing is surfaced to the host beyond structured logs.
//!
//! ```ignore
//! use pulse::Client;
//!
//! let client = Client::builder().write_key("your_write_key").build()?;
//! client.track("Signed Up", None).await?;
//! client.shutdown().await?;
//! ```

mod batch;
mod client;
mod context;
mod error;
mod net;
mod properties;
mod upload;

pub use batch::{BatchConfig, BatchSender};
pub use client::{Client, ClientBuilder, ClientConfig, DEFAULT_ENDPOINT};
pub use context::{AppInfo, DeviceInfo, ScreenSize, DEVICE_MODEL_ENV, FALLBACK_IP};
pub use error::{Result, TelemetryError};
pub use net::NetworkStatus;
pub use properties::Properties;

pub use pulse_common_http::RetryConfig;
pub use pulse_core::{
	AnonymousId, BatchEnvelope, ContextSnapshot, EventRecord, MessageId, RecordKind, WireRecord,
	WriteKey, WriteKeyError,
};

/// SDK name for identification.
pub const SDK_NAME: &str = "pulse-rust";
/// SDK version for identification.
pub const SDK_VERSION: &str = env!("CARGO_PKG_VERSION");
