// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Wire-level types for Pulse telemetry batching.
//!
//! This crate holds the types that cross the wire to the collection
//! endpoint and nothing else: event records and their serialized shapes,
//! the batch envelope, the per-flush context snapshot, and the write-key
//! credential. No I/O and no async; the SDK client in the `pulse` crate
//! builds on these.

mod context;
mod envelope;
mod event;
mod write_key;

pub use context::{
	AppContext, ContextSnapshot, DeviceContext, LibraryContext, NetworkContext, OsContext,
	ScreenContext,
};
pub use envelope::BatchEnvelope;
pub use event::{
	format_timestamp, AnonymousId, EventRecord, MessageId, RecordEnvelope, RecordKind, WireRecord,
	UNIDENTIFIED_USER,
};
pub use write_key::{WriteKey, WriteKeyError};
