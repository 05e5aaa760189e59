// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Helper for building event properties and identify traits.

use serde_json::{Map, Value};

/// A builder for the key/value payload attached to track calls
/// (`properties`) and identify calls (`traits`).
///
/// # Example
///
/// ```
/// use pulse::Properties;
///
/// let props = Properties::new()
///     .insert("sku", "A1")
///     .insert("price", 99.99)
///     .insert("gift", false);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Properties {
	inner: Map<String, Value>,
}

impl Properties {
	pub fn new() -> Self {
		Self { inner: Map::new() }
	}

	/// Inserts a key-value pair. Values can be anything that converts to
	/// a `serde_json::Value`: strings, numbers, booleans, arrays, nested
	/// objects.
	pub fn insert<K, V>(mut self, key: K, value: V) -> Self
	where
		K: Into<String>,
		V: Into<Value>,
	{
		self.inner.insert(key.into(), value.into());
		self
	}

	pub fn is_empty(&self) -> bool {
		self.inner.is_empty()
	}

	pub fn len(&self) -> usize {
		self.inner.len()
	}

	pub fn get(&self, key: &str) -> Option<&Value> {
		self.inner.get(key)
	}

	/// Consumes the builder, returning the underlying map in the shape
	/// event records carry.
	pub fn into_map(self) -> Map<String, Value> {
		self.inner
	}
}

impl From<Map<String, Value>> for Properties {
	fn from(map: Map<String, Value>) -> Self {
		Self { inner: map }
	}
}

impl From<Properties> for Map<String, Value> {
	fn from(props: Properties) -> Self {
		props.into_map()
	}
}
