// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The write-key credential used against the collection endpoint.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use thiserror::Error;

/// Errors from write-key construction.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum WriteKeyError {
	#[error("write key must not be empty")]
	Empty,
}

/// Opaque write credential for the collection endpoint.
///
/// The key is sent as HTTP Basic auth with the token alone as the
/// credential, with no trailing colon before encoding.
#[derive(Clone, PartialEq, Eq)]
pub struct WriteKey(String);

impl WriteKey {
	pub fn new(key: impl Into<String>) -> Result<Self, WriteKeyError> {
		let key = key.into();
		if key.trim().is_empty() {
			return Err(WriteKeyError::Empty);
		}
		Ok(Self(key))
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}

	/// Returns the `Authorization` header value for this key.
	pub fn authorization(&self) -> String {
		format!("Basic {}", STANDARD.encode(self.0.as_bytes()))
	}
}

// The key is a credential; keep it out of logs.
impl std::fmt::Debug for WriteKey {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str("WriteKey(***)")
	}
}

impl std::str::FromStr for WriteKey {
	type Err = WriteKeyError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::new(s)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;

	#[test]
	fn empty_key_is_rejected() {
		assert_eq!(WriteKey::new(""), Err(WriteKeyError::Empty));
		assert_eq!(WriteKey::new("   "), Err(WriteKeyError::Empty));
	}

	#[test]
	fn authorization_encodes_token_without_colon() {
		let key = WriteKey::new("abc123").unwrap();
		// base64("abc123"), not base64("abc123:")
		assert_eq!(key.authorization(), "Basic YWJjMTIz");
	}

	#[test]
	fn debug_redacts_key() {
		let key = WriteKey::new("super-secret").unwrap();
		let debug = format!("{:?}", key);
		assert!(!debug.contains("super-secret"));
	}

	proptest! {
		#[test]
		fn nonempty_keys_parse(key in "[a-zA-Z0-9]{1,64}") {
			let parsed: WriteKey = key.parse().unwrap();
			prop_assert_eq!(parsed.as_str(), key.as_str());
		}

		#[test]
		fn authorization_is_basic_prefixed(key in "[a-zA-Z0-9]{1,64}") {
			let parsed = WriteKey::new(key).unwrap();
			prop_assert!(parsed.authorization().starts_with("Basic "));
		}
	}
}
