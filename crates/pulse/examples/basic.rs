// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Example: batch a few telemetry events with the pulse SDK.
//!
//! Run with:
//!   cargo run --example basic -p pulse

use std::time::Duration;

use pulse::{AppInfo, Client, Properties};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	tracing_subscriber::fmt()
		.with_env_filter(
			tracing_subscriber::EnvFilter::try_from_default_env()
				.unwrap_or_else(|_| "pulse=debug".into()),
		)
		.init();

	let write_key =
		std::env::var("PULSE_WRITE_KEY").expect("PULSE_WRITE_KEY environment variable required");
	let endpoint = std::env::var("PULSE_ENDPOINT")
		.unwrap_or_else(|_| pulse::DEFAULT_ENDPOINT.to_string());

	println!("Initializing telemetry client...");
	println!("  Endpoint: {}", endpoint);

	let client = Client::builder()
		.write_key(&write_key)
		.endpoint(&endpoint)
		.flush_at(10)
		.flush_interval(Duration::from_secs(5))
		.app(AppInfo {
			name: "pulse-example".to_string(),
			version: "0.1.0".to_string(),
			namespace: "dev.pulse.example".to_string(),
			build: "1".to_string(),
		})
		.screen_size(1920, 1080)
		.build()?;

	// The host's reachability observer would normally drive this.
	client.network().set_connectivity(true, false);

	client.identify(Some("user_example_123"), None).await?;
	client.screen("Home").await?;
	client
		.track(
			"Purchased",
			Some(Properties::new().insert("sku", "A1").insert("price", 99.99)),
		)
		.await?;

	println!("Queued {} record(s), flushing...", client.queue_len().await);
	client.flush().await?;

	client.shutdown().await?;
	println!("Client shutdown complete.");

	Ok(())
}
