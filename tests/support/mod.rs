// ABOUTME: Test support utilities.
// ABOUTME: Provides the in-memory service fake and resource builders.

use machine_image::config::{Action, ImageResource};
use machine_image::types::ImageName;
use std::sync::Once;

// Each test binary only uses some of these helpers, so allow dead_code.
#[allow(dead_code)]
pub mod fake_service;

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for tests. Safe to call multiple times.
#[allow(dead_code)]
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::EnvFilter;
        let filter = EnvFilter::from_default_env()
            .add_directive("machine_image=debug".parse().unwrap());
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init()
            .ok();
    });
}

#[allow(dead_code)]
pub fn name(value: &str) -> ImageName {
    ImageName::new(value).unwrap()
}

#[allow(dead_code)]
pub fn resource(image: &str, action: Action) -> ImageResource {
    ImageResource::new(name(image), action)
}
