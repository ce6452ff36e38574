//! Environment variable source: CANOPY__ prefix with __ separator

use config::builder::DefaultState;
use config::ConfigBuilder;
use config::Environment;

/// Add environment variable overlay to builder.
/// `CANOPY__REQUESTS__LATENCY_MS=50` sets `requests.latency_ms`.
pub fn add_to_builder(builder: ConfigBuilder<DefaultState>) -> ConfigBuilder<DefaultState> {
    builder.add_source(
        Environment::with_prefix("CANOPY")
            .separator("__")
            .try_parsing(true),
    )
}
