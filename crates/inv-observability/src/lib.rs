//! # inv-observability
//!
//! Logging and metrics setup shared by the inventory binaries.

pub mod logging;
pub mod metrics;

pub use logging::{init_logging, init_logging_with_config, LoggingConfig};
pub use self::metrics::register_metrics;
