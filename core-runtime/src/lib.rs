//! # Core Runtime
//!
//! Ambient substrate for the reconciliation engine:
//!
//! - [`config`]: the single validated configuration type ([`CoreConfig`])
//!   carrying every engine tunable
//! - [`events`]: typed in-process event channel ([`EventBus`]) between the
//!   engine and any presentation layer
//! - [`logging`]: `tracing-subscriber` bootstrap with format and filter
//!   selection
//! - [`error`]: runtime-level error type

pub mod config;
pub mod error;
pub mod events;
pub mod logging;

pub use config::{CoreConfig, CoreConfigBuilder};
pub use error::{Error, Result};
pub use events::{EventBus, SyncEvent, DEFAULT_EVENT_BUFFER_SIZE};
pub use logging::{init_logging, LogFormat, LogLevel, LoggingConfig};
