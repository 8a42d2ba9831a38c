//! Encrypted bloom-filter aggregation service core.
//!
//! Sensors record the devices they see in a [bloom] filter and report
//! per-epoch filters encrypted under each consumer's
//! public key ([gateway]); the [store] keeps them per consumer; a consumer
//! query multiplies the selected epochs slot-wise and sums the slots
//! ([engine]), so the consumer decrypts a single count without the service
//! ever seeing a filter in the clear ([orchestrator]). Requests are executed
//! on a bounded worker pool ([dispatcher]).

pub mod bloom;
pub mod config;
pub mod dispatcher;
pub mod engine;
pub mod error;
pub mod estimate;
pub mod gateway;
pub mod orchestrator;
pub mod store;
pub mod telemetry;
pub mod wire;

pub use error::{ErrorPayload, Result, ServiceError};
