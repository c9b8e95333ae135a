//! Production-friendly observability hooks for provider streams and agent turns.
//!
//! ```rust
//! use vobserve::{MetricsObservabilityHooks, SafeStreamHooks, TracingObservabilityHooks};
//!
//! let _stream_hooks = SafeStreamHooks::new(TracingObservabilityHooks);
//! let _metrics = MetricsObservabilityHooks;
//! ```

mod composite_hooks;
mod metrics_hooks;
mod safe_hooks;
mod tracing_hooks;

pub use composite_hooks::{CompositeAgentHooks, CompositeStreamHooks};
pub use metrics_hooks::MetricsObservabilityHooks;
pub use safe_hooks::{SafeAgentHooks, SafeStreamHooks};
pub use tracing_hooks::TracingObservabilityHooks;

pub mod prelude {
    pub use crate::{
        CompositeAgentHooks, CompositeStreamHooks, MetricsObservabilityHooks, SafeAgentHooks,
        SafeStreamHooks, TracingObservabilityHooks,
    };
}

#[cfg(test)]
mod tests;
