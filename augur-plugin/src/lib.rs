//! Augur Plugin System
//!
//! Provides the traits and registry that expose Augur functions as tools,
//! plus the call context that carries the optional reasoning chain.

mod traits;
mod registry;
mod context;

pub use traits::{FunctionPlugin, FunctionMeta, ArgMeta};
pub use registry::PluginRegistry;
pub use context::{CallContext, ReasoningChain, ReasoningStep};

/// Re-export core types for plugin authors
pub mod prelude {
    pub use crate::{
        FunctionPlugin, FunctionMeta, ArgMeta,
        PluginRegistry, CallContext, ReasoningChain, ReasoningStep,
    };
    pub use augur_core::prelude::*;
}
