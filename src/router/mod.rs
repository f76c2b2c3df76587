//! 路由器模块
//!
//! 包含路由器的调度与转发逻辑、上下文机制、配置和统计信息。

mod config;
mod context;
#[allow(clippy::module_inception)]
mod router;
mod stats;

pub use config::{DEFAULT_INPUT_PROCESSING_RATE, RouterConfig};
pub use context::{
    Context, ContextFactory, ContextKind, ContextState, EchoContexts, EchoResponder, NoContexts,
    Step,
};
pub use router::{NextHop, Router};
pub use stats::{RouterStats, TickReport};
