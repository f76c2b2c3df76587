//! 仿真核心模块
//!
//! 按 tick 推进的事件驱动仿真：时刻、事件、世界、仿真器以及场景描述。

// 子模块声明
mod event;
mod scenario;
mod simulator;
mod time;
mod world;

// 重新导出公共接口
pub use event::Event;
pub use scenario::{ContextMode, PacketSpec, SCHEMA_VERSION, ScenarioSpec};
pub use simulator::Simulator;
pub use time::Tick;
pub use world::World;
