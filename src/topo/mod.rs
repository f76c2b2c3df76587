//! 拓扑构建
//!
//! 根据场景描述构建网络世界。

mod scenario;

pub use scenario::build_scenario;
