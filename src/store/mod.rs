//! 存储模块
//!
//! 仓库抽象、持久化快照以及路由器服务。

mod repository;
mod service;
mod snapshot;

pub use repository::{InMemoryRepository, Repository};
pub use service::{PortConfigurer, RouterService};
pub use snapshot::{PortSnapshot, RouteSnapshot, RouterSnapshot};
