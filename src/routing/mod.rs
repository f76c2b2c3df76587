//! 路由模块
//!
//! 路由表项与路由表。

mod entry;
mod table;

pub use entry::{EntryId, RouteSource, RoutingTableEntry};
pub use table::{LookupMode, RoutingTable};
