//! 网络模块
//!
//! 地址、数据包、端口、连线以及承载路由器的网络世界。

// 子模块声明
mod addr;
mod events;
mod id;
mod net_world;
mod packet;
mod port;
mod wire;

// 重新导出公共接口
pub use addr::{Addr, AddrError, Mask, is_in_subnet};
pub use events::{InjectPacket, TickAll};
pub use id::{PortNumber, RouterId};
pub use net_world::{NetWorld, WorldStats};
pub use packet::{DataUnitKind, IpProto, Packet};
pub use port::Port;
pub use wire::{PortRef, Wire};
