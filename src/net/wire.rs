//! 端口之间的连线
//!
//! 连线是进程内的：一端端口输出队列中的数据包在 tick 结束时
//! 被移入另一端端口的输入队列，不模拟时延和带宽。

use std::fmt;

use serde::{Deserialize, Serialize};

use super::id::{PortNumber, RouterId};

/// 指向某个路由器上的某个端口
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PortRef {
    pub router: RouterId,
    pub port: PortNumber,
}

impl PortRef {
    pub fn new(router: u64, port: u32) -> Self {
        Self {
            router: RouterId(router),
            port: PortNumber(port),
        }
    }
}

impl fmt::Display for PortRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.router, self.port)
    }
}

/// 双向连线
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wire {
    pub a: PortRef,
    pub b: PortRef,
}
