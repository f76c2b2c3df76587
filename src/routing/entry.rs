//! 路由表项
//!
//! 表项一经创建即不可变；相等性按身份（`EntryId`）判断，
//! 两个内容相同但分别创建的表项是不同的表项。

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

use crate::net::{Addr, Mask, PortNumber, is_in_subnet};

static NEXT_ENTRY_ID: AtomicU64 = AtomicU64::new(1);

/// 路由来源
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteSource {
    /// 静态配置，会被持久化
    Static,
    /// 直连子网
    Direct,
    /// 路由器自身端口的地址
    LocalPort,
}

/// 表项身份
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntryId(pub u64);

#[derive(Debug, Clone)]
pub struct RoutingTableEntry {
    id: EntryId,
    network: Addr,
    mask: Mask,
    source: RouteSource,
    via: Option<Addr>,
    origin: Option<PortNumber>,
}

impl RoutingTableEntry {
    pub fn new(network: Addr, mask: Mask, source: RouteSource) -> Self {
        Self {
            id: EntryId(NEXT_ENTRY_ID.fetch_add(1, Ordering::Relaxed)),
            network,
            mask,
            source,
            via: None,
            origin: None,
        }
    }

    /// 静态路由
    pub fn static_route(network: Addr, mask: Mask) -> Self {
        Self::new(network, mask, RouteSource::Static)
    }

    /// 经由网关 `via` 的静态路由
    pub fn static_via(network: Addr, mask: Mask, via: Addr) -> Self {
        Self {
            via: Some(via),
            ..Self::static_route(network, mask)
        }
    }

    /// 由端口地址推导出的两条路由：`[LocalPort, Direct]`。
    ///
    /// `LocalPort` 放在前面，这样首个匹配的查找也会把发往端口地址本身的
    /// 数据包判定为本地交付。
    pub fn derived_for_port(port: PortNumber, addr: Addr, mask: Mask) -> [Self; 2] {
        let mut local = Self::new(addr, Mask::HOST, RouteSource::LocalPort);
        local.origin = Some(port);
        let mut direct = Self::new(addr.network(mask), mask, RouteSource::Direct);
        direct.origin = Some(port);
        [local, direct]
    }

    pub fn id(&self) -> EntryId {
        self.id
    }

    pub fn network(&self) -> Addr {
        self.network
    }

    pub fn mask(&self) -> Mask {
        self.mask
    }

    pub fn source(&self) -> RouteSource {
        self.source
    }

    pub fn via(&self) -> Option<Addr> {
        self.via
    }

    /// 推导出该表项的端口（仅 Direct/LocalPort）
    pub fn origin(&self) -> Option<PortNumber> {
        self.origin
    }

    /// 选择出端口时用来匹配端口子网的地址：有网关用网关，否则用网络地址。
    pub fn egress_key(&self) -> Addr {
        self.via.unwrap_or(self.network)
    }

    pub fn matches(&self, addr: Addr) -> bool {
        is_in_subnet(addr, self.network, self.mask)
    }
}

impl PartialEq for RoutingTableEntry {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for RoutingTableEntry {}

impl std::hash::Hash for RoutingTableEntry {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}
