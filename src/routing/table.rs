//! 路由表
//!
//! `routes` 保存持久化的静态路由；`running_routes` 是转发时真正查询的工作集合，
//! 由持久化路由加上端口推导出的直连/本地路由组成。
//! 两者都按插入顺序保存，因此首个匹配的查找结果是确定的。

use serde::{Deserialize, Serialize};
use tracing::{debug, error, trace};

use crate::error::RouterError;
use crate::net::{Addr, PortNumber, RouterId};

use super::entry::{RouteSource, RoutingTableEntry};

/// 查找策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum LookupMode {
    /// 按枚举顺序返回第一个匹配项，不考虑前缀长度
    #[default]
    FirstMatch,
    /// 最长前缀匹配；前缀长度相同时取较早的表项
    LongestPrefix,
}

#[derive(Debug, Clone)]
pub struct RoutingTable {
    owner: Option<RouterId>,
    mode: LookupMode,
    routes: Vec<RoutingTableEntry>,
    running_routes: Vec<RoutingTableEntry>,
}

impl RoutingTable {
    pub fn new(owner: RouterId, mode: LookupMode) -> Self {
        Self {
            owner: Some(owner),
            mode,
            routes: Vec::new(),
            running_routes: Vec::new(),
        }
    }

    /// 没有归属路由器的表（仅在组装过程中出现）
    pub fn detached(mode: LookupMode) -> Self {
        Self {
            owner: None,
            mode,
            routes: Vec::new(),
            running_routes: Vec::new(),
        }
    }

    pub fn owner(&self) -> Option<RouterId> {
        self.owner
    }

    pub fn set_owner(&mut self, owner: RouterId) {
        self.owner = Some(owner);
    }

    pub fn mode(&self) -> LookupMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: LookupMode) {
        self.mode = mode;
    }

    /// 持久化的静态路由
    pub fn routes(&self) -> &[RoutingTableEntry] {
        &self.routes
    }

    /// 工作路由集合
    pub fn running_routes(&self) -> &[RoutingTableEntry] {
        &self.running_routes
    }

    /// 校验表与路由器之间的双向归属关系。
    pub fn owner_ok(&self, router: RouterId) -> Result<(), RouterError> {
        match self.owner {
            None => Err(RouterError::RoutingTableNoRouter),
            Some(actual) if actual != router => Err(RouterError::OwnerInconsistency {
                expected: router,
                actual,
            }),
            Some(_) => Ok(()),
        }
    }

    /// 加入一条路由：总是进入工作集合，`Static` 来源的同时进入持久化集合。
    pub fn add_route(&mut self, entry: RoutingTableEntry) {
        trace!(
            network = %entry.network(),
            mask = %entry.mask(),
            source = ?entry.source(),
            "添加路由"
        );
        if entry.source() == RouteSource::Static && !self.routes.contains(&entry) {
            self.routes.push(entry.clone());
        }
        if !self.running_routes.contains(&entry) {
            self.running_routes.push(entry);
        }
    }

    /// 恢复一条持久化的静态路由；只进入持久化集合，工作集合在
    /// [`RoutingTable::load_saved_routes_to_running`] 时才会包含它。
    pub fn restore_saved(&mut self, entry: RoutingTableEntry) -> Result<(), RouterError> {
        if entry.source() != RouteSource::Static {
            error!(source = ?entry.source(), "只有静态路由可以被持久化");
            return Err(RouterError::ParameterInconsistency {
                what: "RoutingTable",
                detail: format!("cannot persist {:?} route", entry.source()),
            });
        }
        if !self.routes.contains(&entry) {
            self.routes.push(entry);
        }
        Ok(())
    }

    /// 把持久化路由合并进工作集合（幂等）。
    pub fn load_saved_routes_to_running(&mut self) {
        let mut loaded = 0usize;
        for entry in &self.routes {
            if !self.running_routes.contains(entry) {
                self.running_routes.push(entry.clone());
                loaded += 1;
            }
        }
        debug!(loaded, running = self.running_routes.len(), "持久化路由已载入工作集合");
    }

    /// 用新的推导路由替换某个端口原先推导出的路由。
    pub fn replace_derived(&mut self, port: PortNumber, entries: impl IntoIterator<Item = RoutingTableEntry>) {
        self.running_routes.retain(|e| e.origin() != Some(port));
        for entry in entries {
            self.add_route(entry);
        }
    }

    /// 按当前查找策略返回匹配 `addr` 的表项。
    pub fn get_entry_by_ip(&self, addr: Addr) -> Option<&RoutingTableEntry> {
        let mut matching = self.running_routes.iter().filter(|e| e.matches(addr));
        match self.mode {
            LookupMode::FirstMatch => matching.next(),
            LookupMode::LongestPrefix => matching.fold(None, |best: Option<&RoutingTableEntry>, e| match best {
                Some(b) if b.mask().prefix_len() >= e.mask().prefix_len() => Some(b),
                _ => Some(e),
            }),
        }
    }
}
