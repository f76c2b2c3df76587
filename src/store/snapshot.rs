//! 持久化状态快照
//!
//! 快照只包含需要持久化的状态：端口地址和静态路由。
//! 新的路由器由快照一次性构建出来，而不是在两个活对象之间复制字段。

use serde::{Deserialize, Serialize};
use tracing::error;

use crate::error::RouterError;
use crate::net::{Addr, Mask, PortNumber, RouterId};
use crate::router::{Router, RouterConfig};
use crate::routing::{RouteSource, RoutingTableEntry};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouterSnapshot {
    pub id: RouterId,
    #[serde(default)]
    pub name: Option<String>,
    pub ports: Vec<PortSnapshot>,
    #[serde(default)]
    pub static_routes: Vec<RouteSnapshot>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortSnapshot {
    pub number: PortNumber,
    #[serde(default)]
    pub address: Option<Addr>,
    #[serde(default)]
    pub mask: Option<Mask>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteSnapshot {
    pub network: Addr,
    pub mask: Mask,
    #[serde(default)]
    pub via: Option<Addr>,
}

impl RouteSnapshot {
    fn to_entry(&self) -> RoutingTableEntry {
        match self.via {
            Some(via) => RoutingTableEntry::static_via(self.network, self.mask, via),
            None => RoutingTableEntry::static_route(self.network, self.mask),
        }
    }
}

fn inconsistency(detail: String) -> RouterError {
    error!(%detail, "快照参数不一致");
    RouterError::ParameterInconsistency {
        what: "RouterSnapshot",
        detail,
    }
}

impl Router {
    /// 由快照构建路由器。工作路由尚未初始化，需要再调用
    /// [`Router::initialize_running_routes`]。
    pub fn from_snapshot(snapshot: &RouterSnapshot, config: RouterConfig) -> Result<Router, RouterError> {
        let name = snapshot
            .name
            .clone()
            .unwrap_or_else(|| snapshot.id.to_string());
        let mut router = Router::new(snapshot.id, name, config);

        let mut ports: Vec<&PortSnapshot> = snapshot.ports.iter().collect();
        ports.sort_by_key(|p| p.number);
        for (idx, port) in ports.iter().enumerate() {
            if port.number != PortNumber::from_index(idx) {
                return Err(inconsistency(format!(
                    "port numbers must be 1..={} without gaps, found {}",
                    ports.len(),
                    port.number
                )));
            }
            match (port.address, port.mask) {
                (Some(addr), Some(mask)) => {
                    router.add_port_with_address(addr, mask);
                }
                (None, None) => {
                    router.add_port();
                }
                _ => {
                    return Err(inconsistency(format!(
                        "{} has only one of address/mask",
                        port.number
                    )));
                }
            }
        }

        for route in &snapshot.static_routes {
            router.routing_table_mut().restore_saved(route.to_entry())?;
        }
        router.check_owner()?;
        Ok(router)
    }

    /// 导出需要持久化的状态
    pub fn snapshot(&self) -> RouterSnapshot {
        RouterSnapshot {
            id: self.id(),
            name: Some(self.name().to_string()),
            ports: self
                .ports()
                .iter()
                .map(|p| PortSnapshot {
                    number: p.number(),
                    address: p.addr(),
                    mask: p.mask(),
                })
                .collect(),
            static_routes: self
                .routing_table()
                .routes()
                .iter()
                .filter(|e| e.source() == RouteSource::Static)
                .map(|e| RouteSnapshot {
                    network: e.network(),
                    mask: e.mask(),
                    via: e.via(),
                })
                .collect(),
        }
    }
}
