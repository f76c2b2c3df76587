//! 网络世界
//!
//! 持有所有路由器（通过路由器服务）和端口之间的连线。

use std::any::Any;
use std::collections::HashMap;

use tracing::{debug, info, trace};

use super::addr::Addr;
use super::packet::{IpProto, Packet};
use super::wire::{PortRef, Wire};
use crate::error::{RouterError, ScenarioError};
use crate::sim::World;
use crate::store::{Repository, RouterService};

/// 网络级统计信息
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct WorldStats {
    pub ticks: u64,
    pub injected: u64,
    /// 经连线移动到对端输入队列的数据包
    pub moved: u64,
    /// 从未连线的端口离开网络的数据包
    pub exited: u64,
}

#[derive(Default)]
pub struct NetWorld {
    pub routers: RouterService,
    wires: Vec<Wire>,
    peers: HashMap<PortRef, PortRef>,
    /// 离开网络的数据包及其出口
    pub exited: Vec<(PortRef, Packet)>,
    pub stats: WorldStats,
    next_pkt_id: u64,
}

impl World for NetWorld {
    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

impl NetWorld {
    pub fn new(routers: RouterService) -> Self {
        Self {
            routers,
            ..Self::default()
        }
    }

    pub fn wires(&self) -> &[Wire] {
        &self.wires
    }

    fn endpoint_exists(&self, at: PortRef) -> bool {
        self.routers
            .repository()
            .get(&at.router)
            .is_some_and(|r| r.get_port(at.port).is_some())
    }

    /// 连接两个端口；每个端口至多连接一条线。
    pub fn connect(&mut self, a: PortRef, b: PortRef) -> Result<(), ScenarioError> {
        for end in [a, b] {
            if !self.endpoint_exists(end) {
                return Err(ScenarioError::UnknownEndpoint {
                    router: end.router,
                    port: end.port,
                });
            }
            if self.peers.contains_key(&end) {
                return Err(RouterError::ParameterInconsistency {
                    what: "Wire",
                    detail: format!("{end} is already wired"),
                }
                .into());
            }
        }
        self.peers.insert(a, b);
        self.peers.insert(b, a);
        self.wires.push(Wire { a, b });
        debug!(%a, %b, "端口已连线");
        Ok(())
    }

    pub fn peer_of(&self, at: PortRef) -> Option<PortRef> {
        self.peers.get(&at).copied()
    }

    /// 创建 IP 数据包并分配 id
    pub fn make_packet(&mut self, src: Option<Addr>, dst: Addr, proto: IpProto, payload: impl Into<Vec<u8>>) -> Packet {
        let id = self.next_pkt_id;
        self.next_pkt_id = self.next_pkt_id.wrapping_add(1);
        Packet::ip(id, src, dst, proto, payload)
    }

    /// 把数据包放入某个端口的输入队列
    pub fn inject(&mut self, at: PortRef, pkt: Packet) -> Result<(), RouterError> {
        let router = self
            .routers
            .get_mut(at.router)
            .ok_or(RouterError::RouterNotFound(at.router))?;
        let port = router.get_port_mut(at.port).ok_or(RouterError::PortNotFound {
            router: at.router,
            port: at.port,
        })?;
        trace!(%at, pkt_id = pkt.id, dst = %pkt.dst, "注入数据包");
        port.receive(pkt);
        self.stats.injected += 1;
        Ok(())
    }

    /// 依次推进每个路由器一个 tick（按 id 升序），返回总取包数。
    pub fn tick_all(&mut self) -> usize {
        let mut drained = 0;
        for id in self.routers.ids() {
            if let Some(router) = self.routers.get_mut(id) {
                drained += router.tick().drained;
            }
        }
        self.stats.ticks += 1;
        drained
    }

    /// 把所有端口输出队列中的数据包沿连线送到对端；
    /// 未连线端口的输出视为离开网络。返回移动的数据包数。
    pub fn transfer(&mut self) -> usize {
        let mut outgoing: Vec<(PortRef, Packet)> = Vec::new();
        for id in self.routers.ids() {
            let Some(router) = self.routers.get_mut(id) else {
                continue;
            };
            let numbers: Vec<_> = router.ports().iter().map(|p| p.number()).collect();
            for number in numbers {
                if let Some(port) = router.get_port_mut(number) {
                    let from = PortRef { router: id, port: number };
                    outgoing.extend(port.drain_output().into_iter().map(|pkt| (from, pkt)));
                }
            }
        }

        let mut moved = 0;
        for (from, pkt) in outgoing {
            let Some(to) = self.peer_of(from) else {
                info!(%from, pkt_id = pkt.id, dst = %pkt.dst, "📤 数据包离开网络");
                self.stats.exited += 1;
                self.exited.push((from, pkt));
                continue;
            };
            if let Some(port) = self
                .routers
                .get_mut(to.router)
                .and_then(|r| r.get_port_mut(to.port))
            {
                trace!(%from, %to, pkt_id = pkt.id, "数据包经连线传输");
                port.receive(pkt);
                moved += 1;
            }
        }
        self.stats.moved += moved as u64;
        moved
    }
}
