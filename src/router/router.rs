//! 路由器
//!
//! 路由器持有有序的端口列表、一张路由表和若干活动上下文。
//! 每个 tick：按轮转方式公平地从各端口取包 → 查路由表 → 转发/本地接收/丢弃
//! → 推进所有活动上下文，并把上下文产生的数据包重新送入同样的处理流程。

use tracing::{debug, error, info, trace, warn};

use crate::error::RouterError;
use crate::net::{Addr, Mask, Packet, Port, PortNumber, RouterId};
use crate::routing::{RouteSource, RoutingTable, RoutingTableEntry};

use super::config::RouterConfig;
use super::context::{ActiveContext, ContextFactory, ContextKind, ContextState, NoContexts};
use super::stats::{RouterStats, TickReport};

/// 下一跳判定结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextHop {
    /// 路由表中没有匹配项
    Unreachable,
    /// 路由器自身就是目的地
    Local,
    /// 经由该端口转发
    Port(PortNumber),
}

pub struct Router {
    id: RouterId,
    name: String,
    ports: Vec<Port>,
    routing_table: RoutingTable,
    contexts: Vec<ActiveContext>,
    factory: Box<dyn ContextFactory>,
    config: RouterConfig,
    pub stats: RouterStats,
}

impl Router {
    /// 创建路由器；路由表随路由器一起创建。
    pub fn new(id: RouterId, name: impl Into<String>, config: RouterConfig) -> Self {
        Self {
            id,
            name: name.into(),
            ports: Vec::new(),
            routing_table: RoutingTable::new(id, config.lookup_mode),
            contexts: Vec::new(),
            factory: Box::new(NoContexts),
            config,
            stats: RouterStats::default(),
        }
    }

    pub fn with_factory(mut self, factory: impl ContextFactory + 'static) -> Self {
        self.factory = Box::new(factory);
        self
    }

    pub fn set_factory(&mut self, factory: Box<dyn ContextFactory>) {
        self.factory = factory;
    }

    pub fn id(&self) -> RouterId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    pub fn ports(&self) -> &[Port] {
        &self.ports
    }

    pub fn routing_table(&self) -> &RoutingTable {
        &self.routing_table
    }

    pub fn routing_table_mut(&mut self) -> &mut RoutingTable {
        &mut self.routing_table
    }

    /// 替换路由表；调用方应随后用 [`Router::check_owner`] 校验归属。
    pub fn replace_routing_table(&mut self, table: RoutingTable) {
        self.routing_table = table;
    }

    pub fn check_owner(&self) -> Result<(), RouterError> {
        self.routing_table.owner_ok(self.id)
    }

    pub fn active_contexts(&self) -> usize {
        self.contexts.len()
    }

    pub fn context_states(&self) -> Vec<ContextState> {
        self.contexts.iter().map(|c| c.state).collect()
    }

    /// 添加一个未分配地址的端口，返回其编号
    pub fn add_port(&mut self) -> PortNumber {
        let number = PortNumber::from_index(self.ports.len());
        self.ports.push(Port::new(number));
        number
    }

    pub fn add_port_with_address(&mut self, addr: Addr, mask: Mask) -> PortNumber {
        let number = PortNumber::from_index(self.ports.len());
        self.ports.push(Port::with_address(number, addr, mask));
        number
    }

    pub fn get_port(&self, number: PortNumber) -> Option<&Port> {
        self.ports.get(number.index()?)
    }

    pub fn get_port_mut(&mut self, number: PortNumber) -> Option<&mut Port> {
        self.ports.get_mut(number.index()?)
    }

    /// 初始化工作路由：载入持久化路由，再为每个已分配地址的端口推导
    /// 一条 `LocalPort` 路由和一条 `Direct` 路由。
    ///
    /// 路由表归属不一致或没有端口时返回错误，初始化不可继续。
    #[tracing::instrument(skip(self), fields(router = %self.id))]
    pub fn initialize_running_routes(&mut self) -> Result<(), RouterError> {
        if let Err(e) = self.routing_table.owner_ok(self.id) {
            error!(error = %e, "初始化失败：路由表归属不一致");
            return Err(e);
        }
        if self.ports.is_empty() {
            error!("初始化失败：路由器没有端口");
            return Err(RouterError::NoPorts(self.id));
        }

        self.routing_table.load_saved_routes_to_running();
        for idx in 0..self.ports.len() {
            self.refresh_port_routes(idx);
        }

        info!(
            saved = self.routing_table.routes().len(),
            running = self.routing_table.running_routes().len(),
            "工作路由已初始化"
        );
        Ok(())
    }

    /// 为端口设置地址并重新计算该端口推导出的路由。
    #[tracing::instrument(skip(self), fields(router = %self.id))]
    pub fn set_address(&mut self, number: PortNumber, addr: Addr, mask: Mask) -> Result<(), RouterError> {
        let idx = number
            .index()
            .filter(|&i| i < self.ports.len())
            .ok_or(RouterError::PortNotFound {
                router: self.id,
                port: number,
            })?;
        self.ports[idx].set_address(addr, mask);
        self.refresh_port_routes(idx);
        info!(port = %number, %addr, %mask, "端口地址已设置");
        Ok(())
    }

    fn refresh_port_routes(&mut self, idx: usize) {
        let port = &self.ports[idx];
        let number = port.number();
        let derived = port
            .address()
            .map(|(addr, mask)| RoutingTableEntry::derived_for_port(number, addr, mask));
        if derived.is_none() {
            debug!(port = %number, "端口未分配地址，跳过直连路由");
        }
        self.routing_table
            .replace_derived(number, derived.into_iter().flatten());
    }

    /// 查找通往 `dst` 的端口。
    ///
    /// 表项存在且不是本地路由时，必然有端口的子网包含该表项；
    /// 找不到说明数据不一致，返回 [`RouterError::NoEgressPort`]。
    pub fn find_leading_port(&self, dst: Addr) -> Result<NextHop, RouterError> {
        let Some(entry) = self.routing_table.get_entry_by_ip(dst) else {
            return Ok(NextHop::Unreachable);
        };
        if entry.source() == RouteSource::LocalPort {
            return Ok(NextHop::Local);
        }
        let key = entry.egress_key();
        self.ports
            .iter()
            .find(|p| p.contains(key))
            .map(|p| NextHop::Port(p.number()))
            .ok_or(RouterError::NoEgressPort {
                dst,
                network: entry.network(),
            })
    }

    /// 以轮转方式从有输入的端口取包，每轮每个端口最多一个，总数不超过 `rate`。
    ///
    /// 轮到时已经为空的端口会移出本 tick 的轮转。返回按服务顺序排列的端口编号。
    #[tracing::instrument(skip(self), fields(router = %self.id))]
    pub fn process_input_traffic(&mut self, rate: usize) -> Vec<PortNumber> {
        let mut rotation: Vec<usize> = self
            .ports
            .iter()
            .enumerate()
            .filter(|(_, p)| p.has_input())
            .map(|(i, _)| i)
            .collect();
        trace!(nonempty = rotation.len(), "收集有输入的端口");

        let mut served = Vec::new();
        let mut cursor = 0;
        while served.len() < rate {
            if cursor >= rotation.len() {
                if rotation.is_empty() {
                    break;
                }
                cursor = 0;
            }
            let idx = rotation[cursor];
            match self.ports[idx].poll_input() {
                Some(pkt) => {
                    served.push(self.ports[idx].number());
                    self.stats.drained += 1;
                    self.process_data_unit(pkt);
                    cursor += 1;
                }
                None => {
                    rotation.remove(cursor);
                }
            }
        }

        if !served.is_empty() {
            debug!(drained = served.len(), rate, "输入处理完成");
        }
        served
    }

    /// 处理一个数据单元；只有 IP 数据包会被路由。
    pub fn process_data_unit(&mut self, pkt: Packet) {
        if !pkt.is_ip() {
            debug!(pkt_id = pkt.id, kind = ?pkt.kind, "忽略非 IP 数据单元");
            self.stats.ignored += 1;
            return;
        }
        self.process_ip(pkt);
    }

    #[tracing::instrument(skip(self, pkt), fields(router = %self.id, pkt_id = pkt.id, dst = %pkt.dst))]
    pub fn process_ip(&mut self, mut pkt: Packet) {
        match self.find_leading_port(pkt.dst) {
            Ok(NextHop::Unreachable) => {
                // 不生成 "destination unreachable" 应答
                info!("目的地不可达，丢弃");
                self.stats.dropped_unreachable += 1;
            }
            Ok(NextHop::Local) => {
                info!("本路由器即为目的地");
                self.stats.accepted += 1;
                self.spawn_context(&pkt, ContextKind::Accepted);
            }
            Ok(NextHop::Port(number)) => {
                let Some(egress) = self.get_port(number).and_then(|p| p.addr()) else {
                    error!(port = %number, "出端口不存在或没有地址");
                    self.stats.dropped_inconsistent += 1;
                    return;
                };
                if pkt.src.is_none() {
                    trace!(src = %egress, "补全源地址");
                    pkt.src = Some(egress);
                }
                info!(port = %number, via = %egress, "经端口转发");
                self.spawn_context(&pkt, ContextKind::Transit);
                if let Some(port) = self.get_port_mut(number) {
                    port.push(pkt);
                    self.stats.forwarded += 1;
                }
            }
            Err(e) => {
                error!(error = %e, "路由表与端口不一致，丢弃");
                self.stats.dropped_inconsistent += 1;
            }
        }
    }

    fn spawn_context(&mut self, pkt: &Packet, kind: ContextKind) {
        match self.factory.create(pkt, kind) {
            Some(ctx) => {
                debug!(context = ctx.name(), ?kind, "创建上下文");
                self.stats.contexts_created += 1;
                self.contexts.push(ActiveContext::new(ctx));
            }
            None => trace!(?kind, "工厂未创建上下文"),
        }
    }

    /// 推进所有活动上下文一步，返回被推进的上下文数。
    ///
    /// 本轮中新建的上下文从下一个 tick 开始推进。
    /// 已用完步数预算的上下文在推进前结束（预算为 0 时一步也不推进）。
    #[tracing::instrument(skip(self), fields(router = %self.id))]
    pub fn process_contexts(&mut self) -> usize {
        let mut active = std::mem::take(&mut self.contexts);
        let mut stepped = 0;
        let budget = self.config.context_step_budget;
        let exhausted = |steps: u32| budget.is_some_and(|limit| steps >= limit);

        active.retain_mut(|ac| {
            if exhausted(ac.steps) {
                self.expire(ac);
                return false;
            }

            let step = ac.ctx.step();
            stepped += 1;
            ac.steps = ac.steps.saturating_add(1);
            ac.state = ContextState::Active;
            trace!(context = ac.ctx.name(), emitted = step.emitted.len(), alive = step.alive, "上下文推进");

            for pkt in step.emitted {
                self.process_data_unit(pkt);
            }

            if !step.alive {
                ac.state = ContextState::Terminated;
                self.stats.contexts_finished += 1;
                debug!(context = ac.ctx.name(), steps = ac.steps, "上下文结束");
                return false;
            }
            if exhausted(ac.steps) {
                self.expire(ac);
                return false;
            }
            true
        });

        active.append(&mut self.contexts);
        self.contexts = active;
        stepped
    }

    fn expire(&mut self, ac: &mut ActiveContext) {
        ac.state = ContextState::Terminated;
        self.stats.contexts_expired += 1;
        warn!(context = ac.ctx.name(), steps = ac.steps, "上下文超出步数预算，强制结束");
    }

    /// 执行一个完整的 tick：输入处理，然后推进上下文。
    #[tracing::instrument(skip(self), fields(router = %self.id, name = %self.name))]
    pub fn tick(&mut self) -> TickReport {
        let drained = self
            .process_input_traffic(self.config.input_processing_rate)
            .len();
        let contexts_stepped = self.process_contexts();
        TickReport {
            drained,
            contexts_stepped,
        }
    }
}
