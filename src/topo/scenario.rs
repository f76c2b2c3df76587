//! 场景构建
//!
//! 由快照加载路由器、连接端口，并把场景中的数据包调度为注入事件。

use tracing::{error, info};

use crate::error::ScenarioError;
use crate::net::{InjectPacket, NetWorld};
use crate::router::{ContextFactory, EchoContexts, NoContexts, RouterConfig};
use crate::sim::{ContextMode, ScenarioSpec, Simulator, Tick};
use crate::store::{InMemoryRepository, Repository, RouterService};

/// 构建场景对应的网络世界。
///
/// `config` 应用于所有路由器；数据包注入事件会被调度到 `sim` 中。
/// 仿真只运行 `ticks` 个 tick，注入时刻不早于 `ticks` 的数据包永远不会被处理，
/// 因此直接报错。
pub fn build_scenario(
    spec: &ScenarioSpec,
    config: RouterConfig,
    ticks: u64,
    sim: &mut Simulator,
) -> Result<NetWorld, ScenarioError> {
    let service = RouterService::new(InMemoryRepository::default(), config);
    let mut service = match spec.contexts {
        ContextMode::Echo => service.with_contexts(|| -> Box<dyn ContextFactory> { Box::new(EchoContexts) }),
        ContextMode::None => service.with_contexts(|| -> Box<dyn ContextFactory> { Box::new(NoContexts) }),
    };
    for snapshot in &spec.routers {
        service.hydrate(snapshot)?;
    }

    let mut world = NetWorld::new(service);
    for wire in &spec.wires {
        world.connect(wire.a, wire.b)?;
    }

    for p in &spec.packets {
        if p.at_tick >= ticks {
            error!(at = %p.at, at_tick = p.at_tick, ticks, "数据包注入时刻超出仿真范围");
            return Err(ScenarioError::PacketAfterLastTick {
                at_tick: p.at_tick,
                ticks,
            });
        }
        let exists = world
            .routers
            .repository()
            .get(&p.at.router)
            .is_some_and(|r| r.get_port(p.at.port).is_some());
        if !exists {
            return Err(ScenarioError::UnknownEndpoint {
                router: p.at.router,
                port: p.at.port,
            });
        }
        let payload = p.payload.clone().unwrap_or_default().into_bytes();
        for _ in 0..p.count {
            let pkt = world.make_packet(p.src, p.dst, p.proto, payload.clone());
            sim.schedule(Tick(p.at_tick), InjectPacket { at: p.at, pkt });
        }
    }

    info!(
        routers = spec.routers.len(),
        wires = spec.wires.len(),
        scheduled = sim.pending(),
        "🏗️  场景构建完成"
    );
    Ok(world)
}
