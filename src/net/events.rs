//! 网络仿真事件

use tracing::{debug, error, warn};

use super::net_world::NetWorld;
use super::packet::Packet;
use super::wire::PortRef;
use crate::sim::{Event, Simulator, World};

fn net_world(world: &mut dyn World) -> Option<&mut NetWorld> {
    let w = world.as_any_mut().downcast_mut::<NetWorld>();
    if w.is_none() {
        error!("world must be NetWorld");
    }
    w
}

/// 事件：把数据包放入某个端口的输入队列。
#[derive(Debug)]
pub struct InjectPacket {
    pub at: PortRef,
    pub pkt: Packet,
}

impl Event for InjectPacket {
    #[tracing::instrument(skip(self, sim, world), fields(pkt_id = self.pkt.id, at = %self.at))]
    fn execute(self: Box<Self>, sim: &mut Simulator, world: &mut dyn World) {
        let InjectPacket { at, pkt } = *self;
        let Some(w) = net_world(world) else {
            return;
        };
        debug!(now = %sim.now(), dst = %pkt.dst, "📨 注入数据包");
        if let Err(e) = w.inject(at, pkt) {
            warn!(error = %e, "注入失败，数据包被丢弃");
        }
    }
}

/// 事件：推进所有路由器一个 tick，然后沿连线传输输出；
/// 还有剩余 tick 时在下一 tick 重新调度自身。
#[derive(Debug)]
pub struct TickAll {
    pub remaining: u64,
}

impl Event for TickAll {
    #[tracing::instrument(skip(self, sim, world), fields(now = %sim.now(), remaining = self.remaining))]
    fn execute(self: Box<Self>, sim: &mut Simulator, world: &mut dyn World) {
        if self.remaining == 0 {
            return;
        }
        let Some(w) = net_world(world) else {
            return;
        };

        let drained = w.tick_all();
        let moved = w.transfer();
        debug!(drained, moved, "⏱️  tick 完成");

        if self.remaining > 1 {
            sim.schedule(
                sim.now().next(),
                TickAll {
                    remaining: self.remaining - 1,
                },
            );
        }
    }
}
