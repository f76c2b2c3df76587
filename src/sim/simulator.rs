//! 仿真器
//!
//! 维护当前 tick 与事件队列。同一 tick 的事件按调度顺序执行。

use std::collections::BTreeMap;

use tracing::{debug, info, trace};

use super::event::Event;
use super::time::Tick;
use super::world::World;

#[derive(Default)]
pub struct Simulator {
    now: Tick,
    next_seq: u64,
    /// (执行时刻, 序列号) -> 事件
    queue: BTreeMap<(Tick, u64), Box<dyn Event>>,
}

impl Simulator {
    pub fn now(&self) -> Tick {
        self.now
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// 调度事件在指定 tick 执行；早于当前时刻的事件按当前时刻执行。
    #[tracing::instrument(skip(self, ev), fields(event_type = std::any::type_name::<E>(), schedule_at = %at))]
    pub fn schedule<E: Event>(&mut self, at: Tick, ev: E) {
        let at = at.max(self.now);
        let seq = self.next_seq;
        self.next_seq = self.next_seq.wrapping_add(1);
        self.queue.insert((at, seq), Box::new(ev));
        trace!(now = %self.now, seq, queue_size = self.queue.len(), "事件已加入队列");
    }

    fn pop_due(&mut self, until: Option<Tick>) -> Option<Box<dyn Event>> {
        let (&(at, _), _) = self.queue.first_key_value()?;
        if until.is_some_and(|u| at > u) {
            return None;
        }
        let ((at, seq), ev) = self.queue.pop_first()?;
        self.now = at;
        trace!(now = %at, seq, "执行事件");
        Some(ev)
    }

    /// 运行直到事件队列为空或越过 `until`；结束后时间至少推进到 `until`。
    pub fn run_until(&mut self, until: Tick, world: &mut dyn World) {
        while let Some(ev) = self.pop_due(Some(until)) {
            ev.execute(self, world);
            world.on_event(self);
        }
        self.now = self.now.max(until);
    }

    /// 运行所有事件直到队列为空。
    #[tracing::instrument(skip(self, world))]
    pub fn run(&mut self, world: &mut dyn World) {
        info!("▶️  开始运行仿真");
        let mut events = 0u64;
        while let Some(ev) = self.pop_due(None) {
            events += 1;
            ev.execute(self, world);
            world.on_event(self);
        }
        debug!(remaining = self.queue.len(), "事件队列已清空");
        info!(total_events = events, final_tick = %self.now, "✅ 仿真完成");
    }
}
