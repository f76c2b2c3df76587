//! 事件 trait

use super::simulator::Simulator;
use super::world::World;

/// 可被调度执行的事件。`self: Box<Self>` 让事件在执行时拿回所有权。
pub trait Event: Send + 'static {
    fn execute(self: Box<Self>, sim: &mut Simulator, world: &mut dyn World);
}
