//! 路由器配置

use serde::{Deserialize, Serialize};

use crate::routing::LookupMode;

pub const DEFAULT_INPUT_PROCESSING_RATE: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouterConfig {
    /// 每个 tick 最多从输入队列取出的数据包数
    #[serde(default = "default_rate")]
    pub input_processing_rate: usize,
    #[serde(default)]
    pub lookup_mode: LookupMode,
    /// 每个上下文最多被推进的步数；`None` 表示不限制。
    /// `Some(0)` 合法：上下文在第一次推进前就被强制结束。
    #[serde(default)]
    pub context_step_budget: Option<u32>,
}

fn default_rate() -> usize {
    DEFAULT_INPUT_PROCESSING_RATE
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            input_processing_rate: DEFAULT_INPUT_PROCESSING_RATE,
            lookup_mode: LookupMode::default(),
            context_step_budget: None,
        }
    }
}
