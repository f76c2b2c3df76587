//! 场景描述
//!
//! 从 JSON 加载的仿真场景：路由器快照、连线和待注入的数据包。

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ScenarioError;
use crate::net::{Addr, IpProto, PortRef, Wire};
use crate::router::RouterConfig;
use crate::store::RouterSnapshot;

pub const SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioSpec {
    pub schema_version: u32,
    #[serde(default)]
    pub router: Option<RouterConfig>,
    #[serde(default)]
    pub contexts: ContextMode,
    pub routers: Vec<RouterSnapshot>,
    #[serde(default)]
    pub wires: Vec<Wire>,
    #[serde(default)]
    pub packets: Vec<PacketSpec>,
}

/// 路由器使用的上下文工厂
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ContextMode {
    None,
    #[default]
    Echo,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PacketSpec {
    #[serde(default)]
    pub at_tick: u64,
    /// 注入到哪个端口的输入队列
    pub at: PortRef,
    #[serde(default)]
    pub src: Option<Addr>,
    pub dst: Addr,
    #[serde(default)]
    pub proto: IpProto,
    #[serde(default)]
    pub payload: Option<String>,
    /// 重复注入的个数
    #[serde(default = "one")]
    pub count: u32,
}

fn one() -> u32 {
    1
}

impl ScenarioSpec {
    pub fn from_json(raw: &str) -> Result<Self, ScenarioError> {
        let spec: ScenarioSpec = serde_json::from_str(raw)?;
        if spec.schema_version != SCHEMA_VERSION {
            return Err(ScenarioError::SchemaVersion(spec.schema_version));
        }
        Ok(spec)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ScenarioError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json(&raw)
    }

    /// 场景中声明的路由器配置，未声明时使用默认值
    pub fn router_config(&self) -> RouterConfig {
        self.router.unwrap_or_default()
    }
}
