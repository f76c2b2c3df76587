//! 错误类型

use thiserror::Error;

use crate::net::{Addr, AddrError, PortNumber, RouterId};

/// 路由器、路由表与路由器服务的错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouterError {
    #[error("router {0} has no ports")]
    NoPorts(RouterId),

    #[error("routing table has no owning router")]
    RoutingTableNoRouter,

    #[error("routing table belongs to {actual}, not {expected}")]
    OwnerInconsistency { expected: RouterId, actual: RouterId },

    #[error("route to {network} for destination {dst} matches no port")]
    NoEgressPort { dst: Addr, network: Addr },

    #[error("{port} not found on router {router}")]
    PortNotFound { router: RouterId, port: PortNumber },

    #[error("router {0} not found")]
    RouterNotFound(RouterId),

    #[error("parameter inconsistency in {what}: {detail}")]
    ParameterInconsistency { what: &'static str, detail: String },
}

/// 场景加载错误
#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("router error: {0}")]
    Router(#[from] RouterError),

    #[error("address error: {0}")]
    Addr(#[from] AddrError),

    #[error("unsupported schema_version {0}")]
    SchemaVersion(u32),

    #[error("packet scheduled at tick {at_tick} but the run only covers {ticks} ticks")]
    PacketAfterLastTick { at_tick: u64, ticks: u64 },

    #[error("wire endpoint {router}/{port} does not exist")]
    UnknownEndpoint { router: RouterId, port: PortNumber },
}
