use std::sync::{Arc, Mutex};

use crate::net::{Addr, IpProto, Mask, Packet, RouterId};
use crate::router::{Context, ContextFactory, ContextKind, Router, RouterConfig, Step};

pub fn ip(s: &str) -> Addr {
    s.parse().expect("valid address")
}

pub fn mask(s: &str) -> Mask {
    s.parse().expect("valid mask")
}

pub fn pkt(id: u64, src: Option<&str>, dst: &str) -> Packet {
    Packet::ip(id, src.map(ip), ip(dst), IpProto::Data, Vec::new())
}

pub type ContextLog = Arc<Mutex<Vec<(ContextKind, u64)>>>;

/// 记录每次创建请求，并为每个请求创建一个存活 `lifetime` 步的上下文。
pub struct RecordingFactory {
    pub log: ContextLog,
    pub lifetime: u32,
}

impl RecordingFactory {
    pub fn new(lifetime: u32) -> (Self, ContextLog) {
        let log = ContextLog::default();
        (
            Self {
                log: Arc::clone(&log),
                lifetime,
            },
            log,
        )
    }
}

impl ContextFactory for RecordingFactory {
    fn create(&mut self, pkt: &Packet, kind: ContextKind) -> Option<Box<dyn Context>> {
        self.log.lock().expect("log lock").push((kind, pkt.id));
        Some(Box::new(Countdown {
            remaining: self.lifetime,
        }))
    }
}

#[derive(Debug)]
pub struct Countdown {
    pub remaining: u32,
}

impl Context for Countdown {
    fn name(&self) -> &str {
        "countdown"
    }

    fn step(&mut self) -> Step {
        self.remaining = self.remaining.saturating_sub(1);
        Step {
            emitted: Vec::new(),
            alive: self.remaining > 0,
        }
    }
}

/// 三个端口：10.0.1.1/24, 10.0.2.1/24, 10.0.3.1/24
pub fn three_port_router(config: RouterConfig) -> Router {
    let mut r = Router::new(RouterId(1), "r1", config);
    r.add_port_with_address(ip("10.0.1.1"), mask("/24"));
    r.add_port_with_address(ip("10.0.2.1"), mask("/24"));
    r.add_port_with_address(ip("10.0.3.1"), mask("/24"));
    r
}
