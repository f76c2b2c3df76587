//! 上下文（Context）
//!
//! 上下文是由某个数据包触发、跨多个 tick 推进的处理单元。
//! 路由器每个 tick 调用一次 `step`，收集其产生的数据包，
//! 并在其报告 `alive == false` 时将其移除。

use tracing::debug;

use crate::net::{IpProto, Packet};

/// 一次推进的结果
#[derive(Debug, Default)]
pub struct Step {
    pub emitted: Vec<Packet>,
    pub alive: bool,
}

impl Step {
    /// 继续存活，不产生数据包
    pub fn idle() -> Self {
        Self {
            emitted: Vec::new(),
            alive: true,
        }
    }

    /// 产生数据包后结束
    pub fn finish(emitted: Vec<Packet>) -> Self {
        Self {
            emitted,
            alive: false,
        }
    }
}

/// 上下文接口
pub trait Context: Send + std::fmt::Debug {
    fn name(&self) -> &str;

    /// 推进一步。无法继续推进的上下文应返回 `alive = false` 而不是报错。
    fn step(&mut self) -> Step;
}

/// 触发上下文的转发分类
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextKind {
    /// 经本路由器转发出去的数据包
    Transit,
    /// 目的地是本路由器的数据包
    Accepted,
}

/// 上下文工厂：可以返回 `None`，路由器只负责跟踪非空的结果。
pub trait ContextFactory: Send {
    fn create(&mut self, pkt: &Packet, kind: ContextKind) -> Option<Box<dyn Context>>;
}

/// 上下文生命周期
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextState {
    Created,
    Active,
    Terminated,
}

/// 路由器持有的活动上下文
#[derive(Debug)]
pub(crate) struct ActiveContext {
    pub(crate) ctx: Box<dyn Context>,
    pub(crate) state: ContextState,
    pub(crate) steps: u32,
}

impl ActiveContext {
    pub(crate) fn new(ctx: Box<dyn Context>) -> Self {
        Self {
            ctx,
            state: ContextState::Created,
            steps: 0,
        }
    }
}

/// 不创建任何上下文
#[derive(Debug, Default)]
pub struct NoContexts;

impl ContextFactory for NoContexts {
    fn create(&mut self, _pkt: &Packet, _kind: ContextKind) -> Option<Box<dyn Context>> {
        None
    }
}

/// 为发往本路由器的 echo 请求创建 [`EchoResponder`]。
#[derive(Debug, Default)]
pub struct EchoContexts;

impl ContextFactory for EchoContexts {
    fn create(&mut self, pkt: &Packet, kind: ContextKind) -> Option<Box<dyn Context>> {
        if kind != ContextKind::Accepted || pkt.proto != IpProto::EchoRequest {
            return None;
        }
        // 没有源地址就无处回复
        let reply_to = pkt.src?;
        Some(Box::new(EchoResponder {
            request_id: pkt.id,
            reply_to,
            payload: pkt.payload.clone(),
        }))
    }
}

/// 对一个 echo 请求回复一次 echo 应答后结束。
#[derive(Debug)]
pub struct EchoResponder {
    request_id: u64,
    reply_to: crate::net::Addr,
    payload: Vec<u8>,
}

impl Context for EchoResponder {
    fn name(&self) -> &str {
        "echo-responder"
    }

    fn step(&mut self) -> Step {
        debug!(request_id = self.request_id, reply_to = %self.reply_to, "回复 echo 请求");
        let reply = Packet::ip(
            self.request_id,
            None,
            self.reply_to,
            IpProto::EchoReply,
            std::mem::take(&mut self.payload),
        );
        Step::finish(vec![reply])
    }
}
