//! 路由器统计信息

/// 路由器统计信息
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RouterStats {
    /// 从端口输入队列取出的数据包
    pub drained: u64,
    pub forwarded: u64,
    pub accepted: u64,
    pub dropped_unreachable: u64,
    /// 路由表项存在但找不到出端口
    pub dropped_inconsistent: u64,
    /// 非 IP 数据单元
    pub ignored: u64,
    pub contexts_created: u64,
    pub contexts_finished: u64,
    /// 超出步数预算而被终止
    pub contexts_expired: u64,
}

/// 单个 tick 的处理结果
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TickReport {
    pub drained: usize,
    pub contexts_stepped: usize,
}
