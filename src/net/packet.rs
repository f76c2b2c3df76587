//! 数据包类型
//!
//! 定义在端口之间交换的数据单元。路由器只处理 IP 类型的数据单元。

use serde::{Deserialize, Serialize};

use super::addr::Addr;

/// 数据单元类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataUnitKind {
    Ip,
    /// 非 IP 的数据单元；路由器收到后直接忽略
    Raw,
}

/// IP 层协议标记
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IpProto {
    #[default]
    Data,
    EchoRequest,
    EchoReply,
}

/// 网络数据包
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    pub id: u64,
    pub kind: DataUnitKind,
    /// 源地址；为空时由出端口补上
    pub src: Option<Addr>,
    pub dst: Addr,
    pub proto: IpProto,
    pub payload: Vec<u8>,
}

impl Packet {
    /// 创建 IP 数据包
    pub fn ip(id: u64, src: Option<Addr>, dst: Addr, proto: IpProto, payload: impl Into<Vec<u8>>) -> Self {
        Self {
            id,
            kind: DataUnitKind::Ip,
            src,
            dst,
            proto,
            payload: payload.into(),
        }
    }

    /// 创建非 IP 数据单元
    pub fn raw(id: u64, dst: Addr, payload: impl Into<Vec<u8>>) -> Self {
        Self {
            id,
            kind: DataUnitKind::Raw,
            src: None,
            dst,
            proto: IpProto::Data,
            payload: payload.into(),
        }
    }

    pub fn is_ip(&self) -> bool {
        self.kind == DataUnitKind::Ip
    }
}
