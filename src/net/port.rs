//! 路由器端口
//!
//! 每个端口有一个在路由器内唯一的编号（从 1 开始）、可选的地址/掩码，
//! 以及输入、输出两个 FIFO 队列。

use std::collections::VecDeque;

use super::addr::{Addr, Mask, is_in_subnet};
use super::id::PortNumber;
use super::packet::Packet;

#[derive(Debug)]
pub struct Port {
    number: PortNumber,
    address: Option<(Addr, Mask)>,
    input: VecDeque<Packet>,
    output: VecDeque<Packet>,
}

impl Port {
    /// 创建一个尚未分配地址的端口
    pub fn new(number: PortNumber) -> Self {
        Self {
            number,
            address: None,
            input: VecDeque::new(),
            output: VecDeque::new(),
        }
    }

    pub fn with_address(number: PortNumber, addr: Addr, mask: Mask) -> Self {
        let mut port = Self::new(number);
        port.set_address(addr, mask);
        port
    }

    pub fn number(&self) -> PortNumber {
        self.number
    }

    pub fn addr(&self) -> Option<Addr> {
        self.address.map(|(addr, _)| addr)
    }

    pub fn mask(&self) -> Option<Mask> {
        self.address.map(|(_, mask)| mask)
    }

    pub fn address(&self) -> Option<(Addr, Mask)> {
        self.address
    }

    pub fn set_address(&mut self, addr: Addr, mask: Mask) {
        self.address = Some((addr, mask));
    }

    /// `addr` 是否落在本端口所连的子网内；未分配地址的端口不包含任何地址。
    pub fn contains(&self, addr: Addr) -> bool {
        match self.address {
            Some((own, mask)) => is_in_subnet(addr, own, mask),
            None => false,
        }
    }

    pub fn has_input(&self) -> bool {
        !self.input.is_empty()
    }

    /// 从链路侧收到一个数据包
    pub fn receive(&mut self, pkt: Packet) {
        self.input.push_back(pkt);
    }

    pub fn poll_input(&mut self) -> Option<Packet> {
        self.input.pop_front()
    }

    /// 把数据包放入输出队列
    pub fn push(&mut self, pkt: Packet) {
        self.output.push_back(pkt);
    }

    pub fn pop_output(&mut self) -> Option<Packet> {
        self.output.pop_front()
    }

    pub fn drain_output(&mut self) -> Vec<Packet> {
        self.output.drain(..).collect()
    }

    pub fn input_len(&self) -> usize {
        self.input.len()
    }

    pub fn output_len(&self) -> usize {
        self.output.len()
    }
}
