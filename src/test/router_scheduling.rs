use crate::net::PortNumber;
use crate::router::{Router, RouterConfig};

use super::support::{pkt, three_port_router};

/// 按给定深度向各端口输入队列放入数据包（目的地不可达，处理后直接丢弃）。
fn fill(router: &mut Router, depths: &[usize]) {
    let mut id = 0;
    for (idx, &depth) in depths.iter().enumerate() {
        let port = router
            .get_port_mut(PortNumber::from_index(idx))
            .expect("port exists");
        for _ in 0..depth {
            port.receive(pkt(id, None, "192.168.0.1"));
            id += 1;
        }
    }
}

fn numbers(ns: &[u32]) -> Vec<PortNumber> {
    ns.iter().copied().map(PortNumber).collect()
}

#[test]
fn round_robin_skips_empty_ports_and_wraps() {
    let mut r = three_port_router(RouterConfig::default());
    r.initialize_running_routes().expect("init");
    fill(&mut r, &[3, 0, 1]);

    let served = r.process_input_traffic(4);

    assert_eq!(served, numbers(&[1, 3, 1, 1]));
    assert_eq!(r.stats.drained, 4);
    assert!(r.ports().iter().all(|p| !p.has_input()));
}

#[test]
fn every_nonempty_port_is_served_once_before_any_second_time() {
    let mut r = three_port_router(RouterConfig::default());
    r.initialize_running_routes().expect("init");
    fill(&mut r, &[2, 1, 2]);

    let served = r.process_input_traffic(10);

    assert_eq!(served, numbers(&[1, 2, 3, 1, 3]));
}

#[test]
fn rate_budget_stops_draining_mid_rotation() {
    let mut r = three_port_router(RouterConfig::default());
    r.initialize_running_routes().expect("init");
    fill(&mut r, &[2, 2, 0]);

    let served = r.process_input_traffic(3);

    assert_eq!(served, numbers(&[1, 2, 1]));
    assert_eq!(r.get_port(PortNumber(1)).expect("port").input_len(), 0);
    assert_eq!(r.get_port(PortNumber(2)).expect("port").input_len(), 1);

    // 下一个 tick 从头开始轮转
    let served = r.process_input_traffic(3);
    assert_eq!(served, numbers(&[2]));
}

#[test]
fn no_input_or_zero_rate_drains_nothing() {
    let mut r = three_port_router(RouterConfig::default());
    r.initialize_running_routes().expect("init");
    assert!(r.process_input_traffic(8).is_empty());

    fill(&mut r, &[1, 1, 1]);
    assert!(r.process_input_traffic(0).is_empty());
    assert_eq!(r.stats.drained, 0);
}

#[test]
fn tick_uses_configured_input_processing_rate() {
    let config = RouterConfig {
        input_processing_rate: 2,
        ..RouterConfig::default()
    };
    let mut r = three_port_router(config);
    r.initialize_running_routes().expect("init");
    fill(&mut r, &[1, 1, 1]);

    let report = r.tick();
    assert_eq!(report.drained, 2);
    assert_eq!(r.get_port(PortNumber(3)).expect("port").input_len(), 1);

    let report = r.tick();
    assert_eq!(report.drained, 1);
    assert_eq!(r.stats.dropped_unreachable, 3);
}
