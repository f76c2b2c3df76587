use crate::error::ScenarioError;
use crate::net::{IpProto, PortRef, RouterId, TickAll};
use crate::router::RouterConfig;
use crate::routing::LookupMode;
use crate::sim::{ContextMode, ScenarioSpec, Simulator, Tick};
use crate::topo::build_scenario;

use super::support::ip;

const TWO_ROUTERS: &str = include_str!("../../scenarios/two_routers.json");

fn run(spec: &ScenarioSpec, ticks: u64) -> crate::net::NetWorld {
    let mut sim = Simulator::default();
    let mut world = build_scenario(spec, spec.router_config(), ticks, &mut sim).expect("build");
    sim.schedule(Tick::ZERO, TickAll { remaining: ticks });
    sim.run(&mut world);
    world
}

#[test]
fn scenario_parses_with_defaults() {
    let spec = ScenarioSpec::from_json(TWO_ROUTERS).expect("parse");
    assert_eq!(spec.routers.len(), 2);
    assert_eq!(spec.contexts, ContextMode::Echo);
    let config = spec.router_config();
    assert_eq!(config.input_processing_rate, 8);
    assert_eq!(config.lookup_mode, LookupMode::FirstMatch);
    assert_eq!(config.context_step_budget, None);
    assert_eq!(spec.packets[0].count, 1);
    assert_eq!(spec.packets[1].count, 3);
    assert_eq!(spec.packets[1].proto, IpProto::Data);
}

#[test]
fn scenario_rejects_unknown_schema_version() {
    let raw = r#"{ "schema_version": 9, "routers": [] }"#;
    assert!(matches!(
        ScenarioSpec::from_json(raw),
        Err(ScenarioError::SchemaVersion(9))
    ));
}

#[test]
fn echo_round_trip_across_two_routers() {
    let spec = ScenarioSpec::from_json(TWO_ROUTERS).expect("parse");
    let world = run(&spec, 5);

    let r1 = world.routers.get(RouterId(1)).expect("r1");
    let r2 = world.routers.get(RouterId(2)).expect("r2");

    // r1: echo 请求 + 3 个数据包转发给 r2，应答转发到主机侧，1 个不可达
    assert_eq!(r1.stats.forwarded, 5);
    assert_eq!(r1.stats.dropped_unreachable, 1);
    // r2: 接收 echo 请求，3 个数据包送往主机侧，应答送回 r1
    assert_eq!(r2.stats.accepted, 1);
    assert_eq!(r2.stats.forwarded, 4);
    assert_eq!(r2.stats.contexts_created, 1);
    assert_eq!(r2.stats.contexts_finished, 1);

    let replies: Vec<_> = world
        .exited
        .iter()
        .filter(|(_, p)| p.proto == IpProto::EchoReply)
        .collect();
    assert_eq!(replies.len(), 1);
    let (at, reply) = replies[0];
    assert_eq!(*at, PortRef::new(1, 1));
    assert_eq!(reply.dst, ip("10.0.1.9"));
    assert_eq!(reply.src, Some(ip("10.0.12.2")));
    assert_eq!(reply.payload, b"ping".to_vec());

    let data_out = world
        .exited
        .iter()
        .filter(|(at, p)| *at == PortRef::new(2, 2) && p.proto == IpProto::Data)
        .count();
    assert_eq!(data_out, 3);
    assert_eq!(world.stats.injected, 5);
    assert_eq!(world.stats.exited, 4);
    assert_eq!(world.stats.ticks, 5);
}

#[test]
fn low_rate_delays_but_does_not_lose_packets() {
    let spec = ScenarioSpec::from_json(TWO_ROUTERS).expect("parse");
    let mut sim = Simulator::default();
    let config = RouterConfig {
        input_processing_rate: 1,
        ..spec.router_config()
    };
    let mut world = build_scenario(&spec, config, 20, &mut sim).expect("build");
    sim.schedule(Tick::ZERO, TickAll { remaining: 20 });
    sim.run(&mut world);

    assert_eq!(world.stats.exited, 4);
    assert_eq!(
        world.routers.get(RouterId(1)).expect("r1").stats.dropped_unreachable,
        1
    );
}

#[test]
fn wiring_an_unknown_port_fails() {
    let mut spec = ScenarioSpec::from_json(TWO_ROUTERS).expect("parse");
    spec.wires[0].b = PortRef::new(2, 9);
    let mut sim = Simulator::default();
    assert!(matches!(
        build_scenario(&spec, RouterConfig::default(), 5, &mut sim),
        Err(ScenarioError::UnknownEndpoint { .. })
    ));
}

#[test]
fn wiring_a_port_twice_fails() {
    let mut spec = ScenarioSpec::from_json(TWO_ROUTERS).expect("parse");
    let again = spec.wires[0];
    spec.wires.push(again);
    let mut sim = Simulator::default();
    assert!(matches!(
        build_scenario(&spec, RouterConfig::default(), 5, &mut sim),
        Err(ScenarioError::Router(_))
    ));
}

#[test]
fn without_contexts_echo_requests_are_only_accepted() {
    let mut spec = ScenarioSpec::from_json(TWO_ROUTERS).expect("parse");
    spec.contexts = ContextMode::None;
    let world = run(&spec, 5);

    let r2 = world.routers.get(RouterId(2)).expect("r2");
    assert_eq!(r2.stats.accepted, 1);
    assert_eq!(r2.stats.contexts_created, 0);
    assert!(world.exited.iter().all(|(_, p)| p.proto != IpProto::EchoReply));
}

#[test]
fn packets_scheduled_past_the_last_tick_are_rejected() {
    let spec = ScenarioSpec::from_json(TWO_ROUTERS).expect("parse");
    // 最后一个数据包在 t1 注入，只运行 1 个 tick 时它不会被处理
    let mut sim = Simulator::default();
    assert!(matches!(
        build_scenario(&spec, spec.router_config(), 1, &mut sim),
        Err(ScenarioError::PacketAfterLastTick { at_tick: 1, ticks: 1 })
    ));

    let mut sim = Simulator::default();
    assert!(build_scenario(&spec, spec.router_config(), 2, &mut sim).is_ok());
}
