//! 路由器转发仿真
//!
//! 从 JSON 场景加载路由器与连线，按 tick 推进并打印每个路由器的统计信息。

use std::path::PathBuf;

use clap::Parser;
use routesim_rs::error::ScenarioError;
use routesim_rs::net::TickAll;
use routesim_rs::routing::LookupMode;
use routesim_rs::sim::{ScenarioSpec, Simulator, Tick};
use routesim_rs::topo::build_scenario;

#[derive(Debug, Parser)]
#[command(name = "router_sim", about = "路由器转发仿真：按 tick 推进场景中的所有路由器")]
struct Args {
    /// 场景 JSON 文件
    #[arg(long)]
    scenario: PathBuf,
    /// 仿真运行多少个 tick
    #[arg(long, default_value_t = 20)]
    ticks: u64,
    /// 覆盖每个 tick 的输入处理速率
    #[arg(long)]
    rate: Option<usize>,
    /// 覆盖路由查找策略
    #[arg(long, value_enum)]
    lookup_mode: Option<LookupMode>,
    /// 覆盖上下文步数预算
    #[arg(long)]
    step_budget: Option<u32>,
}

fn run(args: Args) -> Result<(), ScenarioError> {
    let spec = ScenarioSpec::from_path(&args.scenario)?;

    let mut config = spec.router_config();
    if let Some(rate) = args.rate {
        config.input_processing_rate = rate;
    }
    if let Some(mode) = args.lookup_mode {
        config.lookup_mode = mode;
    }
    if args.step_budget.is_some() {
        config.context_step_budget = args.step_budget;
    }

    let mut sim = Simulator::default();
    let mut world = build_scenario(&spec, config, args.ticks, &mut sim)?;
    sim.schedule(Tick::ZERO, TickAll { remaining: args.ticks });
    sim.run(&mut world);

    for id in world.routers.ids() {
        let Some(router) = world.routers.get(id) else {
            continue;
        };
        let s = &router.stats;
        println!(
            "router id={} name={} drained={} forwarded={} accepted={} unreachable={} inconsistent={} ignored={} contexts_created={} contexts_finished={} contexts_expired={}",
            id.0,
            router.name(),
            s.drained,
            s.forwarded,
            s.accepted,
            s.dropped_unreachable,
            s.dropped_inconsistent,
            s.ignored,
            s.contexts_created,
            s.contexts_finished,
            s.contexts_expired,
        );
    }
    for (from, pkt) in &world.exited {
        println!(
            "exited at={} pkt_id={} src={} dst={} proto={:?}",
            from,
            pkt.id,
            pkt.src.map(|a| a.to_string()).unwrap_or_else(|| "-".to_string()),
            pkt.dst,
            pkt.proto
        );
    }
    println!(
        "done @ {}, ticks={}, injected={}, moved={}, exited={}",
        sim.now(),
        world.stats.ticks,
        world.stats.injected,
        world.stats.moved,
        world.stats.exited
    );
    Ok(())
}

fn main() {
    // 初始化 tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_file(true)
        .with_line_number(true)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    if let Err(e) = run(args) {
        eprintln!("router_sim: {e}");
        std::process::exit(1);
    }
}
