use std::fs;
use std::path::PathBuf;
use std::process::Command;
use std::time::{SystemTime, UNIX_EPOCH};

fn unique_temp_dir(prefix: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("time went backwards")
        .as_nanos();
    let dir = std::env::temp_dir().join(format!(
        "routesim-rs-{prefix}-{}-{nanos}",
        std::process::id()
    ));
    fs::create_dir_all(&dir).expect("create temp dir");
    dir
}

fn write_file(dir: &PathBuf, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).expect("write temp file");
    path
}

fn router_line<'a>(stdout: &'a str, id: u64) -> &'a str {
    let prefix = format!("router id={id} ");
    stdout
        .lines()
        .find(|line| line.starts_with(&prefix))
        .unwrap_or_else(|| panic!("missing router line for {id}: {stdout}"))
}

const SINGLE_ROUTER: &str = r#"
{
    "schema_version": 1,
    "routers": [
        {
            "id": 1,
            "name": "edge",
            "ports": [
                { "number": 1, "address": "10.0.1.1", "mask": "255.255.255.0" },
                { "number": 2, "address": "10.0.2.1", "mask": "255.255.255.0" },
                { "number": 3, "address": "10.1.0.1", "mask": "/16" }
            ],
            "static_routes": [ { "network": "10.1.2.0", "mask": "/24", "via": "10.0.2.9" } ]
        }
    ],
    "packets": [
        { "at": { "router": 1, "port": 1 }, "dst": "10.1.2.3" },
        { "at": { "router": 1, "port": 1 }, "dst": "172.16.0.1" },
        { "at": { "router": 1, "port": 2 }, "src": "10.0.2.7", "dst": "10.0.1.1", "proto": "echo_request" }
    ]
}
"#;

#[test]
fn router_sim_prints_router_stats_and_exits() {
    let dir = unique_temp_dir("router-sim-stats");
    let scenario = write_file(&dir, "scenario.json", SINGLE_ROUTER);

    let output = Command::new(env!("CARGO_BIN_EXE_router_sim"))
        .args(["--scenario", scenario.to_str().unwrap(), "--ticks", "3"])
        .output()
        .expect("run router_sim");
    assert!(
        output.status.success(),
        "router_sim failed: stderr={}",
        String::from_utf8_lossy(&output.stderr)
    );

    let stdout = String::from_utf8_lossy(&output.stdout);
    let line = router_line(&stdout, 1);
    assert!(line.contains("name=edge"), "{line}");
    // 静态路由优先匹配 + echo 应答 = 2 次转发
    assert!(line.contains("forwarded=2"), "{line}");
    assert!(line.contains("accepted=1"), "{line}");
    assert!(line.contains("unreachable=1"), "{line}");
    assert!(line.contains("contexts_created=1"), "{line}");
    assert!(line.contains("contexts_finished=1"), "{line}");

    let exited: Vec<&str> = stdout.lines().filter(|l| l.starts_with("exited ")).collect();
    assert_eq!(exited.len(), 2, "{stdout}");
    assert!(
        exited
            .iter()
            .any(|l| l.contains("at=r1/port2") && l.contains("dst=10.1.2.3")),
        "first-match should pick the static route via port2: {stdout}"
    );
    assert!(
        exited
            .iter()
            .any(|l| l.contains("dst=10.0.2.7") && l.contains("proto=EchoReply")),
        "{stdout}"
    );
    assert!(
        stdout.lines().last().is_some_and(|l| l.starts_with("done @ t")),
        "{stdout}"
    );

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn router_sim_lookup_mode_flag_switches_to_longest_prefix() {
    let dir = unique_temp_dir("router-sim-lpm");
    let scenario = write_file(&dir, "scenario.json", SINGLE_ROUTER);

    let output = Command::new(env!("CARGO_BIN_EXE_router_sim"))
        .args([
            "--scenario",
            scenario.to_str().unwrap(),
            "--ticks",
            "3",
            "--lookup-mode",
            "longest-prefix",
        ])
        .output()
        .expect("run router_sim");
    assert!(
        output.status.success(),
        "router_sim failed: stderr={}",
        String::from_utf8_lossy(&output.stderr)
    );

    let stdout = String::from_utf8_lossy(&output.stdout);
    // /24 静态路由与 /16 直连路由同时匹配，最长前缀仍选静态路由
    assert!(
        stdout
            .lines()
            .any(|l| l.starts_with("exited at=r1/port2") && l.contains("dst=10.1.2.3")),
        "{stdout}"
    );

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn router_sim_rejects_unknown_schema_version() {
    let dir = unique_temp_dir("router-sim-schema");
    let scenario = write_file(&dir, "scenario.json", r#"{ "schema_version": 7, "routers": [] }"#);

    let output = Command::new(env!("CARGO_BIN_EXE_router_sim"))
        .args(["--scenario", scenario.to_str().unwrap()])
        .output()
        .expect("run router_sim");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("router_sim:"), "stderr={stderr}");

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn router_sim_rejects_packets_scheduled_after_the_last_tick() {
    let dir = unique_temp_dir("router-sim-late");
    let scenario = write_file(
        &dir,
        "scenario.json",
        r#"
{
    "schema_version": 1,
    "routers": [
        {
            "id": 1,
            "ports": [ { "number": 1, "address": "10.0.1.1", "mask": "/24" } ]
        }
    ],
    "packets": [
        { "at_tick": 5, "at": { "router": 1, "port": 1 }, "src": "10.0.1.9", "dst": "10.0.1.1", "proto": "echo_request" }
    ]
}
        "#,
    );

    let output = Command::new(env!("CARGO_BIN_EXE_router_sim"))
        .args(["--scenario", scenario.to_str().unwrap(), "--ticks", "2"])
        .output()
        .expect("run router_sim");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("tick 5"), "stderr={stderr}");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(!stdout.contains("done @"), "stdout={stdout}");

    let _ = fs::remove_dir_all(&dir);
}
