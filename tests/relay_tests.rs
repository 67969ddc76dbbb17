//! Relay tests against a live Control API on a local port

mod common;

use std::time::Duration;

use axum::{routing::get, Router};
use tokio::net::TcpListener;
use vmi_supervisor::config::RelayConfig;
use vmi_supervisor::error::SupervisorError;
use vmi_supervisor::telemetry::{bus, Relay};

const STATS_FRAME: &str = "IP2VFSTATS ID_:7;NAM:cam7;FPS:29.7;FRM:120;USE:10;KER:2;MEM:4096";
const INFO_FRAME: &str =
    "IP2VFINFOS ID_:5;NAM:cam5;MTN:6005;STA:1700000000;PID:0;PTY:tcp;PDI:1;PFS:4096";

/// Thumbnail server that only has a still frame for module 5
async fn spawn_thumbnail_server() -> u16 {
    let app = Router::new().route("/ip2vf3/5_frame.png", get(|| async { "png" }));
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    port
}

fn relay_config(registry: std::net::SocketAddr, thumb_port: u16) -> RelayConfig {
    RelayConfig::new(
        common::free_port(),
        registry.to_string(),
        "127.0.0.1",
        "10.0.0.9",
    )
    .thumb_port(thumb_port)
    .probe_timeout(Duration::from_millis(500))
}

#[tokio::test]
async fn test_stats_frame_reaches_registry() {
    let (state, registry, _) = common::test_state();
    let addr = common::spawn_api(state).await;
    let relay = Relay::new(relay_config(addr, common::free_port())).unwrap();

    relay.handle_frame(STATS_FRAME).await.unwrap();

    let module = registry.get(7).await.unwrap();
    assert_eq!(module.stats.fps, 29.7);
    assert_eq!(module.stats.frame_count, 120);
    assert_eq!(module.stats.memory, 4096);
    assert!(module.last_seen > 0);
}

#[tokio::test]
async fn test_info_frame_gets_ip_and_thumbnail() {
    let (state, registry, _) = common::test_state();
    let addr = common::spawn_api(state).await;
    let thumb_port = spawn_thumbnail_server().await;
    let relay = Relay::new(relay_config(addr, thumb_port)).unwrap();

    relay.handle_frame(INFO_FRAME).await.unwrap();

    let module = registry.get(5).await.unwrap();
    assert_eq!(module.name, "cam5");
    assert_eq!(module.control_port, 6005);
    assert_eq!(module.ip, "127.0.0.1");
    assert_eq!(module.thumbnail_url, "http://10.0.0.9/ip2vf3/5_frame.png");
    assert_eq!(module.pins[&0].direction, 1);
}

#[tokio::test]
async fn test_info_frame_without_still_frame() {
    let (state, registry, _) = common::test_state();
    let addr = common::spawn_api(state).await;
    let thumb_port = spawn_thumbnail_server().await;
    let relay = Relay::new(relay_config(addr, thumb_port)).unwrap();

    let frame = INFO_FRAME.replace("ID_:5", "ID_:6");
    relay.handle_frame(&frame).await.unwrap();

    let module = registry.get(6).await.unwrap();
    assert_eq!(module.ip, "127.0.0.1");
    assert_eq!(module.thumbnail_url, "");
}

#[tokio::test]
async fn test_slashes_in_values_reach_registry_intact() {
    let (state, registry, _) = common::test_state();
    let addr = common::spawn_api(state).await;
    let relay = Relay::new(relay_config(addr, common::free_port())).unwrap();

    let frame = INFO_FRAME
        .replace("NAM:cam5", "NAM:cam/5")
        .replace("PTY:tcp", "PTY:rtp/udp");
    relay.handle_frame(&frame).await.unwrap();

    let frame = INFO_FRAME
        .replace("ID_:5", "ID_:6")
        .replace("NAM:cam5", "NAM:a/b/c");
    relay.handle_frame(&frame).await.unwrap();

    let module = registry.get(5).await.unwrap();
    assert_eq!(module.name, "cam/5");
    assert_eq!(module.pins[&0].pin_type, "rtp/udp");
    assert_eq!(registry.get(6).await.unwrap().name, "a/b/c");
}

#[tokio::test]
async fn test_unrecognized_frames_never_reach_registry() {
    let (state, registry, _) = common::test_state();
    let addr = common::spawn_api(state).await;
    let relay = Relay::new(relay_config(addr, common::free_port())).unwrap();

    for raw in ["IP2VFHELLO ID_:1", "IP2VF ID_=1;FPS=25", "IP2VFSTATS NAM:cam"] {
        let err = relay.handle_frame(raw).await.unwrap_err();
        assert!(matches!(err, SupervisorError::MalformedFrame(_)), "{}", raw);
    }
    assert!(registry.is_empty().await);
}

// Multi-threaded so the relay keeps draining while the context shuts down
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_bus_to_registry() {
    let (state, registry, _) = common::test_state();
    let addr = common::spawn_api(state).await;
    let config = relay_config(addr, common::free_port());
    let endpoint = config.bus_endpoint();

    let context = zmq::Context::new();
    let frames = bus::subscribe(&context, &endpoint, &config.topic).unwrap();
    let relay = Relay::new(config).unwrap();
    tokio::spawn(async move { relay.run(frames).await });

    let publisher = context.socket(zmq::PUB).unwrap();
    publisher.set_linger(0).unwrap();
    publisher.connect(&endpoint).unwrap();

    // The subscription takes a moment to propagate; keep announcing
    let mut delivered = false;
    for _ in 0..100 {
        publisher.send("IP2VFNOISE ID_:1", 0).unwrap();
        publisher.send("UNRELATED ID_:2", 0).unwrap();
        publisher.send(STATS_FRAME, 0).unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;
        if registry.get(7).await.is_ok() {
            delivered = true;
            break;
        }
    }

    assert!(delivered, "stats frame never reached the registry");
    assert_eq!(registry.len().await, 1);
    drop(publisher);
    drop(context);
}
