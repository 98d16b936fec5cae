//! Simulated playback example.
//!
//! Plays a mock source that drops its right channel halfway through, then
//! recovers. Watch the routing flip to mono and back.
//!
//! Run with: cargo run --example simulate
//! More detail: MONO_FIX_LOG=2 cargo run --example simulate

use std::sync::Arc;
use std::time::Duration;

use mono_fix::{Engine, EngineConfig, EngineEvent, MediaSource, MockSource, OfflineBackend};

/// Frames per rendered block (10ms at 48kHz).
const BLOCK_FRAMES: usize = 480;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let log_level = std::env::var("MONO_FIX_LOG")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(1);
    let config = EngineConfig {
        log_level,
        ..EngineConfig::default()
    };

    tracing_subscriber::fmt()
        .with_max_level(config.level_filter())
        .init();

    let engine = Engine::builder()
        .backend(OfflineBackend::new())
        .config(config)
        .on_event(|event| match event {
            EngineEvent::ModeChanged { source_id, mode } => {
                println!("[{source_id}] routing -> {mode}");
            }
            other => println!("{other:?}"),
        })
        .build()?;

    let player = Arc::new(MockSource::new("player-1"));
    engine.on_source_added(player.clone())?;
    player.play();

    // Three phases of two seconds each: stereo, one-ear, stereo again
    let phases = [(0.5, 0.5), (0.5, 0.0), (0.4, 0.5)];
    for (left, right) in phases {
        println!("-- playing L={left} R={right}");
        for _ in 0..200 {
            let mut block = player.sine_block(440.0, BLOCK_FRAMES, left, right);
            player.render(&mut block);
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        println!("   status: {}", engine.status().label);
    }

    player.pause();
    engine.on_source_removed(&player.id());
    Ok(())
}
