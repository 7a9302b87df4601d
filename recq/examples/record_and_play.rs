//! 录制与回放演示
//!
//! 录制 5 秒的指针和键盘输入，保存到临时目录，再以 2 倍速回放一次
//!
//! 运行: cargo run --example record_and_play
//!
//! 注意: 需要 X11 会话；回放会真实移动指针和按键，回放期间按 Ctrl 可中止

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc::UnboundedReceiver;

use recq_lib::host::default_backend;
use recq_lib::playback::LoopCount;
use recq_lib::session::{MacroSession, SessionEvent};
use recq_lib::state::{ConfigStore, SessionState};
use recq_lib::utils::logging::init_logging;

fn main() -> anyhow::Result<()> {
    init_logging();

    println!("=== 录制与回放演示 ===\n");

    let workdir = std::env::temp_dir().join("recq-demo");
    std::fs::create_dir_all(&workdir)?;
    let store = Arc::new(ConfigStore::open(workdir.join("config.json")));
    let (mut session, mut events) = MacroSession::new(default_backend(), store);
    let mut states = session.subscribe_state();

    // 1. 录制
    println!("1. 录制 5 秒，请移动鼠标、点击或按键");
    println!("{}", "-".repeat(40));
    if !session.start_recording() {
        anyhow::bail!("无法开始录制");
    }
    std::thread::sleep(Duration::from_secs(5));
    let count = session.stop_recording();
    println!("  录制事件数: {}", count);
    drain(&mut events, &mut states);

    if !session.can_play() {
        println!("\n没有录到事件，结束");
        return Ok(());
    }

    // 2. 保存并重新加载
    println!("\n2. 保存并重新加载");
    println!("{}", "-".repeat(40));
    let path = workdir.join("demo");
    if session.save(&path) {
        let loaded = session.load(path.with_extension("recq"));
        println!("  加载事件数: {}", loaded);
    }
    drain(&mut events, &mut states);

    // 3. 回放
    println!("\n3. 以 2 倍速回放");
    println!("{}", "-".repeat(40));
    session.start_playback(2.0, LoopCount::times(1));
    let outcome = session.wait_playback();
    println!("  回放结果: {:?}", outcome);
    drain(&mut events, &mut states);

    session.shutdown();
    println!("\n=== 演示完成 ===");
    Ok(())
}

fn drain(
    events: &mut UnboundedReceiver<SessionEvent>,
    states: &mut UnboundedReceiver<SessionState>,
) {
    while let Ok(state) = states.try_recv() {
        println!("  [会话] {}", state.name());
    }
    while let Ok(event) = events.try_recv() {
        if let SessionEvent::Status { message, .. } = event {
            println!("  [状态] {}", message);
        }
    }
}
