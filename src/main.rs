//! TETRS engine demo
//!
//! Plays one session headlessly with the placement bot at a fixed 60 Hz
//! tick and prints the final snapshot as JSON.

use std::io::{self, Write};
use tetrs_engine::{autoplay, Session, SessionConfig, Settings};

/// Fixed simulation step
const FRAME_DT: f32 = 1.0 / 60.0;

/// Give up after this many frames (an hour of play)
const MAX_FRAMES: u32 = 60 * 60 * 60;

/// Get the temp directory for logs, creating it if needed
fn temp_dir() -> std::path::PathBuf {
    let dir = std::env::temp_dir().join("tetrs-engine");
    let _ = std::fs::create_dir_all(&dir);
    dir
}

fn main() -> io::Result<()> {
    let run_id: u32 = rand::random();

    let log_dir = temp_dir();
    let log_file = format!("{:08x}.log", run_id);

    let file_appender = tracing_appender::rolling::never(&log_dir, &log_file);
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("tetrs_engine=debug"));
    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_env_filter(filter)
        .with_ansi(false)
        .init();

    tracing::info!("Demo starting, run={:08x}, log={}", run_id, log_dir.join(&log_file).display());

    let mut settings = Settings::load();
    let mut session = Session::new(SessionConfig::from(&settings));

    let mut frames = 0;
    let mut snapshot = session.snapshot();
    while !snapshot.game_over && frames < MAX_FRAMES {
        let intents = autoplay::plan(session.board(), session.current());
        snapshot = session.advance(FRAME_DT, &intents);
        frames += 1;
    }
    tracing::info!(
        "Demo finished after {} frames: score={}, lines={}, level={}",
        frames,
        snapshot.score.points,
        snapshot.score.lines,
        snapshot.score.level
    );

    if settings.record_high_score(snapshot.score.points) {
        if let Err(e) = settings.save() {
            eprintln!("Warning: Could not save settings: {}", e);
        }
    }

    let json = serde_json::to_string_pretty(&snapshot).map_err(io::Error::other)?;
    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{}", json)?;

    Ok(())
}
