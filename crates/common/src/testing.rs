use std::{
    path::PathBuf,
    sync::atomic::{AtomicU64, Ordering},
};

static NEXT_DIR: AtomicU64 = AtomicU64::new(0);

/// Debug logs of the workspace crates on stderr, for tests. Safe to call from
/// every test
pub fn init_logger() {
    let config = simplelog::ConfigBuilder::new()
        .add_filter_ignore_str("tokio")
        .set_time_level(log::LevelFilter::Off)
        .build();
    let _ = simplelog::TermLogger::init(
        log::LevelFilter::Debug,
        config,
        simplelog::TerminalMode::Stderr,
        simplelog::ColorChoice::Never,
    );
}

/// Fresh, not yet created directory under `base`. Tests run in parallel and
/// can read the clock at the same nanosecond, so a counter is appended
pub fn test_dir(base: &str) -> PathBuf {
    let mut id = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or_default();
    let seq = NEXT_DIR.fetch_add(1, Ordering::Relaxed);

    let mut dir = PathBuf::from(format!("{base}/{id}-{seq}"));
    while dir.exists() {
        id += 1;
        dir = PathBuf::from(format!("{base}/{id}-{seq}"));
    }
    dir
}
