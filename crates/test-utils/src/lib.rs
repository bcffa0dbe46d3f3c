use std::{fs, io, path::Path};

use include_dir::{include_dir, Dir};
pub use tracing::Level;
use tracing::{
    level_filters::LevelFilter,
    subscriber::{set_default, DefaultGuard},
    Subscriber,
};
use tracing_subscriber::{layer::SubscriberExt, EnvFilter};
use tracing_tree::HierarchicalLayer;

const FIXTURES: Dir = include_dir!("$CARGO_MANIFEST_DIR/fixtures");

pub fn setup_tracing_with_filter(filter: &str) -> DefaultGuard {
    let subscriber = default_subscriber().with(EnvFilter::new(filter));
    set_default(subscriber)
}

pub fn setup_tracing(level: Level) -> DefaultGuard {
    let subscriber = default_subscriber().with(LevelFilter::from_level(level));
    set_default(subscriber)
}

fn default_subscriber() -> impl Subscriber + Send + Sync {
    tracing_subscriber::registry().with(
        HierarchicalLayer::new(2)
            .with_targets(true)
            .with_thread_ids(true)
            .with_indent_lines(true)
            .with_bracketed_fields(true)
            .with_ansi(false)
            .with_writer(std::io::stderr),
    )
}

pub fn fixture(path: &str) -> &'static str {
    FIXTURES
        .get_file(path)
        .unwrap_or_else(|| panic!("bad fixture file path {}", path))
        .contents_utf8()
        .expect("fixture file isn't utf8")
}

/// Copies the fixture directory `path` into a fresh temporary directory, for
/// tools that resolve imports from the file system.
pub fn fixture_dir_on_disk(path: &str) -> io::Result<tempfile::TempDir> {
    let dir = FIXTURES
        .get_dir(path)
        .unwrap_or_else(|| panic!("no fixture dir named \"{}\"", path));
    let root = tempfile::tempdir()?;
    write_dir(dir, Path::new(path), root.path())?;
    Ok(root)
}

fn write_dir(dir: &Dir, prefix: &Path, dest: &Path) -> io::Result<()> {
    for file in dir.files() {
        let relative = file.path().strip_prefix(prefix).unwrap_or(file.path());
        let target = dest.join(relative);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(target, file.contents())?;
    }

    for sub_dir in dir.dirs() {
        write_dir(sub_dir, prefix, dest)?;
    }

    Ok(())
}
