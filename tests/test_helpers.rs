use assert_cmd::Command;
use std::path::Path;

/// Nothing listens on the discard port, so every model call fails fast.
pub const UNREACHABLE_OLLAMA_URL: &str = "http://127.0.0.1:9";

/// Creates a `Command` for the `mindwell` binary with a clean environment,
/// the in-memory store and an unreachable model server.
pub fn base_mindwell_command(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("mindwell").expect("mindwell binary not built");
    cmd.env_clear();
    if let Ok(path) = std::env::var("PATH") {
        cmd.env("PATH", path);
    }
    cmd.env("HOME", home)
        .env("MINDWELL_STORE", "memory")
        .env("MINDWELL_OLLAMA_URL", UNREACHABLE_OLLAMA_URL)
        .env("MINDWELL_TIMEOUT_SECS", "2");
    cmd
}

/// Same as [`base_mindwell_command`] but backed by a SQLite file under `home`.
pub fn sqlite_mindwell_command(home: &Path) -> Command {
    let mut cmd = base_mindwell_command(home);
    cmd.env("MINDWELL_STORE", "sqlite")
        .env("MINDWELL_DB", home.join("data").join("mindwell.db"));
    cmd
}
