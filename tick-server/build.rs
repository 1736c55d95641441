//! Build identification for tick-server
//!
//! Exposes `GIT_HASH`, `BUILD_TIMESTAMP` and `BUILD_PROFILE` to the crate via
//! `env!`. They are logged at startup and served from `GET /build_info`.

use std::path::Path;
use std::process::Command;

const UNKNOWN: &str = "unknown";

fn main() {
    let workspace_root = Path::new(env!("CARGO_MANIFEST_DIR")).join("..");

    export("GIT_HASH", &git_short_hash(&workspace_root));
    export(
        "BUILD_TIMESTAMP",
        &chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
    );
    export(
        "BUILD_PROFILE",
        &std::env::var("PROFILE").unwrap_or_else(|_| UNKNOWN.to_string()),
    );

    // Re-stamp when HEAD moves; outside a git checkout these paths are absent
    // and cargo reruns the script on every build instead.
    let git_dir = workspace_root.join(".git");
    println!("cargo:rerun-if-changed={}", git_dir.join("HEAD").display());
    println!("cargo:rerun-if-changed={}", git_dir.join("refs").display());
}

/// Eight-character commit hash, with a `-dirty` suffix for modified trees
fn git_short_hash(root: &Path) -> String {
    let Some(hash) = git(root, &["rev-parse", "--short=8", "HEAD"]) else {
        return UNKNOWN.to_string();
    };
    match git(root, &["status", "--porcelain", "--untracked-files=no"]) {
        Some(changes) if !changes.is_empty() => format!("{}-dirty", hash),
        _ => hash,
    }
}

fn git(root: &Path, args: &[&str]) -> Option<String> {
    let output = Command::new("git").current_dir(root).args(args).output().ok()?;
    if !output.status.success() {
        return None;
    }
    String::from_utf8(output.stdout).ok().map(|s| s.trim().to_string())
}

fn export(key: &str, value: &str) {
    println!("cargo:rustc-env={}={}", key, value);
}
