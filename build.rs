// EcoWatch - GPL-3.0-or-later
// Build script to embed the git revision into the binaries

use std::process::Command;

fn git(args: &[&str]) -> Option<String> {
    let output = Command::new("git").args(args).output().ok()?;
    if output.status.success() {
        String::from_utf8(output.stdout).ok()
    } else {
        None
    }
}

fn main() {
    let revision = git(&["rev-parse", "--short", "HEAD"])
        .map(|s| s.trim().to_string())
        .unwrap_or_else(|| "unknown".to_string());

    let dirty = git(&["status", "--porcelain"]).is_some_and(|s| !s.trim().is_empty());

    let revision = if dirty {
        format!("{revision}-dirty")
    } else {
        revision
    };

    println!("cargo:rustc-env=ECOWATCH_REVISION={revision}");

    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/index");
}
