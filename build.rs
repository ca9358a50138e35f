//! Build script for cname-preflight.
//!
//! Embeds git commit and build date so `--version` can identify exactly
//! which build produced a validation report.

use std::process::Command;

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    if let Some(hash) = get_git_hash() {
        println!("cargo:rustc-env=CNAME_PREFLIGHT_GIT_HASH={}", hash);
    }

    if let Some(date) = get_build_date() {
        println!("cargo:rustc-env=CNAME_PREFLIGHT_BUILD_DATE={}", date);
    }
}

/// Get the current git commit hash (short form)
fn get_git_hash() -> Option<String> {
    Command::new("git")
        .args(["rev-parse", "--short", "HEAD"])
        .output()
        .ok()
        .and_then(|output| {
            if output.status.success() {
                String::from_utf8(output.stdout)
                    .ok()
                    .map(|s| s.trim().to_string())
            } else {
                None
            }
        })
}

/// Get the current build date in ISO 8601 format
fn get_build_date() -> Option<String> {
    Command::new("date")
        .args(["-u", "+%Y-%m-%dT%H:%M:%SZ"])
        .output()
        .ok()
        .and_then(|output| {
            if output.status.success() {
                String::from_utf8(output.stdout)
                    .ok()
                    .map(|s| s.trim().to_string())
            } else {
                None
            }
        })
}
