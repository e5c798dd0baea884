use std::env;
use std::process::Command;

// APP_VERSION_DISPLAY: the package version, with a -dev suffix unless the
// checkout sits exactly on its release tag. Release builds skip git.
fn main() {
    let version = env::var("CARGO_PKG_VERSION").unwrap_or_else(|_| "0.0.0".to_string());
    let release = env::var("PROFILE").is_ok_and(|profile| profile == "release");

    let display = if release || on_release_tag(&version) {
        version
    } else {
        format!("{version}-dev")
    };
    println!("cargo:rustc-env=APP_VERSION_DISPLAY={display}");
}

fn on_release_tag(version: &str) -> bool {
    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/refs/tags");
    Command::new("git")
        .args(["describe", "--tags", "--exact-match"])
        .output()
        .ok()
        .filter(|output| output.status.success())
        .and_then(|output| String::from_utf8(output.stdout).ok())
        .is_some_and(|tag| tag.trim() == format!("v{version}"))
}
