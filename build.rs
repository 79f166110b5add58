fn main() {
    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/index");

    let git = std::process::Command::new("git")
        .args(["describe", "--always", "--dirty"])
        .output()
        .ok()
        .filter(|o| o.status.success())
        .map(|o| String::from_utf8_lossy(&o.stdout).trim().to_string());

    let pkg = env!("CARGO_PKG_VERSION");
    let version = match git {
        Some(rev) if !rev.is_empty() => format!("{} {}", pkg, rev),
        _ => pkg.to_string(),
    };

    println!("cargo:rustc-env=GIT_VERSION={}", version);
}
