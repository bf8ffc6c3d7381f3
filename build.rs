//! Build script for Bloom
//!
//! Bumps the local build counter and exposes it, with the compile time, to the crate.

use std::fs;
use std::path::Path;

const BUILD_NUMBER_FILE: &str = "build_number.txt";

fn read_build_number(path: &Path) -> u64 {
    fs::read_to_string(path)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(0)
}

fn main() -> std::io::Result<()> {
    println!("cargo:rerun-if-changed=src");

    let path = Path::new(BUILD_NUMBER_FILE);
    let build_number = read_build_number(path) + 1;
    fs::write(path, build_number.to_string())?;

    let compiled_at = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ");

    println!("cargo:rustc-env=BLOOM_BUILD_NUMBER={build_number}");
    println!("cargo:rustc-env=BLOOM_BUILD_TIMESTAMP={compiled_at}");
    println!("cargo:warning=Bloom build #{build_number} at {compiled_at}");

    Ok(())
}
