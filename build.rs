// Build script: when targeting wasm32, bundle the crate with wasm-pack and
// mirror `static/` (pages plus generated `pkg/`) into `dist/`.
use std::path::Path;
use std::env;
use std::process::Command;

use fs_extra::dir::{copy, CopyOptions};

const NESTED: &str = "STELLAR_VIZ_WASM_PACK";

fn main() {
    println!("cargo:rerun-if-changed=static");

    let target = env::var("TARGET").unwrap_or_default();
    // wasm-pack runs cargo again; the nested build only compiles.
    if target != "wasm32-unknown-unknown" || env::var_os(NESTED).is_some() {
        return;
    }

    // wasm-pack is assumed available. If not, emit warning.
    match Command::new("wasm-pack")
        .args(["build", "--release", "--target", "web", "--out-dir", "static/pkg"])
        .env(NESTED, "1")
        .status()
    {
        Ok(st) if st.success() => {}
        Ok(_) => println!("cargo:warning=wasm-pack build failed"),
        Err(_) => println!("cargo:warning=wasm-pack not installed, skipping bundle"),
    }

    let static_dir = Path::new("static");
    if !static_dir.exists() {
        return;
    }
    let out_dir = Path::new("dist");
    if out_dir.exists() {
        std::fs::remove_dir_all(out_dir).ok();
    }
    let options = CopyOptions {
        overwrite: true,
        content_only: true,
        ..CopyOptions::new()
    };
    if let Err(e) = std::fs::create_dir_all(out_dir).map_err(|e| e.to_string()).and_then(|_| {
        copy(static_dir, out_dir, &options)
            .map(|_| ())
            .map_err(|e| e.to_string())
    }) {
        println!("cargo:warning=copying static/ to dist/ failed: {e}");
    }
}
