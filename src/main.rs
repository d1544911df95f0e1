//! Host-side helper: `cargo run` bundles the scenes with wasm-pack and serves
//! `static/` locally. Each scene has its own page, e.g. `stellar.html`.

use std::process::{Command, Stdio};
use std::{env, thread, time::Duration};

const PORT: &str = "8000";

fn wasm_pack() -> bool {
    println!("Building WASM pkg …");
    match Command::new("wasm-pack")
        .args(["build", "--release", "--target", "web", "--out-dir", "static/pkg"])
        // Tells build.rs not to start a second wasm-pack.
        .env("STELLAR_VIZ_WASM_PACK", "1")
        .status()
    {
        Ok(st) if st.success() => true,
        Ok(_) => {
            eprintln!("wasm-pack finished with errors. Ensure the wasm32-unknown-unknown target is installed.");
            false
        }
        Err(_) => {
            eprintln!("wasm-pack not found in PATH. Serving whatever is already in static/pkg.");
            true
        }
    }
}

fn main() {
    if env::args().any(|a| a == "--no-build") {
        println!("Skipping WASM build");
    } else if !wasm_pack() {
        std::process::exit(1);
    }

    println!("Serving static/ at http://127.0.0.1:{PORT}/ (landing, holo, portal and stellar pages)");
    let server = Command::new("python3")
        .args(["-m", "http.server", PORT, "--directory", "static"])
        .stdout(Stdio::null())
        .stderr(Stdio::inherit())
        .spawn();
    let mut server = match server {
        Ok(child) => child,
        Err(e) => {
            eprintln!("failed to start http server: {e}");
            std::process::exit(1);
        }
    };

    loop {
        if let Ok(Some(status)) = server.try_wait() {
            eprintln!("http server exited: {status}");
            std::process::exit(status.code().unwrap_or(1));
        }
        thread::sleep(Duration::from_secs(1));
    }
}
