//! Environment readiness check.

use std::path::Path;

use anyhow::Result;
use url2pdf::renderer::chromium::CHROME_PATH_ENV;
use url2pdf::ChromiumRenderer;

use crate::config::ServerConfig;

/// Check Chromium availability and the static directory.
pub async fn run(config: &ServerConfig) -> Result<()> {
    println!("url2pdf Doctor");
    println!("==============");
    println!();

    // OS and architecture
    println!("OS:   {}", std::env::consts::OS);
    println!("Arch: {}", std::env::consts::ARCH);
    println!();

    // Check Chromium
    let chromium_ready = match ChromiumRenderer::new(config.chrome_path.clone()) {
        Ok(renderer) => {
            println!("[OK] Chromium found: {}", renderer.executable().display());
            true
        }
        Err(e) => {
            println!("[!!] {e}");
            println!("     Install google-chrome or chromium, or set {CHROME_PATH_ENV}.");
            false
        }
    };

    // Check static directory
    let static_ready = check_static_dir(&config.static_dir).await;

    println!();
    println!("Listen address:  {}", config.addr);
    for origin in &config.allowed_origins {
        println!("Allowed origin:  {}", origin.to_str().unwrap_or("<non-ascii>"));
    }

    println!();
    if chromium_ready && static_ready {
        println!("Status: READY");
    } else {
        println!("Status: NOT READY");
    }

    Ok(())
}

async fn check_static_dir(dir: &Path) -> bool {
    if let Err(e) = tokio::fs::create_dir_all(dir).await {
        println!("[!!] Cannot create static directory {}: {e}", dir.display());
        return false;
    }

    let probe = dir.join(".url2pdf-doctor");
    match tokio::fs::write(&probe, b"ok").await {
        Ok(()) => {
            let _ = tokio::fs::remove_file(&probe).await;
            println!("[OK] Static directory {} is writable", dir.display());
            true
        }
        Err(e) => {
            println!("[!!] Static directory {} is not writable: {e}", dir.display());
            false
        }
    }
}
