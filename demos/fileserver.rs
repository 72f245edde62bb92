//! Serves a directory over HTTP: `cargo run --example fileserver [dir]`.

use lite_web::{run, ServeMux};
use std::path::PathBuf;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let base_dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));

    let mux = ServeMux::new(Some(base_dir));
    run("127.0.0.1:8080", mux).await.unwrap();
}
