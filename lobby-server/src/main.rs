use lobby_server::{router, State};
use std::env;
use std::net::SocketAddr;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let mut port = 8000;
    if let Some(p) = env::args().nth(1) {
        port = p.parse()?;
    }
    // The dev store starts empty on every run.
    let sled_path = format!("lobby-sled-{port}");
    let _ = std::fs::remove_dir_all(&sled_path);
    let state = State::open(sled_path)?;
    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    tracing::info!(%addr, "listening");
    axum::Server::bind(&addr)
        .serve(router(state).into_make_service())
        .await?;
    Ok(())
}
