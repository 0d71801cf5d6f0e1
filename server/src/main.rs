use clap::Parser;
use log::info;
use server::state::AppState;
use server::{game_loop, http};
use std::sync::Arc;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Address to bind the HTTP listener to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// Port to listen on
    #[arg(short, long, default_value = "8080")]
    port: u16,

    /// Simulation tick period in milliseconds
    #[arg(short, long, default_value_t = shared::TICK_RATE_MS)]
    tick_ms: u64,

    /// Maximum number of concurrent players
    #[arg(short, long, default_value_t = shared::MAX_PLAYERS)]
    max_players: usize,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    if std::env::var("RUST_LOG").is_err() {
        eprintln!("Set RUST_LOG=info for detailed logging");
    }

    let args = Args::parse();

    let state = Arc::new(AppState::new(args.max_players));

    // Spawn the simulation tick task
    let loop_handle = {
        let state = Arc::clone(&state);
        let period = Duration::from_millis(args.tick_ms);
        tokio::spawn(async move {
            game_loop::run_game_loop(state, period).await;
        })
    };

    // Spawn the HTTP server
    let address = format!("{}:{}", args.host, args.port);
    let listener = tokio::net::TcpListener::bind(&address).await?;
    info!(
        "Server listening on {} ({}ms tick, {} player cap)",
        address, args.tick_ms, args.max_players
    );
    let server_handle = {
        let app = http::router(Arc::clone(&state));
        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                eprintln!("HTTP server error: {}", e);
            }
        })
    };

    // Handle shutdown gracefully
    tokio::select! {
        result = server_handle => {
            if let Err(e) = result {
                eprintln!("HTTP task panicked: {}", e);
            }
        }
        result = loop_handle => {
            if let Err(e) = result {
                eprintln!("Game loop task panicked: {}", e);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            println!("Received Ctrl+C, shutting down gracefully...");
        }
    }

    Ok(())
}
