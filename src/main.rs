mod app;
mod catalog;
mod config;
mod errors;
mod profile;
mod reviews;
mod sessions;
mod state;
mod store;
mod users;

fn init_tracing() {
    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "outdbox=debug,axum=info,tower_http=info".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    // `outdbox hash-password <password>` prints a PHC string for seeding users
    let mut args = std::env::args().skip(1);
    if args.next().as_deref() == Some("hash-password") {
        let plain = args
            .next()
            .ok_or_else(|| anyhow::anyhow!("usage: outdbox hash-password <password>"))?;
        println!("{}", users::password::hash_password(&plain)?);
        return Ok(());
    }

    let state = state::AppState::init().await?;
    tracing::info!(scheme = ?state.config.password_scheme, "credential scheme");

    app::serve(app::build_app(state)).await
}
