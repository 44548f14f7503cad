use fruit_lens_lib::config::Config;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    fruit_lens_lib::logging::init();

    let config = Config::from_env();
    tracing::info!("Fruit Lens starting...");

    if let Err(e) = fruit_lens_lib::run(config).await {
        tracing::error!("Fatal: {}", e);
        std::process::exit(1);
    }
}
