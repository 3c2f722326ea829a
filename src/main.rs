// ============================================================================
// NEWSPAPER: news and articles with group-based authoring
// ============================================================================

// - User signup/login with password hashing
// - JWT authentication
// - `common`/`authors` groups and per-action post permissions
// - News and article listing, search and category filtering
// - Structured logging

use newspaper::{Config, init_state, router};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .compact()
        .init();

    if let Err(e) = run().await {
        error!("{}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::from_env()?;
    let addr = config.bind_addr.clone();

    let state = init_state(config).map_err(|e| format!("Bootstrap failed: {:?}", e))?;
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!("Server running on http://{}", addr);
    info!("API Endpoints:");
    info!("  GET    /health                    - Health check");
    info!("  POST   /auth/signup               - Create account");
    info!("  POST   /auth/login                - Login");
    info!("  GET    /users/me                  - Current user (auth)");
    info!("  POST   /become-author/            - Join the authors group (auth)");
    info!("  GET    /news/, /articles/         - List posts (paginated)");
    info!("  GET    /news/search/              - Search posts");
    info!("  GET    /categories/               - Categories with post counts");
    info!("  GET    /news/category/{{id}}/       - Posts in a category");
    info!("  POST   /news/create/              - Create post (add_post)");
    info!("  POST   /news/{{id}}/edit/           - Edit post (change_post)");
    info!("  POST   /news/{{id}}/delete/         - Delete post (delete_post)");

    axum::serve(listener, app).await?;
    Ok(())
}
