//! Vista Shell - Main entry point

use tracing_subscriber::EnvFilter;
use vista_core::NavigatorConfig;
use vista_shell::{Shell, ShellRoutes};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Load configuration from environment
    let config = NavigatorConfig::from_env();

    // Route tables: JSON file if given, else the demo
    let routes = match std::env::var("VISTA_ROUTES") {
        Ok(path) => ShellRoutes::from_file(&path)?,
        Err(_) => ShellRoutes::demo(&config),
    };

    let shell = Shell::new(config);
    shell.load_routes(routes).await?;
    shell.mount(&[], None, "main").await?;
    shell.mount(&[], Some("sidebar"), "sidebar").await?;
    shell.mount(&["inbox"], None, "inbox").await?;

    let mut urls: Vec<String> = std::env::args().skip(1).collect();
    if urls.is_empty() {
        urls.push("/".to_string());
    }

    for url in urls {
        match shell.navigate(&url).await {
            Ok(outcome) => println!("{} -> {}", url, serde_json::to_string(&outcome)?),
            Err(e) => eprintln!("{} -> error: {}", url, e),
        }
    }

    Ok(())
}
