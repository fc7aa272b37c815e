//! `almirah-admin` -- terminal admin console for the product catalog.
//!
//! Reads commands from stdin, renders the form and product grid to stdout,
//! and talks to the catalog REST service. Type `help` for the commands.
//!
//! # Environment variables
//!
//! | Variable       | Required | Default                 | Description                      |
//! |----------------|----------|-------------------------|----------------------------------|
//! | `API_BASE_URL` | no       | `http://127.0.0.1:8000` | Catalog host, without `/products` |
//! | `PROBE_IMAGES` | no       | `true`                  | Check product images after listing |
//! | `RUST_LOG`     | no       | `almirah_console=info,almirah_client=info` | Log filter (stderr) |

use tokio::io::BufReader;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use almirah_client::CatalogClient;
use almirah_console::config::AdminConfig;
use almirah_console::controller::AdminController;
use almirah_console::shell::{self, ShellOptions};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    // Logs go to stderr so they never interleave with the rendered page.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "almirah_console=info,almirah_client=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // --- Configuration ---
    let config = AdminConfig::from_env()?;
    tracing::info!(
        api_base_url = %config.api_base_url,
        probe_images = config.probe_images,
        "Loaded console configuration"
    );

    // --- Catalog client ---
    let client = CatalogClient::new(config.api_base_url.as_str());
    let mut controller = AdminController::new(client);

    // --- Session ---
    let stdin = BufReader::new(tokio::io::stdin());
    let mut stdout = tokio::io::stdout();
    let options = ShellOptions {
        probe_images: config.probe_images,
    };
    shell::run(&mut controller, stdin, &mut stdout, options).await?;

    tracing::info!("Console shut down");
    Ok(())
}
