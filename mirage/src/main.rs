use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use common::log_setup::setup_logging;
use mirage::console::{parse_line, ConsoleTransport};
use mirage::fetch::{RoutingFetcher, DOWNLOAD_TIMEOUT};
use mirage::{Config, Dispatch, MirageService, UserId};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;

/// Mirage tank sessions on the console.
///
/// Each stdin line is a message from one user. Send `幻影坦克` or `彩色幻影坦克`
/// to start, then `image <url-or-path>` twice. `取消` cancels.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "mirage.toml")]
    config: PathBuf,

    /// Directory that receives composite images
    #[arg(short, long, default_value = "mirage_output")]
    output_dir: PathBuf,

    /// User id attached to every line
    #[arg(short, long, default_value = "console")]
    user: String,

    /// Directory for rolling log files
    #[arg(long, default_value = "logs")]
    log_dir: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = Config::load_or_default(&args.config)?;
    setup_logging(&config.log_level, &args.log_dir, "mirage")?;
    config.validate_and_save(&args.config)?;

    std::fs::create_dir_all(&config.temp_dir)?;
    info!(
        temp_dir = %config.temp_dir.display(),
        timeout = config.timeout,
        max_img_size = config.max_img_size,
        "starting console host"
    );

    let fetcher = Arc::new(RoutingFetcher::with_local_files(DOWNLOAD_TIMEOUT)?);
    let transport = Arc::new(ConsoleTransport::new(args.output_dir));
    let service = MirageService::new(config, fetcher, transport);
    let user = UserId::new(args.user);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        if service.dispatch(parse_line(&user, &line)) == Dispatch::Ignored {
            println!("(no active session; send 幻影坦克 or 彩色幻影坦克 to start)");
        }
    }

    // stdin closed: let running sessions reach their deadline or finish
    service.wait_idle().await;
    info!("console host stopped");

    Ok(())
}
