use std::fs;
use std::path::PathBuf;
use std::process;

use clap::Parser;
use tracing::{error, info, warn, Level};

use pagesnap::core::{create_snapshot, SnapshotOptions};
use pagesnap::env::{logging, EnvConfig, EnvError, EnvVar};
use pagesnap::network::{Session, SessionOptions};
use pagesnap::storage::DirectorySink;

const INDEX_FILE_NAME: &str = "index.html";

#[derive(Parser, Debug)]
#[command(name = "pagesnap")]
#[command(version, about = "Save a web page and its stylesheets into a directory")]
#[command(after_help = r#"EXAMPLES:
    # Save a page into ./example
    pagesnap -u https://example.com -n example

    # Keep scripts and fetch eight stylesheets at a time
    pagesnap -u https://example.com -n example --keep-js -j 8

    # Snapshot a local file
    pagesnap -u ./page.html -n saved
"#)]
struct Cli {
    /// URL, file:// URL or path of the page to save
    #[arg(short, long, value_name = "URL")]
    url: String,

    /// Directory to create and save files into
    #[arg(short, long, value_name = "DIR")]
    name: PathBuf,

    /// Keep all <script> elements in the saved page
    #[arg(long)]
    keep_js: bool,

    /// Number of stylesheets fetched in parallel
    #[arg(short, long, value_name = "N")]
    jobs: Option<usize>,

    /// Request timeout in seconds (0 disables it)
    #[arg(short, long, value_name = "SECS")]
    timeout: Option<u64>,

    /// User-Agent header sent with every request
    #[arg(long, value_name = "UA")]
    user_agent: Option<String>,

    /// Accept invalid TLS certificates
    #[arg(short = 'k', long)]
    insecure: bool,

    /// Prepend a comment recording where and when the page was saved
    #[arg(long)]
    metadata: bool,

    /// Charset of the page, overriding whatever it declares
    #[arg(short, long, value_name = "ENCODING")]
    encoding: Option<String>,

    /// Log level: trace, debug, info, warn, error
    #[arg(long, value_name = "LEVEL", value_parser = parse_log_level)]
    log_level: Option<String>,
}

fn parse_log_level(value: &str) -> Result<String, String> {
    logging::LogLevel::parse(value).map_err(|e| e.message)
}

fn init_logging(level: &str, no_color: bool) {
    let level: Level = level.parse().unwrap_or(Level::INFO);
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(level)
        .with_ansi(!no_color)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();

    let env_config = match EnvConfig::from_env() {
        Ok(config) => config,
        Err(EnvError { variable, message }) => {
            eprintln!("Error in environment variable {variable}: {message}");
            process::exit(1);
        }
    };

    init_logging(
        cli.log_level.as_deref().unwrap_or(&env_config.log_level),
        env_config.no_color,
    );

    if let Err(e) = run(cli, env_config) {
        error!("{e}");
        process::exit(1);
    }

    println!("Download complete.");
}

fn run(cli: Cli, env_config: EnvConfig) -> Result<(), Box<dyn std::error::Error>> {
    fs::create_dir(&cli.name)
        .map_err(|e| format!("Error creating directory {}: {e}", cli.name.display()))?;

    let session = Session::new(&SessionOptions {
        insecure: cli.insecure,
        timeout: cli.timeout.unwrap_or(env_config.timeout),
        user_agent: Some(cli.user_agent.unwrap_or(env_config.user_agent)),
    })?;

    let (page, page_url) = session.retrieve_document(&cli.url)?;
    info!("retrieved {} ({} bytes)", page_url, page.len());

    let options = SnapshotOptions {
        keep_scripts: cli.keep_js,
        jobs: cli.jobs.unwrap_or(env_config.jobs).max(1),
        encoding: cli.encoding,
        metadata: cli.metadata,
        reserved_names: vec![INDEX_FILE_NAME.to_string()],
        ..SnapshotOptions::default()
    };

    let sink = DirectorySink::new(&cli.name);
    let snapshot = create_snapshot(&page, page_url.as_str(), &options, &session, &sink)?;

    for skipped in &snapshot.skipped {
        warn!("skipped stylesheet {}: {}", skipped.href, skipped.reason);
    }

    let index_path = cli.name.join(INDEX_FILE_NAME);
    fs::write(&index_path, &snapshot.html)
        .map_err(|e| format!("Error saving {}: {e}", index_path.display()))?;

    Ok(())
}
