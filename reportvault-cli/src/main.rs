//! reportvault CLI
//!
//! Command-line interface for pinning therapy session reports to IPFS and
//! fetching them back through the gateway.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::*;
use futures::future::join_all;
use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use reportvault_core::types::{FetchedContent, ReportFile, RetrievedReport, UploadRequest, UploaderRole};
use reportvault_ipfs::{PinataClient, PinataConfig, ReportRetriever, ReportUploader};
use reportvault_ledger::MemoryLedger;
use reportvault_api::{ApiConfig, ApiServer};

/// reportvault - session reports on IPFS
#[derive(Parser)]
#[command(name = "reportvault")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(flatten)]
    pinata: PinataArgs,

    #[command(subcommand)]
    command: Commands,
}

/// Pinata settings, from flags or the matching `PINATA_*` variables
#[derive(Args, Debug, Default)]
struct PinataArgs {
    /// Pinata JWT
    #[arg(long, env = "PINATA_JWT", hide_env_values = true)]
    pinata_jwt: Option<String>,
    /// Legacy Pinata API key
    #[arg(long, env = "PINATA_API_KEY", hide_env_values = true)]
    pinata_api_key: Option<String>,
    /// Legacy Pinata secret API key
    #[arg(long, env = "PINATA_SECRET_API_KEY", hide_env_values = true)]
    pinata_secret_api_key: Option<String>,
    /// Pinning API base URL
    #[arg(long, env = "PINATA_API_URL")]
    pinata_api_url: Option<String>,
    /// Gateway base URL
    #[arg(long, env = "PINATA_GATEWAY_URL")]
    pinata_gateway_url: Option<String>,
    /// Dedicated gateway access token
    #[arg(long, env = "PINATA_GATEWAY_TOKEN", hide_env_values = true)]
    pinata_gateway_token: Option<String>,
    /// Request timeout in seconds
    #[arg(long, env = "PINATA_TIMEOUT_SECS")]
    pinata_timeout_secs: Option<u64>,
}

impl PinataArgs {
    fn lookup(&self, key: &str) -> Option<String> {
        match key {
            "PINATA_JWT" => self.pinata_jwt.clone(),
            "PINATA_API_KEY" => self.pinata_api_key.clone(),
            "PINATA_SECRET_API_KEY" => self.pinata_secret_api_key.clone(),
            "PINATA_API_URL" => self.pinata_api_url.clone(),
            "PINATA_GATEWAY_URL" => self.pinata_gateway_url.clone(),
            "PINATA_GATEWAY_TOKEN" => self.pinata_gateway_token.clone(),
            "PINATA_TIMEOUT_SECS" => self.pinata_timeout_secs.map(|t| t.to_string()),
            _ => None,
        }
    }

    fn config(&self) -> Result<PinataConfig> {
        PinataConfig::from_lookup(|key| self.lookup(key)).context("Invalid Pinata configuration")
    }

    fn client(&self) -> Result<Arc<PinataClient>> {
        let client = PinataClient::with_config(self.config()?).context("Pinata is not configured")?;
        Ok(Arc::new(client))
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Pin a session report and print the ledger record to submit for it
    Upload {
        /// Report file to upload
        path: PathBuf,
        /// Therapy session identifier
        #[arg(short, long)]
        session: String,
        /// Patient wallet address
        #[arg(short, long)]
        owner: String,
        /// Who is uploading (therapist or patient)
        #[arg(short, long, default_value = "therapist")]
        role: UploaderRole,
    },

    /// Pin a single file without tags or a ledger record
    Pin {
        /// File to pin
        path: PathBuf,
    },

    /// Download reports by CID
    Fetch {
        /// Content identifiers to download
        #[arg(required = true)]
        cids: Vec<String>,
        /// Directory to write the files into
        #[arg(short, long, default_value = ".")]
        output: PathBuf,
    },

    /// Run the API server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "3001")]
        port: u16,
        /// Bind address
        #[arg(short, long, default_value = "0.0.0.0")]
        bind: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // .env values must be visible to clap's env fallback
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        "reportvault=debug,info"
    } else {
        "reportvault=info,warn"
    };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into());

    if cli.json_logs {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    match cli.command {
        Commands::Upload { path, session, owner, role } => {
            cmd_upload(&cli.pinata, &path, &session, &owner, role).await
        }
        Commands::Pin { path } => cmd_pin(&cli.pinata, &path).await,
        Commands::Fetch { cids, output } => cmd_fetch(&cli.pinata, &cids, &output).await,
        Commands::Serve { port, bind } => cmd_serve(&cli.pinata, port, &bind).await,
    }
}

fn spinner(message: &'static str) -> Result<ProgressBar> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    pb.set_message(message);
    pb.enable_steady_tick(Duration::from_millis(100));
    Ok(pb)
}

/// Upload a report: pin with tags, then record it
async fn cmd_upload(
    pinata: &PinataArgs,
    path: &Path,
    session: &str,
    owner: &str,
    role: UploaderRole,
) -> Result<()> {
    println!("{} {}", "📤 Uploading report:".cyan().bold(), path.display());

    let client = pinata.client()?;
    let ledger = Arc::new(MemoryLedger::new());
    let uploader = ReportUploader::new(client.clone(), ledger.clone());

    let request = UploadRequest::new(Some(ReportFile::from_path(path)), session, owner).with_role(role);

    let pb = spinner("Pinning to IPFS...")?;
    let result = uploader.upload(request).await;
    pb.finish_and_clear();

    let pin = match result {
        Ok(pin) => pin,
        Err(e) => {
            if let Some(pin) = e.orphaned_pin() {
                println!(
                    "{} {}",
                    "⚠️  Pinned but not recorded, CID:".yellow().bold(),
                    pin.content_identifier
                );
            }
            return Err(e).context("Upload failed");
        }
    };

    println!("\n{}", "✅ Report uploaded:".green().bold());
    println!("   {} {}", "CID:".yellow(), pin.content_identifier);
    if let Some(size) = pin.size_bytes {
        println!("   {} {} bytes", "Size:".dimmed(), size);
    }
    println!("   {} {}", "Gateway:".dimmed(), client.gateway_link(&pin.content_identifier));

    if let Some(entry) = ledger.get(&pin.content_identifier) {
        println!("\n{}", "📋 Ledger record (JSON):".yellow().bold());
        println!("{}", serde_json::to_string_pretty(&entry)?);
        println!(
            "   {}",
            "Not persisted: submit this record to the patient's ledger.".dimmed()
        );
    }

    Ok(())
}

/// Pin a bare file
async fn cmd_pin(pinata: &PinataArgs, path: &Path) -> Result<()> {
    println!("{} {}", "📌 Pinning:".cyan().bold(), path.display());

    let client = pinata.client()?;
    let uploader = ReportUploader::new(client.clone(), Arc::new(MemoryLedger::new()));

    let pb = spinner("Pinning to IPFS...")?;
    let result = uploader.pin_file(ReportFile::from_path(path)).await;
    pb.finish_and_clear();
    let pin = result.context("Pin failed")?;

    println!("\n{}", "✅ File pinned:".green().bold());
    println!("   {} {}", "CID:".yellow(), pin.content_identifier);
    println!("   {} {}", "Gateway:".dimmed(), client.gateway_link(&pin.content_identifier));

    Ok(())
}

/// Fetch reports concurrently and write them to `output`
async fn cmd_fetch(pinata: &PinataArgs, cids: &[String], output: &Path) -> Result<()> {
    println!("{} {} report(s)", "📥 Fetching".cyan().bold(), cids.len());

    tokio::fs::create_dir_all(output)
        .await
        .with_context(|| format!("Failed to create {}", output.display()))?;

    let retriever = ReportRetriever::new(pinata.client()?);
    tracing::debug!(count = cids.len(), output = %output.display(), "Fetching reports");

    let pb = ProgressBar::new(cids.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len}")?
            .progress_chars("#>-"),
    );

    let results = join_all(cids.iter().map(|cid| {
        let retriever = &retriever;
        let pb = &pb;
        async move {
            let result = match retriever.fetch_report(cid).await {
                Ok(content) => save_report(content, output).await,
                Err(e) => Err(e.into()),
            };
            pb.inc(1);
            (cid, result)
        }
    }))
    .await;
    pb.finish_and_clear();

    let mut failed = 0;
    for (cid, result) in results {
        match result {
            Ok(path) => println!("   {} {} → {}", "✓".green(), cid, path.display()),
            Err(e) => {
                failed += 1;
                println!("   {} {}: {:#}", "✗".red(), cid, e);
            }
        }
    }

    if failed > 0 {
        anyhow::bail!("{} of {} fetches failed", failed, cids.len());
    }
    Ok(())
}

async fn save_report(content: FetchedContent, output: &Path) -> Result<PathBuf> {
    let path = output.join(download_name(&content));
    tokio::fs::write(&path, &content.bytes)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(path)
}

/// Fetches by bare CID carry no session, so the file is named after the CID.
fn download_name(content: &FetchedContent) -> String {
    RetrievedReport {
        session_id: String::new(),
        content_identifier: content.content_identifier.clone(),
        content_type: content.content_type.clone(),
        bytes: content.bytes.clone(),
    }
    .suggested_file_name()
}

/// Run API server
async fn cmd_serve(pinata: &PinataArgs, port: u16, bind: &str) -> Result<()> {
    println!("{}", "🚀 Starting reportvault API server...".cyan().bold());
    println!("   {} http://{}:{}", "Listening on:".green(), bind, port);
    println!("   {} http://{}:{}/health", "Health check:".dimmed(), bind, port);
    println!("\n   Press Ctrl+C to stop.\n");

    let mut config = ApiConfig::from_env().context("Invalid server configuration")?;
    config.pinata = pinata.config()?;
    if config.pinata.auth.is_none() {
        println!(
            "{}",
            "⚠️  No Pinata credentials set; uploads will be rejected.".yellow()
        );
    }
    let server = ApiServer::new(config)?;

    let addr: SocketAddr = format!("{}:{}", bind, port).parse()?;
    server.run(addr).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_upload_help_does_not_promise_persistence() {
        let cmd = Cli::command();
        let about = cmd
            .find_subcommand("upload")
            .and_then(|c| c.get_about())
            .map(|a| a.to_string())
            .unwrap();
        assert!(about.contains("print the ledger record"));
    }

    #[test]
    fn test_parse_upload() {
        let cli = Cli::try_parse_from([
            "reportvault", "upload", "report.pdf", "--session", "S1", "--owner", "0xABC", "--role", "patient",
        ])
        .unwrap();

        match cli.command {
            Commands::Upload { path, session, owner, role } => {
                assert_eq!(path, PathBuf::from("report.pdf"));
                assert_eq!(session, "S1");
                assert_eq!(owner, "0xABC");
                assert_eq!(role, UploaderRole::Patient);
            }
            _ => panic!("expected upload"),
        }
    }

    #[test]
    fn test_parse_rejects_unknown_role() {
        assert!(Cli::try_parse_from([
            "reportvault", "upload", "report.pdf", "-s", "S1", "-o", "0xABC", "-r", "admin",
        ])
        .is_err());
    }

    #[test]
    fn test_fetch_requires_cid() {
        assert!(Cli::try_parse_from(["reportvault", "fetch"]).is_err());
    }

    #[test]
    fn test_pinata_flags_feed_config() {
        let cli = Cli::try_parse_from([
            "reportvault",
            "--pinata-jwt", "cli-jwt",
            "--pinata-gateway-url", "http://localhost:8080/ipfs",
            "--pinata-timeout-secs", "5",
            "fetch", "Qm123",
        ])
        .unwrap();

        let config = cli.pinata.config().unwrap();
        assert_eq!(config.auth, Some(reportvault_ipfs::PinataAuth::jwt("cli-jwt")));
        assert_eq!(config.gateway_url, "http://localhost:8080/ipfs");
        assert_eq!(config.timeout_seconds, 5);
    }

    #[test]
    fn test_half_key_pair_is_rejected() {
        let args = PinataArgs {
            pinata_api_key: Some("key".into()),
            ..PinataArgs::default()
        };
        assert!(args.config().is_err());
        assert!(PinataArgs::default().config().unwrap().auth.is_none());
    }

    #[test]
    fn test_download_name_uses_cid() {
        let content = FetchedContent {
            content_identifier: "Qm123".into(),
            content_type: "application/pdf".into(),
            bytes: vec![0x25, 0x50, 0x44, 0x46].into(),
        };
        assert_eq!(download_name(&content), "report-Qm123.pdf");
    }

    #[tokio::test]
    async fn test_save_report_writes_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let content = FetchedContent {
            content_identifier: "Qm123".into(),
            content_type: "text/plain".into(),
            bytes: b"hello".to_vec().into(),
        };

        let path = save_report(content, dir.path()).await.unwrap();
        assert_eq!(path, dir.path().join("report-Qm123.txt"));
        assert_eq!(std::fs::read(path).unwrap(), b"hello");
    }
}
