//! CLI entry point for `dmarcfetch`.

use std::path::{Path, PathBuf};

use clap::Parser;

use dmarcfetch::mailbox::{ImapMailbox, MailboxConfig};
use dmarcfetch::{config, pipeline, store};

#[derive(Parser)]
#[command(name = "dmarcfetch", version, about = "DMARC report IMAP downloader")]
struct Cli {
    /// IMAP server address (e.g. imap.gmail.com)
    #[arg(short, long)]
    server: String,

    /// IMAP port (default from config, usually 993)
    #[arg(long)]
    port: Option<u16>,

    /// Mailbox user
    #[arg(short, long)]
    user: String,

    /// Mailbox password
    #[arg(short, long, env = "DMARCFETCH_PASSWORD", hide_env_values = true)]
    password: String,

    /// IMAP folder/label where the reports arrive
    #[arg(short, long)]
    folder: String,

    /// Existing directory where reports are stored
    #[arg(short = 'D', long)]
    directory: PathBuf,

    /// Log to file instead of stderr
    #[arg(short, long, value_name = "FILE")]
    log_file: Option<PathBuf>,

    /// Verbose logging (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = config::load_config();
    let log_level = match cli.verbose {
        0 => config.general.log_level.as_str(),
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    setup_logging(log_level, cli.log_file.as_deref());

    // Fail on a missing output root before any network work
    store::writer::ensure_root(&cli.directory)?;

    let mailbox_config = MailboxConfig {
        host: cli.server,
        port: cli.port.unwrap_or(config.mailbox.port),
        username: cli.user,
        password: cli.password,
    };
    tracing::debug!(config = ?mailbox_config, folder = %cli.folder, "Starting run");

    let mut mailbox = ImapMailbox::connect(&mailbox_config)?;
    let result = pipeline::run(&mut mailbox, &cli.folder, &cli.directory);
    mailbox.logout();
    result?;

    Ok(())
}

/// Set up tracing with stderr output, or a log file when `--log-file` is given.
fn setup_logging(level: &str, log_file: Option<&Path>) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    match log_file {
        Some(path) => {
            let dir = path.parent().filter(|p| !p.as_os_str().is_empty());
            let name = path
                .file_name()
                .map_or_else(|| "dmarcfetch.log".into(), ToOwned::to_owned);
            let file_appender =
                tracing_appender::rolling::never(dir.unwrap_or(Path::new(".")), name);
            let file_layer = tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(file_appender);

            tracing_subscriber::registry()
                .with(env_filter)
                .with(file_layer)
                .init();
        }
        None => {
            let stderr_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);
            tracing_subscriber::registry()
                .with(env_filter)
                .with(stderr_layer)
                .init();
        }
    }
}
