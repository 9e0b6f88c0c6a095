use std::path::PathBuf;
use std::process;
use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};
use log::LevelFilter;
use pvpsched::{
    ConsolePresenter, DEFAULT_SCHEDULE_URL, DocumentFetcher, FetcherConfig, HttpDocumentFetcher,
    JsonPresenter, Presenter, Repository, StaticDocumentFetcher,
};
use tokio_util::sync::CancellationToken;

#[derive(Parser)]
#[command(name = "pvpsched")]
#[command(about = "Prints PvP rankings and tournaments from the PvP schedule page", long_about = None)]
struct Cli {
    #[arg(
        short = 'l',
        long = "log-level",
        value_enum,
        default_value = "info",
        global = true,
        help = "Set the logging level"
    )]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Off => LevelFilter::Off,
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

#[derive(Debug, Clone, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the ranked PvP leaderboard
    Rankings(SourceArgs),
    /// Print the scheduled PvP tournaments
    Tournaments(SourceArgs),
}

#[derive(Args)]
struct SourceArgs {
    #[arg(long, default_value = DEFAULT_SCHEDULE_URL, help = "URL of the schedule page")]
    url: String,

    #[arg(
        long,
        value_name = "PATH",
        conflicts_with = "url",
        help = "Parse a saved copy of the page instead of fetching it"
    )]
    file: Option<PathBuf>,

    #[arg(
        long,
        value_name = "SECS",
        default_value_t = 30,
        value_parser = clap::value_parser!(u64).range(1..),
        help = "Give up on the request after this many seconds"
    )]
    timeout: u64,

    #[arg(
        short = 'o',
        long = "output",
        value_enum,
        default_value = "text",
        help = "Output format"
    )]
    format: OutputFormat,
}

#[derive(Debug, Clone, Copy)]
enum Listing {
    Rankings,
    Tournaments,
}

async fn run<F: DocumentFetcher>(
    repository: Repository<F>,
    listing: Listing,
    url: &str,
    presenter: &mut dyn Presenter,
) {
    let written = match listing {
        Listing::Rankings => {
            let rankings = repository.fetch_rankings(url).await.unwrap_or_else(|e| {
                log::error!("Error fetching rankings: {}", e);
                process::exit(1);
            });
            if rankings.is_empty() {
                log::warn!("No rankings found on the page");
            }
            presenter.present_rankings(&rankings)
        }
        Listing::Tournaments => {
            let tournaments = repository.fetch_tournaments(url).await.unwrap_or_else(|e| {
                log::error!("Error fetching tournaments: {}", e);
                process::exit(1);
            });
            if tournaments.is_empty() {
                log::warn!("No tournaments found on the page");
            }
            presenter.present_tournaments(&tournaments)
        }
    };

    if let Err(e) = written {
        log::error!("Error writing output: {}", e);
        process::exit(1);
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(cli.log_level.clone().into())
        .init();

    let (listing, args) = match cli.command {
        Commands::Rankings(args) => (Listing::Rankings, args),
        Commands::Tournaments(args) => (Listing::Tournaments, args),
    };

    let mut presenter: Box<dyn Presenter> = match args.format {
        OutputFormat::Text => Box::new(ConsolePresenter::stdout()),
        OutputFormat::Json => Box::new(JsonPresenter::stdout()),
    };

    if let Some(path) = &args.file {
        log::info!("Reading schedule page from {}", path.display());

        let fetcher = StaticDocumentFetcher::from_file(path).unwrap_or_else(|e| {
            log::error!("Error reading {}: {}", path.display(), e);
            process::exit(1);
        });

        run(
            Repository::new(fetcher),
            listing,
            &args.url,
            presenter.as_mut(),
        )
        .await;
        return;
    }

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            log::warn!("Interrupted, cancelling request...");
            on_interrupt.cancel();
        }
    });

    let config = FetcherConfig::default().with_timeout(Duration::from_secs(args.timeout));
    let fetcher = HttpDocumentFetcher::new(&config, cancel).unwrap_or_else(|e| {
        log::error!("Error creating fetcher: {}", e);
        process::exit(1);
    });

    run(
        Repository::new(fetcher),
        listing,
        &args.url,
        presenter.as_mut(),
    )
    .await;
}
