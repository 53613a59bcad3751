mod commands;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "adlens-cli")]
#[command(about = "Ad library ingestion and lookup")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Apply pending database migrations
    Migrate,
    /// Scrape one platform and persist the results
    Scrape {
        #[command(subcommand)]
        platform: ScrapeCommands,
    },
    /// Read stored ads
    Ads {
        #[command(subcommand)]
        command: AdsCommands,
    },
    /// Advertiser analytics
    Advertiser {
        #[command(subcommand)]
        command: AdvertiserCommands,
    },
}

#[derive(Debug, Subcommand)]
enum ScrapeCommands {
    /// Google Ads Transparency Center, by advertiser id
    Google {
        /// Advertiser id to scrape (repeatable; defaults to the sample advertiser)
        #[arg(long = "id")]
        ids: Vec<String>,
    },
    /// Meta Ad Library, by page id
    Meta {
        /// Page id to scrape (repeatable; defaults to the sample page)
        #[arg(long = "id")]
        ids: Vec<String>,
    },
}

#[derive(Debug, Subcommand)]
enum AdsCommands {
    /// Every stored ad, newest first
    List,
    /// One ad by id
    Show { id: String },
}

#[derive(Debug, Subcommand)]
enum AdvertiserCommands {
    /// Ad counts, average run length and starts per month
    Summary { id: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = adlens_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let pool_config = adlens_db::PoolConfig::from_app_config(&config);
    let pool = adlens_db::connect_pool(&config.database_url, pool_config).await?;

    match cli.command {
        Commands::Migrate => commands::run_migrate(&pool).await,
        Commands::Scrape { platform } => match platform {
            ScrapeCommands::Google { ids } => commands::run_scrape_google(&pool, &config, ids).await,
            ScrapeCommands::Meta { ids } => commands::run_scrape_meta(&pool, &config, ids).await,
        },
        Commands::Ads { command } => match command {
            AdsCommands::List => commands::run_ads_list(&pool).await,
            AdsCommands::Show { id } => commands::run_ads_show(&pool, &id).await,
        },
        Commands::Advertiser { command } => match command {
            AdvertiserCommands::Summary { id } => commands::run_advertiser_summary(&pool, &id).await,
        },
    }
}
