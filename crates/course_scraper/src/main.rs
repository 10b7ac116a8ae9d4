use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use course_scraper::config::{ScraperConfig, UrlList};
use course_scraper::db::{CourseDbManager, CourseStore};
use course_scraper::scraping::concordia::ConcordiaScraper;
use course_scraper::scraping::fetcher::{BrowserFetcher, HttpFetcher};
use course_scraper::scraping::pipeline::Pipeline;
use course_scraper::scraping::ListingFetcher;
use course_scraper::search::{search_courses, SearchParameters};
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "course_scraper")]
#[command(about = "Scrape university course catalogs into a local database")]
struct Cli {
    /// More output (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scrape the catalog pages and replace the stored courses
    Scrape(ScrapeArgs),

    /// Query the stored courses and print matches as JSON
    Search(SearchArgs),
}

#[derive(Args)]
struct ScrapeArgs {
    /// JSON file with the catalog urls ({"Urls": [...]})
    #[arg(long)]
    urls: PathBuf,

    /// JSON file with scraper settings
    #[arg(long)]
    config: Option<PathBuf>,

    /// SQLite database to write to
    #[arg(long, default_value = "courses.db")]
    db: String,

    /// Index of the first url to scrape
    #[arg(long, requires = "count")]
    start: Option<usize>,

    /// Number of urls to scrape from --start
    #[arg(long, requires = "start")]
    count: Option<usize>,

    /// Use plain HTTP requests instead of a headless browser
    #[arg(long)]
    http: bool,

    /// Scrape and report, but don't touch the database
    #[arg(long)]
    dry_run: bool,
}

#[derive(Args)]
struct SearchArgs {
    /// SQLite database to read from
    #[arg(long, default_value = "courses.db")]
    db: String,

    #[arg(long)]
    university: Option<u32>,

    /// Department code, e.g. COMP
    #[arg(long = "type")]
    course_type: Option<String>,

    #[arg(long)]
    number: Option<u32>,

    #[arg(long)]
    name: Option<String>,

    #[arg(long)]
    credits: Option<String>,

    #[arg(long = "keyword")]
    keywords: Vec<String>,

    #[arg(long = "component")]
    components: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Scrape(args) => scrape(args).await,
        Commands::Search(args) => search(args),
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("course_scraper={level}")));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}

async fn scrape(args: ScrapeArgs) -> Result<()> {
    let urls = UrlList::load(&args.urls)?;
    let config = match &args.config {
        Some(path) => ScraperConfig::load(path)?,
        None => ScraperConfig::from_env(),
    };

    info!(urls = urls.urls.len(), http = args.http, "Starting scrape");

    let targets = config.fetch_targets();
    if args.http {
        let fetcher = HttpFetcher::new(&targets, &config.user_agent)?;
        run_scrape(fetcher, urls, &config, &args).await
    } else {
        let fetcher = BrowserFetcher::new(targets)
            .with_chrome_executable(config.chrome_executable.clone())
            .with_user_agent(config.user_agent.clone());
        run_scrape(fetcher, urls, &config, &args).await
    }
}

async fn run_scrape<F: ListingFetcher>(
    fetcher: F,
    urls: UrlList,
    config: &ScraperConfig,
    args: &ScrapeArgs,
) -> Result<()> {
    let scraper = ConcordiaScraper::new(fetcher).with_university_id(config.university_id);
    let pipeline = Pipeline::new(scraper, urls.urls).with_retry_policy(config.retry_policy());

    let courses = match (args.start, args.count) {
        (Some(start), Some(count)) => pipeline.scrape_range(start, count).await?,
        _ => pipeline.scrape_all().await,
    };

    if args.dry_run {
        println!("Scraped {} courses (dry run, nothing stored)", courses.len());
        return Ok(());
    }

    let db = CourseDbManager::new(&args.db)?;
    db.replace_all(&courses)
        .with_context(|| format!("Failed to store courses in {}", args.db))?;

    println!("Scraped and stored {} courses in {}", courses.len(), args.db);
    Ok(())
}

fn search(args: SearchArgs) -> Result<()> {
    let db = CourseDbManager::new(&args.db)?;
    let courses = db.read_all()?;

    let params = SearchParameters {
        university_id: args.university,
        course_type: args.course_type,
        number: args.number,
        name: args.name,
        credits: args.credits,
        keywords: args.keywords,
        components: args.components,
    };

    let found = search_courses(&params, &courses);
    println!("{}", serde_json::to_string_pretty(&found)?);
    Ok(())
}
