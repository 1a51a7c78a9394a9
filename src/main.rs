//! Internship assistant: command-line entrypoint.
//! Collects postings, syncs the tracker, drafts materials and schedules deadline reminders.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use internship_assistant::config::AppConfig;
use internship_assistant::generator::{build_language_model, generate_materials};
use internship_assistant::ingest::config::load_rules_default;
use internship_assistant::ingest::providers::amazon::AmazonScraper;
use internship_assistant::ingest::providers::fetch_jobs;
use internship_assistant::ingest::providers::generic::ScrapedFileSource;
use internship_assistant::ingest::providers::rss::RssSource;
use internship_assistant::ingest::providers::simplify::{
    SimplifyClient, SimplifySource, DEFAULT_QUERY,
};
use internship_assistant::ingest::types::{JobRecord, JobSource};
use internship_assistant::prep;
use internship_assistant::reminders::{self, Calendar, GoogleCalendar, NoopCalendar};
use internship_assistant::tracker::{ingest_jobs, MaterialRefs, NoopTracker, SheetsTracker, Tracker};

#[derive(Parser, Debug)]
#[command(
    name = "internship-assistant",
    version,
    about = "Collect internship postings, track applications and draft materials"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Collect postings from every configured source and append them to the tracker
    Fetch {
        /// Search query for the Simplify API
        #[arg(long, default_value = DEFAULT_QUERY)]
        query: String,

        /// Optional location filter passed to search sources
        #[arg(long)]
        location: Option<String>,

        /// Also scrape the Amazon Jobs search page
        #[arg(long, default_value_t = false)]
        amazon: bool,

        /// JSON array of postings written by an external scraper (repeatable)
        #[arg(long = "scraped", value_name = "PATH")]
        scraped: Vec<PathBuf>,

        /// Print collected records as JSON instead of writing to the tracker
        #[arg(long, default_value_t = false)]
        dry_run: bool,

        /// Print reminders for deadlines within this many days
        #[arg(long, default_value_t = 7)]
        remind_days: i64,
    },

    /// Draft tailored resume bullets and a cover letter for one posting
    Materials {
        #[arg(long)]
        company: String,

        #[arg(long)]
        role: String,

        /// File holding the job description text
        #[arg(long)]
        job_desc: PathBuf,

        /// File with one base resume bullet per line
        #[arg(long)]
        bullets: PathBuf,

        /// Write resume.txt and cover_letter.txt here and record the application
        #[arg(long)]
        out_dir: Option<PathBuf>,

        /// Apply link recorded with the application
        #[arg(long, default_value = "")]
        apply_link: String,
    },

    /// Put an application deadline on the calendar
    Deadline {
        #[arg(long)]
        title: String,

        /// ISO-8601 date or timestamp
        #[arg(long)]
        at: String,

        #[arg(long)]
        url: Option<String>,
    },

    /// Print a random interview practice question
    Practice {
        /// arrays | graphs | behavioral
        #[arg(long, default_value = prep::DEFAULT_DOMAIN)]
        domain: String,
    },
}

/// Compact text logs by default; `LOG_FORMAT=json` for structured output.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("internship_assistant=info,warn"));
    let json = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(fmt::layer().json().with_writer(std::io::stderr)).init();
    } else {
        registry
            .with(fmt::layer().compact().with_writer(std::io::stderr))
            .init();
    }
}

async fn open_tracker(cfg: &AppConfig) -> Result<Box<dyn Tracker>> {
    if cfg.spreadsheet_id.is_none() {
        tracing::info!("GOOGLE_SHEETS_SPREADSHEET_ID not set; tracker rows will only be logged");
        return Ok(Box::new(NoopTracker));
    }
    Ok(Box::new(SheetsTracker::connect(cfg).await?))
}

fn open_calendar(cfg: &AppConfig) -> Result<Box<dyn Calendar>> {
    if cfg.google_access_token.is_none() {
        tracing::info!("GOOGLE_ACCESS_TOKEN not set; calendar events will only be logged");
        return Ok(Box::new(NoopCalendar));
    }
    Ok(Box::new(GoogleCalendar::from_config(cfg)?))
}

fn build_sources(
    cfg: &AppConfig,
    query: &str,
    location: Option<String>,
    amazon: bool,
    scraped: &[PathBuf],
) -> Result<Vec<Box<dyn JobSource>>> {
    let mut sources: Vec<Box<dyn JobSource>> = Vec::new();

    let client = SimplifyClient::new(
        &cfg.simplify_base,
        cfg.simplify_api_key.clone(),
        cfg.http_timeout,
    )?;
    sources.push(Box::new(SimplifySource::new(client, query, location.clone())));

    if !cfg.rss_feeds.is_empty() {
        let extractor = load_rules_default()?;
        sources.push(Box::new(RssSource::over_http(
            cfg.rss_feeds.clone(),
            extractor,
            cfg.feed_delay,
            cfg.http_timeout,
        )?));
    }

    if amazon {
        sources.push(Box::new(AmazonScraper::new(query, location, cfg.http_timeout)?));
    }

    for path in scraped {
        sources.push(Box::new(ScrapedFileSource::new(path)));
    }
    Ok(sources)
}

async fn run_fetch(
    cfg: &AppConfig,
    query: &str,
    location: Option<String>,
    amazon: bool,
    scraped: &[PathBuf],
    dry_run: bool,
    remind_days: i64,
) -> Result<()> {
    let sources = build_sources(cfg, query, location, amazon, scraped)?;
    let jobs: Vec<JobRecord> = fetch_jobs(&sources).await;
    tracing::info!(count = jobs.len(), "postings collected");

    if dry_run {
        println!("{}", serde_json::to_string_pretty(&jobs)?);
    } else {
        let tracker = open_tracker(cfg).await?;
        let added = ingest_jobs(tracker.as_ref(), &jobs).await?;
        println!("Added {added} postings to the tracker");
    }

    let today = Utc::now().date_naive();
    reminders::notify(reminders::upcoming_deadlines(&jobs, today, remind_days));
    Ok(())
}

fn read_lines(path: &Path) -> Result<Vec<String>> {
    let raw = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    Ok(raw
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect())
}

async fn run_materials(
    cfg: &AppConfig,
    company: &str,
    role: &str,
    job_desc: &Path,
    bullets: &Path,
    out_dir: Option<&Path>,
    apply_link: &str,
) -> Result<()> {
    let desc = fs::read_to_string(job_desc)
        .with_context(|| format!("reading {}", job_desc.display()))?;
    let base = read_lines(bullets)?;
    let llm = build_language_model(&cfg.llm, cfg.http_timeout)?;
    tracing::info!(provider = llm.name(), "drafting materials");

    let materials = generate_materials(llm.as_ref(), company, role, &desc, &base).await?;

    let Some(dir) = out_dir else {
        println!("{}", serde_json::to_string_pretty(&materials)?);
        return Ok(());
    };

    fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    let resume_file = dir.join("resume.txt");
    let letter_file = dir.join("cover_letter.txt");
    fs::write(&resume_file, materials.bullets.join("\n"))
        .with_context(|| format!("writing {}", resume_file.display()))?;
    fs::write(&letter_file, &materials.cover_letter)
        .with_context(|| format!("writing {}", letter_file.display()))?;

    let job = JobRecord {
        company: company.to_string(),
        role: role.to_string(),
        apply_link: apply_link.to_string(),
        source: "manual".to_string(),
        ..Default::default()
    };
    let refs = MaterialRefs {
        resume_file: resume_file.display().to_string(),
        cover_letter_file: letter_file.display().to_string(),
    };
    open_tracker(cfg).await?.add_application(&job, &refs).await?;
    println!("Wrote {} and {}", refs.resume_file, refs.cover_letter_file);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env in local/dev; a missing file is fine.
    let _ = dotenvy::dotenv();
    init_tracing();

    let cli = Cli::parse();
    let cfg = AppConfig::from_env().context("loading configuration")?;

    match cli.command {
        Command::Fetch {
            query,
            location,
            amazon,
            scraped,
            dry_run,
            remind_days,
        } => run_fetch(&cfg, &query, location, amazon, &scraped, dry_run, remind_days).await,
        Command::Materials {
            company,
            role,
            job_desc,
            bullets,
            out_dir,
            apply_link,
        } => {
            run_materials(
                &cfg,
                &company,
                &role,
                &job_desc,
                &bullets,
                out_dir.as_deref(),
                &apply_link,
            )
            .await
        }
        Command::Deadline { title, at, url } => {
            let calendar = open_calendar(&cfg)?;
            let event = calendar.add_deadline(&title, &at, url.as_deref()).await?;
            if event.html_link.is_empty() {
                println!("Deadline validated (calendar disabled)");
            } else {
                println!("Created event: {}", event.html_link);
            }
            Ok(())
        }
        Command::Practice { domain } => {
            match prep::ask_random(&domain) {
                Some(q) => println!("{q}"),
                None => println!("No questions available"),
            }
            Ok(())
        }
    }
}
