use chrono::Local;
use clap::Parser;
use log::{error, info};
use std::path::PathBuf;

use presscrawl::{
    config, outlets, CancelToken, ChromeEngineFactory, CrawlConfig, CrawlError, Crawler, Outlet,
    RecordSink,
};

/// Collects one press outlet's politics articles from the Naver news portal
/// into a CSV report.
#[derive(Parser, Debug)]
#[command(name = "presscrawl", version)]
struct Cli {
    /// Outlet name as listed on the portal (e.g. 한겨레, KBS, 연합뉴스)
    outlet: String,

    /// Crawl back to this date inclusive (YYYY-MM-DD). Without it the walk
    /// continues until listings stop rendering.
    #[arg(long)]
    start_date: Option<String>,

    /// Most recent date to crawl (YYYY-MM-DD), defaults to today
    #[arg(long)]
    end_date: Option<String>,

    /// Directory the CSV report is written to
    #[arg(long, default_value = "data")]
    out_dir: PathBuf,

    /// Run the browser with a visible window
    #[arg(long)]
    headful: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .init();

    let cli = Cli::parse();

    // Validate everything before the browser ever launches.
    let end_date = match &cli.end_date {
        Some(raw) => config::parse_date(raw)?,
        None => Local::now().date_naive(),
    };
    let start_date = cli
        .start_date
        .as_deref()
        .map(config::parse_date)
        .transpose()?;

    let Some(oid) = outlets::resolve(&cli.outlet) else {
        error!(
            "unknown outlet `{}`; known outlets: {}",
            cli.outlet,
            outlets::known_outlets().join(", ")
        );
        return Err(CrawlError::UnknownOutlet(cli.outlet).into());
    };

    let mut crawl_config = CrawlConfig::new(end_date).with_out_dir(&cli.out_dir);
    if let Some(start) = start_date {
        crawl_config = crawl_config.with_start_date(start);
    }
    info!(
        "crawling {} (office {oid}) from {} back to {}",
        cli.outlet,
        end_date,
        start_date
            .map(|d| d.to_string())
            .unwrap_or_else(|| "wherever listings run out".to_string())
    );

    let cancel = CancelToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("interrupt received; finishing the current article, then flushing");
                cancel.cancel();
            }
        });
    }

    let crawler = Crawler::new(
        crawl_config.clone(),
        Outlet {
            name: cli.outlet.clone(),
            oid: oid.to_string(),
        },
    )
    .with_cancel_token(cancel);
    let factory = ChromeEngineFactory::new(!cli.headful);
    let mut sink = RecordSink::new();

    let crawl_outcome = crawler.run(&factory, &mut sink).await;

    // Whatever was collected gets flushed, even when the crawl itself ended
    // in an error.
    let mut flush_failure = None;
    if sink.is_empty() {
        info!("no politics articles were collected");
    } else {
        let path = crawl_config.output_path(&cli.outlet);
        match sink.flush(&path) {
            Ok(written) => info!(
                "{} article(s) written to {}",
                sink.len(),
                written.display()
            ),
            Err(e) => {
                error!(
                    "could not persist {} collected article(s): {e}",
                    sink.len()
                );
                flush_failure = Some(e);
            }
        }
    }

    crawler.stats().print_summary();

    crawl_outcome?;
    if let Some(e) = flush_failure {
        return Err(e.into());
    }
    Ok(())
}
