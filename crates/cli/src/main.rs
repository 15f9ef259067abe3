// ABOUTME: CLI for the mpt.ru page parser.
// ABOUTME: Fetches one page kind and prints the extracted records as JSON for verification.

use anyhow::{bail, Result};
use chrono::NaiveDate;
use clap::Parser;
use futures::StreamExt;
use mpt_parser::Client;
use serde_json::json;

/// Fetch one page kind from mpt.ru and print the extracted records as JSON.
#[derive(Parser, Debug)]
#[command(name = "mpt-cli")]
#[command(about = "Parse mpt.ru pages and print JSON", long_about = None)]
struct Args {
    /// Page to fetch: week, schedule, replacements, replacements-on,
    /// replacements-range, specialties, site, teachers.
    page: String,

    /// Calendar date (YYYY-MM-DD) for replacements-on and the start of
    /// replacements-range.
    #[arg(long)]
    date: Option<NaiveDate>,

    /// Exclusive end date (YYYY-MM-DD) for replacements-range.
    #[arg(long)]
    until: Option<NaiveDate>,

    /// Fuzzy specialty name (or exact code) for the site page.
    #[arg(long)]
    query: Option<String>,

    /// Override the publisher origin.
    #[arg(long)]
    base_url: Option<String>,

    /// Output compact JSON instead of pretty.
    #[arg(long, default_value_t = false)]
    compact: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut builder = Client::builder();
    if let Some(ref base) = args.base_url {
        builder = builder.base_url(base.clone());
    }
    let client = builder.build();

    let value = match args.page.as_str() {
        "week" => json!(client.current_week().await?.to_string()),
        "schedule" => json!(client.schedule().await?),
        "replacements" => json!(client.replacements().await?),
        "replacements-on" => {
            let Some(date) = args.date else {
                bail!("--date is required for replacements-on");
            };
            json!(client.replacements_on(date).await?)
        }
        "replacements-range" => {
            let (Some(from), Some(until)) = (args.date, args.until) else {
                bail!("--date and --until are required for replacements-range");
            };
            let mut days = Vec::new();
            let mut stream = std::pin::pin!(client.replacements_range(from, until));
            while let Some(day) = stream.next().await {
                days.push(day?);
            }
            json!(days)
        }
        "specialties" => json!(client.specialties().await?),
        "site" => {
            let Some(ref query) = args.query else {
                bail!("--query is required for site");
            };
            json!(client.specialty_site(query).await?)
        }
        "teachers" => json!(client.teachers().await?),
        other => bail!("unknown page {:?}", other),
    };

    let rendered = if args.compact {
        serde_json::to_string(&value)?
    } else {
        serde_json::to_string_pretty(&value)?
    };
    println!("{}", rendered);

    Ok(())
}
