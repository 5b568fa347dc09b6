use anyhow::{bail, Context, Result};
use std::path::Path;
use tracing_subscriber::EnvFilter;

use review_sentiment::classifier::Classification;
use review_sentiment::config::DEFAULT_MAX_REVIEWS;
use review_sentiment::extractor::Extractor;
use review_sentiment::fetch::{ChromeFetcher, PageFetcher};
use review_sentiment::{detect_product_type, ClassifyError, SentimentClassifier};

fn main() -> Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")))
        .init();

    let mut args = std::env::args().skip(1);
    let Some(target) = args.next() else {
        bail!("usage: debug_extract <url | page.html> [max_reviews]");
    };
    let max: usize = match args.next() {
        Some(raw) => raw.parse().with_context(|| format!("invalid max_reviews '{}'", raw))?,
        None => DEFAULT_MAX_REVIEWS,
    };

    let (html, url) = if Path::new(&target).is_file() {
        println!("Reading {}", target);
        let html = std::fs::read_to_string(&target).with_context(|| format!("reading {}", target))?;
        (html, target)
    } else {
        println!("Rendering {} in headless Chrome...", target);
        (ChromeFetcher::default().fetch(&target)?, target)
    };

    let extraction = Extractor::default().extract_capped(&html, &url, max);
    println!("Product:  {} (via {:?})", extraction.product.name, extraction.product.source);
    println!("Category: {}", detect_product_type(&url, &extraction.product.name));

    let Some(strategy) = extraction.strategy.as_deref() else {
        println!("No reviews found; the service would generate synthetic reviews.");
        return Ok(());
    };
    println!("Strategy: {} ({} reviews)", strategy, extraction.reviews.len());

    let classifier = SentimentClassifier::default();
    for (i, text) in extraction.reviews.iter().enumerate() {
        println!("{}", review_line(i + 1, text, classifier.explain(text)));
    }

    Ok(())
}

fn review_line(number: usize, text: &str, outcome: Result<Classification, ClassifyError>) -> String {
    match outcome {
        Ok(c) => format!(
            "{:>3}. [{:<8} {:+.3} {}] {}",
            number,
            c.sentiment.as_str(),
            c.score,
            c.rule.unwrap_or("threshold"),
            text
        ),
        Err(e) => format!("{:>3}. [skipped: {}] {}", number, e, text),
    }
}
