//! Page-fetch collaborators: given a URL, produce rendered HTML.
//!
//! Fetching is synchronous; async callers should run it on a blocking thread.

use headless_chrome::{Browser, LaunchOptions};
use once_cell::sync::Lazy;
use rand::seq::SliceRandom;
use rand::Rng;
use std::ffi::OsStr;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::config::{FetchMode, ServiceConfig};
use crate::error::FetchError;

static USER_AGENTS: Lazy<Vec<&'static str>> = Lazy::new(|| {
    vec![
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/123.0.0.0 Safari/537.36",
        "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/123.0.0.0 Safari/537.36",
        "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/123.0.0.0 Safari/537.36",
    ]
});

const FALLBACK_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/123.0.0.0 Safari/537.36";

/// Hides the automation flag before any page script runs.
const MASK_WEBDRIVER_SCRIPT: &str =
    "Object.defineProperty(navigator, 'webdriver', { get: () => undefined });";

fn pick_user_agent() -> &'static str {
    USER_AGENTS
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or(FALLBACK_USER_AGENT)
}

/// Anything that can turn a product URL into page HTML.
pub trait PageFetcher: Send + Sync {
    fn fetch(&self, url: &str) -> Result<String, FetchError>;
}

/// Build the fetcher selected by configuration.
pub fn fetcher_from_config(config: &ServiceConfig) -> Box<dyn PageFetcher> {
    match config.fetch_mode {
        FetchMode::Chrome => Box::new(ChromeFetcher::new(config.hydration_wait, config.scroll_passes)),
        FetchMode::Http => Box::new(HttpFetcher::new()),
    }
}

/// Renders pages in a fresh headless Chrome per request.
#[derive(Debug, Clone)]
pub struct ChromeFetcher {
    hydration_wait: Duration,
    scroll_passes: u32,
    body_timeout: Duration,
}

impl Default for ChromeFetcher {
    fn default() -> Self {
        Self::new(Duration::from_secs(4), 3)
    }
}

impl ChromeFetcher {
    pub fn new(hydration_wait: Duration, scroll_passes: u32) -> Self {
        Self {
            hydration_wait,
            scroll_passes,
            body_timeout: Duration::from_secs(15),
        }
    }

    fn render(&self, url: &str) -> anyhow::Result<String> {
        let ua_arg = format!("--user-agent={}", pick_user_agent());
        let args = vec![
            OsStr::new("--disable-blink-features=AutomationControlled"),
            OsStr::new("--no-sandbox"),
            OsStr::new("--disable-dev-shm-usage"),
            OsStr::new("--disable-gpu"),
            OsStr::new("--disable-infobars"),
            OsStr::new("--headless=new"),
            OsStr::new(&ua_arg),
        ];

        let browser = Browser::new(LaunchOptions {
            headless: false, // new headless mode is selected via args
            window_size: Some((1920, 1080)),
            args,
            ..Default::default()
        })?;
        let tab = browser.new_tab()?;

        tab.call_method(headless_chrome::protocol::cdp::Page::AddScriptToEvaluateOnNewDocument {
            source: MASK_WEBDRIVER_SCRIPT.to_string(),
            world_name: None,
            include_command_line_api: None,
            run_immediately: None,
        })?;

        debug!("Navigating to: {}", url);
        tab.navigate_to(url)?;

        // wait for body only; ads and trackers often keep the load event pending
        if let Err(e) = tab.wait_for_element_with_custom_timeout("body", self.body_timeout) {
            warn!("Body wait timed out for {}: {}. Extracting anyway", url, e);
        }
        std::thread::sleep(self.hydration_wait);

        // lazy-loaded review sections only render after scrolling
        let mut rng = rand::thread_rng();
        for _ in 0..self.scroll_passes {
            let _ = tab.evaluate("window.scrollTo(0, document.body.scrollHeight);", false);
            std::thread::sleep(Duration::from_millis(rng.gen_range(1000..3000)));
        }

        Ok(tab.get_content()?)
    }
}

impl PageFetcher for ChromeFetcher {
    fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let started = Instant::now();
        let html = self
            .render(url)
            .map_err(|e| FetchError::Browser(e.to_string()))?;
        info!(
            "Rendered {} ({} bytes) in {:.1}s",
            url,
            html.len(),
            started.elapsed().as_secs_f64()
        );
        non_empty(url, html)
    }
}

/// Plain HTTP GET without JavaScript rendering.
pub struct HttpFetcher {
    client: reqwest::blocking::Client,
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpFetcher {
    pub fn new() -> Self {
        let client = reqwest::blocking::Client::builder()
            .user_agent(pick_user_agent())
            .redirect(reqwest::redirect::Policy::limited(10))
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_else(|e| {
                warn!("Falling back to default HTTP client: {}", e);
                reqwest::blocking::Client::new()
            });
        Self { client }
    }
}

impl PageFetcher for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let response = self
            .client
            .get(url)
            .header("Accept-Language", "en-US,en;q=0.9")
            .send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Http(format!("{} returned {}", url, status)));
        }
        debug!("Final URL after redirects: {}", response.url());

        let html = response.text()?;
        info!("Fetched {} ({} bytes)", url, html.len());
        non_empty(url, html)
    }
}

fn non_empty(url: &str, html: String) -> Result<String, FetchError> {
    if html.trim().is_empty() {
        Err(FetchError::EmptyPage { url: url.to_string() })
    } else {
        Ok(html)
    }
}
