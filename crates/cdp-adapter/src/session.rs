use std::fs;
use std::sync::Arc;
use std::time::Duration;

use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::Page;
use futures::StreamExt;
use tokio::task::JoinHandle;
use tokio::time::{sleep, Instant};
use tracing::{debug, info, warn};

use crate::config::{parse_flag, CdpConfig};
use crate::error::{AdapterError, AdapterErrorKind};
use crate::page::ChromiumPage;

/// Live browser connection plus the tab the automation drives.
pub struct BrowserSession {
    browser: Browser,
    handler: JoinHandle<()>,
    page: Arc<ChromiumPage>,
    launched: bool,
}

impl BrowserSession {
    /// Connects to (or launches) the browser and attaches to the timesheet tab.
    pub async fn start(cfg: &CdpConfig) -> Result<Self, AdapterError> {
        let launched = cfg.websocket_url.is_none();
        let (browser, mut handler) = match &cfg.websocket_url {
            Some(url) => {
                info!(%url, "connecting to running browser");
                Browser::connect(url.clone()).await.map_err(|err| {
                    AdapterError::new(AdapterErrorKind::CdpIo)
                        .with_hint(format!("failed to connect to {url}: {err}"))
                })?
            }
            None => {
                let config = browser_config(cfg)?;
                info!(executable = %cfg.executable.display(), headless = cfg.headless, "launching browser");
                Browser::launch(config).await.map_err(|err| {
                    AdapterError::new(AdapterErrorKind::LaunchFailed)
                        .with_hint(format!("failed to launch chromium: {err}"))
                })?
            }
        };

        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(err) = event {
                    debug!(%err, "cdp handler event error");
                }
            }
        });

        let mut session_browser = browser;
        let page = match attach(&mut session_browser, cfg).await {
            Ok(page) => page,
            Err(err) => {
                handler_task.abort();
                return Err(err);
            }
        };

        Ok(Self {
            browser: session_browser,
            handler: handler_task,
            page: Arc::new(ChromiumPage::new(page)),
            launched,
        })
    }

    pub fn page(&self) -> Arc<ChromiumPage> {
        Arc::clone(&self.page)
    }

    /// Closes a launched browser; a browser we merely connected to stays open.
    pub async fn close(mut self) {
        if self.launched {
            if let Err(err) = self.browser.close().await {
                warn!(%err, "failed to close browser");
            }
        }
        self.handler.abort();
    }
}

async fn attach(browser: &mut Browser, cfg: &CdpConfig) -> Result<Page, AdapterError> {
    if let Err(err) = browser.fetch_targets().await {
        debug!(%err, "fetch_targets failed");
    }

    // Existing targets attach asynchronously after discovery.
    let deadline = Instant::now() + Duration::from_millis(cfg.launch_timeout_ms.min(3_000));
    loop {
        if let Some(page) = find_target(browser, &cfg.target_url_fragment).await? {
            return Ok(page);
        }
        if Instant::now() >= deadline {
            break;
        }
        sleep(Duration::from_millis(200)).await;
    }

    match &cfg.target_url {
        Some(url) => {
            info!(%url, "no matching tab, opening target url");
            browser.new_page(url.as_str()).await.map_err(AdapterError::cdp)
        }
        None => Err(AdapterError::new(AdapterErrorKind::TargetNotFound).with_hint(format!(
            "no tab whose url contains '{}'",
            cfg.target_url_fragment
        ))),
    }
}

async fn find_target(browser: &Browser, fragment: &str) -> Result<Option<Page>, AdapterError> {
    let pages = browser.pages().await.map_err(AdapterError::cdp)?;
    for page in pages {
        let url = page.url().await.map_err(AdapterError::cdp)?;
        if let Some(url) = url {
            if url.contains(fragment) {
                debug!(%url, "attached to timesheet tab");
                return Ok(Some(page));
            }
        }
    }
    Ok(None)
}

fn browser_config(cfg: &CdpConfig) -> Result<BrowserConfig, AdapterError> {
    let executable = cfg.resolve_executable().ok_or_else(|| {
        AdapterError::new(AdapterErrorKind::LaunchFailed)
            .with_hint("no chrome executable found; set AUTOINCUR_CHROME")
    })?;

    let profile_dir = if cfg.user_data_dir.is_absolute() {
        cfg.user_data_dir.clone()
    } else {
        let cwd = std::env::current_dir().map_err(|err| {
            AdapterError::new(AdapterErrorKind::Internal)
                .with_hint(format!("failed to resolve cwd for user-data-dir: {err}"))
        })?;
        cwd.join(&cfg.user_data_dir)
    };
    fs::create_dir_all(&profile_dir).map_err(|err| {
        AdapterError::new(AdapterErrorKind::Internal)
            .with_hint(format!("failed to ensure user-data-dir: {err}"))
    })?;

    let mut builder = BrowserConfig::builder()
        .request_timeout(Duration::from_millis(cfg.request_timeout_ms))
        .launch_timeout(Duration::from_millis(cfg.launch_timeout_ms))
        .chrome_executable(executable)
        .user_data_dir(profile_dir);

    if !cfg.headless {
        builder = builder.with_head();
    }

    if std::env::var("AUTOINCUR_DISABLE_SANDBOX")
        .ok()
        .and_then(|value| parse_flag(&value))
        .unwrap_or(false)
    {
        builder = builder.no_sandbox();
    }

    let mut args = vec![
        "--disable-background-timer-throttling",
        "--disable-breakpad",
        "--disable-default-apps",
        "--disable-dev-shm-usage",
        "--disable-popup-blocking",
        "--no-first-run",
        "--no-default-browser-check",
        "--password-store=basic",
    ];
    if cfg.headless {
        args.push("--headless=new");
    }
    builder = builder.args(args);

    builder.build().map_err(|err| {
        AdapterError::new(AdapterErrorKind::Internal).with_hint(format!("browser config error: {err}"))
    })
}
