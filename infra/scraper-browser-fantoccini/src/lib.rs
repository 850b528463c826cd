use std::{path::Path, time::Duration};

use fantoccini::{Client, ClientBuilder, Locator, error::CmdError, wd::TimeoutConfiguration};
use scraper_app::ports::browser::{BrowserError, BrowserLauncher, BrowserSession};
use serde_json::{Map, Value, json};

const ROW_XPATH: &str = "//table//tbody//tr[td]";

const USER_AGENT: &str =
    "user-agent=Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

const CHROME_ARGS: [&str; 6] = [
    "--headless",
    "--disable-dev-shm-usage",
    "--no-sandbox",
    "--disable-gpu",
    "--window-size=1920,1080",
    "--remote-debugging-port=9222",
];

pub struct ChromeSettings {
    pub webdriver_url: String,
    pub chrome_binary: Option<String>,
    pub implicit_wait: Duration,
    /// Pause after scrolling each row into view, for lazy cells to render.
    pub row_settle: Duration,
}

/// W3C capabilities for a headless Chrome session.
pub fn chrome_capabilities(chrome_binary: Option<&str>) -> Map<String, Value> {
    let mut args: Vec<&str> = CHROME_ARGS.to_vec();
    args.push(USER_AGENT);
    let mut chrome_options = json!({ "args": args });
    if let Some(binary) = chrome_binary {
        chrome_options["binary"] = Value::String(binary.to_string());
    }
    let mut caps = Map::new();
    caps.insert("browserName".to_string(), Value::String("chrome".to_string()));
    caps.insert("goog:chromeOptions".to_string(), chrome_options);
    caps
}

fn command_error(context: &str, e: CmdError) -> BrowserError {
    match e {
        CmdError::WaitTimeout => BrowserError::Timeout(context.to_string()),
        e => BrowserError::Command(format!("{}: {}", context, e)),
    }
}

pub struct FantocciniBrowserLauncher {
    settings: ChromeSettings,
}

impl FantocciniBrowserLauncher {
    pub fn new(settings: ChromeSettings) -> Self {
        Self { settings }
    }
}

#[async_trait::async_trait]
impl BrowserLauncher for FantocciniBrowserLauncher {
    async fn launch(&self) -> Result<Box<dyn BrowserSession + Send + Sync>, BrowserError> {
        log::debug!("Connecting to WebDriver at {}", self.settings.webdriver_url);
        let client = ClientBuilder::native()
            .capabilities(chrome_capabilities(self.settings.chrome_binary.as_deref()))
            .connect(&self.settings.webdriver_url)
            .await
            .map_err(|e| BrowserError::Launch(e.to_string()))?;

        let timeouts = TimeoutConfiguration::new(None, None, Some(self.settings.implicit_wait));
        if let Err(e) = client.update_timeouts(timeouts).await {
            let _ = client.clone().close().await;
            return Err(BrowserError::Launch(format!("failed to set implicit wait: {}", e)));
        }

        Ok(Box::new(FantocciniSession {
            client,
            row_settle: self.settings.row_settle,
        }))
    }
}

pub struct FantocciniSession {
    client: Client,
    row_settle: Duration,
}

impl FantocciniSession {
    async fn read_row(&self, row: &fantoccini::elements::Element) -> Result<Vec<String>, String> {
        let row_ref = serde_json::to_value(row).map_err(|e| e.to_string())?;
        self.client
            .execute("arguments[0].scrollIntoView(true);", vec![row_ref])
            .await
            .map_err(|e| e.to_string())?;
        tokio::time::sleep(self.row_settle).await;

        let cells = row
            .find_all(Locator::Css("td"))
            .await
            .map_err(|e| e.to_string())?;
        let mut texts = Vec::with_capacity(cells.len());
        for cell in cells {
            texts.push(cell.text().await.map_err(|e| e.to_string())?);
        }
        Ok(texts)
    }
}

#[async_trait::async_trait]
impl BrowserSession for FantocciniSession {
    async fn navigate(&self, url: &str) -> Result<(), BrowserError> {
        self.client
            .goto(url)
            .await
            .map_err(|e| command_error("navigate", e))
    }

    async fn scroll_by_viewport(&self) -> Result<(), BrowserError> {
        self.client
            .execute("window.scrollBy(0, window.innerHeight);", vec![])
            .await
            .map(|_| ())
            .map_err(|e| command_error("scroll by viewport", e))
    }

    async fn scroll_to_bottom(&self) -> Result<(), BrowserError> {
        self.client
            .execute(
                "window.scrollTo(0, document.documentElement.scrollHeight);",
                vec![],
            )
            .await
            .map(|_| ())
            .map_err(|e| command_error("scroll to bottom", e))
    }

    async fn scroll_height(&self) -> Result<i64, BrowserError> {
        let value = self
            .client
            .execute("return document.documentElement.scrollHeight", vec![])
            .await
            .map_err(|e| command_error("scroll height", e))?;
        value
            .as_i64()
            .or_else(|| value.as_f64().map(|h| h as i64))
            .ok_or_else(|| BrowserError::Command(format!("unexpected scroll height {}", value)))
    }

    async fn table_rows(&self, timeout: Duration) -> Result<Vec<Vec<String>>, BrowserError> {
        self.client
            .wait()
            .at_most(timeout)
            .for_element(Locator::XPath(ROW_XPATH))
            .await
            .map_err(|e| command_error("table rows", e))?;
        let rows = self
            .client
            .find_all(Locator::XPath(ROW_XPATH))
            .await
            .map_err(|e| command_error("table rows", e))?;

        let mut out = Vec::with_capacity(rows.len());
        for row in &rows {
            match self.read_row(row).await {
                Ok(cells) => out.push(cells),
                Err(e) => log::warn!("Error processing row: {}", e),
            }
        }
        Ok(out)
    }

    async fn save_screenshot(&self, path: &Path) -> Result<(), BrowserError> {
        let png = self
            .client
            .screenshot()
            .await
            .map_err(|e| command_error("screenshot", e))?;
        tokio::fs::write(path, png)
            .await
            .map_err(|e| BrowserError::Command(format!("write {}: {}", path.display(), e)))
    }

    async fn close(&self) -> Result<(), BrowserError> {
        self.client
            .clone()
            .close()
            .await
            .map_err(|e| command_error("close", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capabilities_request_headless_chrome() {
        let caps = chrome_capabilities(None);
        assert_eq!(caps["browserName"], "chrome");
        let args: Vec<&str> = caps["goog:chromeOptions"]["args"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|a| a.as_str())
            .collect();
        assert!(args.contains(&"--headless"));
        assert!(args.contains(&"--no-sandbox"));
        assert!(args.contains(&"--window-size=1920,1080"));
        assert!(args.iter().any(|a| a.starts_with("user-agent=")));
        assert!(caps["goog:chromeOptions"].get("binary").is_none());
    }

    #[test]
    fn test_capabilities_with_custom_binary() {
        let caps = chrome_capabilities(Some("/app/.apt/usr/bin/google-chrome"));
        assert_eq!(
            caps["goog:chromeOptions"]["binary"],
            "/app/.apt/usr/bin/google-chrome"
        );
    }

    #[test]
    fn test_wait_timeout_maps_to_timeout() {
        assert!(matches!(
            command_error("table rows", CmdError::WaitTimeout),
            BrowserError::Timeout(_)
        ));
    }
}
