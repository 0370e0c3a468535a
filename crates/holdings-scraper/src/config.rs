use std::path::PathBuf;

pub const DEFAULT_URL: &str = "https://www.dataroma.com/m/rt.php";
pub const DEFAULT_PREFIX: &str = "dataroma_data";
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

#[derive(Debug, Clone)]
pub struct ScraperConfig {
    pub url: String,
    pub output_dir: PathBuf,
    pub file_prefix: String,
    pub user_agent: String,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_URL.to_string(),
            output_dir: PathBuf::from("."),
            file_prefix: DEFAULT_PREFIX.to_string(),
            user_agent: std::env::var("SCRAPER_USER_AGENT")
                .unwrap_or_else(|_| DEFAULT_USER_AGENT.to_string()),
        }
    }
}

fn flag_value<'a>(args: &'a [String], name: &str) -> Option<&'a str> {
    args.iter()
        .position(|a| a == name)
        .and_then(|i| args.get(i + 1))
        .map(|s| s.as_str())
}

impl ScraperConfig {
    /// Defaults overridden by `--url`, `--out-dir` and `--prefix`.
    pub fn from_args(args: &[String]) -> Self {
        let mut config = Self::default();
        if let Some(url) = flag_value(args, "--url") {
            config.url = url.to_string();
        }
        if let Some(dir) = flag_value(args, "--out-dir") {
            config.output_dir = PathBuf::from(dir);
        }
        if let Some(prefix) = flag_value(args, "--prefix") {
            config.file_prefix = prefix.to_string();
        }
        config
    }
}
