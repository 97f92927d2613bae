pub struct Config {
    pub api_base_url: &'static str,
    /// How often poll cards re-check their deadlines against the local clock.
    pub clock_tick_ms: u32,
}

impl Config {
    pub const fn new() -> Self {
        Self {
            api_base_url: "/api",
            clock_tick_ms: 30_000,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_base_url, path)
    }
}

pub const CONFIG: Config = Config::new();
