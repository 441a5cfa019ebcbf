use super::{ApiConfig, Config, LogConfig, PathsConfig, PlayerConfig};

pub const API_BASE_URL: &str = "https://neteaseapi-enhanced.vercel.app";

/// Config written on first run.
pub fn defaults() -> Config {
    Config {
        api: ApiConfig::default(),
        player: PlayerConfig::default(),
        paths: PathsConfig::default(),
        log: LogConfig::default(),
    }
}
