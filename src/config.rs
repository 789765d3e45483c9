use std::{env, path::PathBuf};

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_DATA_PATH: &str = "data/items.json";
const THEME_FILE_NAME: &str = "theme";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub data_path: PathBuf,
    pub theme_path: PathBuf,
    pub seed_demo: bool,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let port = lookup("PORT")
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(DEFAULT_PORT);
        let data_path = lookup("APP_DATA_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_PATH));
        let theme_path = lookup("APP_THEME_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| data_path.with_file_name(THEME_FILE_NAME));
        let seed_demo = lookup("APP_SEED_DEMO")
            .map(|value| parse_flag(&value))
            .unwrap_or(true);

        Self {
            port,
            data_path,
            theme_path,
            seed_demo,
        }
    }
}

fn parse_flag(value: &str) -> bool {
    !matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "0" | "false" | "no" | "off"
    )
}
