use serde::{Deserialize, Deserializer};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use unsegen::input::Key;

use crate::cmds::{Cmd, FormTarget};
use crate::error::Result;

pub type KeyMap = HashMap<Key, Cmd>;

const CONFIG_PATH_ENV_VAR: &str = "YEARCAL_CONFIG_FILE";

pub(crate) fn find_configfile_locations() -> Vec<PathBuf> {
    let mut locations = Vec::new();

    if let Ok(path) = env::var(CONFIG_PATH_ENV_VAR) {
        locations.push(PathBuf::from(path));
    }

    if let Some(dir) = dirs::config_dir() {
        locations.push(dir.join("yearcal").join("config.toml"));
    }

    if let Some(home) = dirs::home_dir() {
        locations.push(home.join(".yearcal.toml"));
    }

    locations
}

fn deserialize_millis<'de, D>(deserializer: D) -> std::result::Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    u64::deserialize(deserializer).map(Duration::from_millis)
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    #[serde(skip)]
    pub key_map: KeyMap,
    #[serde(deserialize_with = "deserialize_millis")]
    pub tick_rate: Duration,
    pub scrolloff: usize,
    pub today_char: char,
    pub event_char: char,
    pub show_padding: bool,
}

impl Default for Config {
    fn default() -> Config {
        let mut config = Config {
            key_map: HashMap::new(),
            tick_rate: Duration::from_millis(500),
            scrolloff: 2,
            today_char: '*',
            event_char: '•',
            show_padding: true,
        };

        let bindings = [
            (Key::Char('l'), Cmd::NextDay),
            (Key::Right, Cmd::NextDay),
            (Key::Char('h'), Cmd::PrevDay),
            (Key::Left, Cmd::PrevDay),
            (Key::Char('j'), Cmd::NextWeek),
            (Key::Down, Cmd::NextWeek),
            (Key::Char('k'), Cmd::PrevWeek),
            (Key::Up, Cmd::PrevWeek),
            (Key::Char('H'), Cmd::PrevYear),
            (Key::Char('L'), Cmd::NextYear),
            (Key::Char('t'), Cmd::Today),
            (Key::Char('\n'), Cmd::OpenPopup),
            (Key::Char(']'), Cmd::NextEvent),
            (Key::Char('['), Cmd::PrevEvent),
            (Key::Char('e'), Cmd::StartEdit),
            (Key::Char('d'), Cmd::DeleteEvent),
            (Key::Char('i'), Cmd::OpenForm(FormTarget::Popup)),
            (Key::Char('a'), Cmd::OpenForm(FormTarget::Today)),
            (Key::Char('m'), Cmd::DragStart),
            (Key::Char('p'), Cmd::Drop),
            (Key::Char(':'), Cmd::CommandMode),
            (Key::Char('q'), Cmd::Exit),
        ];
        config.key_map.extend(bindings.iter().cloned());

        config
    }
}

impl Config {
    pub fn from_toml(content: &str) -> Result<Config> {
        Ok(toml::from_str(content)?)
    }

    pub fn load(path: &Path) -> Result<Config> {
        log::info!("loading config from {}", path.display());
        Config::from_toml(&fs::read_to_string(path)?)
    }
}

/// Loads `path` if given, otherwise the first config file found in the
/// usual locations, otherwise the defaults.
pub fn load_suitable_config(path: Option<&Path>) -> Result<Config> {
    if let Some(path) = path {
        return Config::load(path);
    }

    match find_configfile_locations().iter().find(|p| p.is_file()) {
        Some(path) => Config::load(path),
        None => {
            log::info!("no config file found, using defaults");
            Ok(Config::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config.tick_rate, Duration::from_millis(500));
        assert_eq!(config.scrolloff, 2);
        assert!(config.show_padding);
        assert_eq!(config.key_map.get(&Key::Char('q')), Some(&Cmd::Exit));
    }

    #[test]
    fn values_override_defaults() {
        let config = Config::from_toml(
            r##"
            tick_rate = 250
            scrolloff = 4
            today_char = "#"
            show_padding = false
            "##,
        )
        .unwrap();

        assert_eq!(config.tick_rate, Duration::from_millis(250));
        assert_eq!(config.scrolloff, 4);
        assert_eq!(config.today_char, '#');
        assert_eq!(config.event_char, '•');
        assert!(!config.show_padding);
        assert_eq!(config.key_map.get(&Key::Char('j')), Some(&Cmd::NextWeek));
    }

    #[test]
    fn malformed_file_is_a_config_error() {
        let err = Config::from_toml("scrolloff = \"many\"").unwrap_err();
        assert!(matches!(err.kind, crate::error::ErrorKind::ConfigParse));
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        assert!(load_suitable_config(Some(Path::new("/nonexistent/yearcal.toml"))).is_err());
    }
}
