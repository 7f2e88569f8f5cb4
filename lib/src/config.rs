use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, Chainable};
use crate::format::{Format, Toml};

pub const CONFIG_FILE: &str = "site.toml";

pub const CALENDAR_URL: &str = "https://calendar.google.com/calendar/embed?src=85b15423a562f0de4c47230084c68a284b5481593ec04121be2ef24f5a2926a2%40group.calendar.google.com&ctz=America%2FNew_York";
pub const MAP_URL: &str = "https://www.google.com/maps/embed?pb=!1m18!1m12!1m3!1d3300.7997000000003!2d-81.23456789999999!3d33.99999999999999!2m3!1f0!2f0!3f0!3m2!1i1024!2i768!4f13.1!3m3!1m2!1s0x88f8d9e0b0b0b0b0%3A0x0!2s320%20Corley%20Mill%20Rd%2C%20Lexington%2C%20SC%2029072!5e0!3m2!1sen!2sus!4v1678888888888!5m2!1sen!2sus";

/// A site's resolved configuration: its root directory and settings.
#[derive(Debug, Clone)]
pub struct Config {
    pub root: PathBuf,
    pub settings: Settings,
}

/// Site settings, read from `site.toml`. Every field is optional.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub title: String,
    pub output: PathBuf,
    pub members: PathBuf,
    pub instruments: PathBuf,
    pub templates: PathBuf,
    pub logo: PathBuf,
    pub stylesheet: PathBuf,
    pub static_dir: PathBuf,
    pub assets_dir: PathBuf,
    pub palette_size: usize,
    pub calendar_url: String,
    pub map_url: String,
    pub env: EnvVars,
}

/// Names of the environment variables read while rendering.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct EnvVars {
    pub analytics: String,
    pub maps_key: String,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            title: "Lexington Community Band".into(),
            output: "public".into(),
            members: "members.csv".into(),
            instruments: "data/instruments".into(),
            templates: "templates".into(),
            logo: "assets/LCB-Saxes-Logos-v1-Primary.png".into(),
            stylesheet: "static/css/style.css".into(),
            static_dir: "static".into(),
            assets_dir: "assets".into(),
            palette_size: 5,
            calendar_url: CALENDAR_URL.into(),
            map_url: MAP_URL.into(),
            env: EnvVars::default(),
        }
    }
}

impl Default for EnvVars {
    fn default() -> Self {
        EnvVars {
            analytics: "LCB_GOOGLE_ANALYTICS_ID".into(),
            maps_key: "LCB_GMAP_KEY".into(),
        }
    }
}

impl Config {
    /// Resolves the configuration for the site at `root`.
    ///
    /// If `file` is given it must exist, and a relative `root` defaults to
    /// the file's directory. Otherwise `site.toml` in `root` is read if it
    /// exists and defaults are used if it doesn't.
    pub fn discover(root: Option<&Path>, file: Option<&Path>) -> Result<Self> {
        let root = match (root, file) {
            (Some(root), _) => root.to_path_buf(),
            (None, Some(file)) => file.parent().map(Path::to_path_buf).unwrap_or_default(),
            (None, None) => PathBuf::new(),
        };

        let settings = match file {
            Some(file) => Self::read(file)?,
            None if root.join(CONFIG_FILE).is_file() => Self::read(&root.join(CONFIG_FILE))?,
            None => Settings::default(),
        };

        Ok(Config { root, settings })
    }

    fn read(file: &Path) -> Result<Settings> {
        Toml::read(file).chain_with(|| error! {
            "failed to read site configuration",
            "path" => file.display(),
        })
    }

    /// Resolves `path` against the site root.
    pub fn path<P: AsRef<Path>>(&self, path: P) -> PathBuf {
        self.root.join(path)
    }

    pub fn output_dir(&self) -> PathBuf {
        self.path(&self.settings.output)
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use crate::error::ErrorKind;

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("bandsite-config-{name}-{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn defaults_without_file() {
        let root = temp_dir("defaults");
        let config = Config::discover(Some(root.as_path()), None).unwrap();
        assert_eq!(config.settings, Settings::default());
        assert_eq!(config.settings.palette_size, 5);
        assert_eq!(config.output_dir(), root.join("public"));
        assert_eq!(config.path(&config.settings.stylesheet), root.join("static/css/style.css"));
    }

    #[test]
    fn site_toml_overrides_some_fields() {
        let root = temp_dir("partial");
        fs::write(root.join(CONFIG_FILE), "\
title = \"Test Band\"
palette_size = 3

[env]
maps_key = \"TEST_MAPS\"
").unwrap();

        let settings = Config::discover(Some(root.as_path()), None).unwrap().settings;
        assert_eq!(settings.title, "Test Band");
        assert_eq!(settings.palette_size, 3);
        assert_eq!(settings.env.maps_key, "TEST_MAPS");
        assert_eq!(settings.env.analytics, "LCB_GOOGLE_ANALYTICS_ID");
        assert_eq!(settings.output, PathBuf::from("public"));
    }

    #[test]
    fn explicit_file_sets_root() {
        let root = temp_dir("explicit");
        let file = root.join("other.toml");
        fs::write(&file, "output = \"dist\"").unwrap();

        let config = Config::discover(None, Some(file.as_path())).unwrap();
        assert_eq!(config.root, root);
        assert_eq!(config.output_dir(), root.join("dist"));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let root = temp_dir("unknown");
        fs::write(root.join(CONFIG_FILE), "titel = \"typo\"").unwrap();
        let error = Config::discover(Some(root.as_path()), None).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Parse);
    }
}
