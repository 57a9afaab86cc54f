use std::collections::HashMap;
use std::path::Path;
use std::sync::RwLock;
use std::sync::{RwLockReadGuard, RwLockWriteGuard};

use config::{Environment, Source};
use lazy_static::lazy_static;

use super::error::Result;

static DEFAULT_CONFIG: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/resources/default_config.toml"));

/// Prefix of environment variables overriding config keys, e.g. `SHOESIM_SEED`
const ENV_PREFIX: &str = "SHOESIM";

/// A new type to impl `config::Source`
#[derive(Debug, Clone, serde::Deserialize)]
struct Preset(HashMap<String, config::Value>);

impl config::Source for Preset {
    fn clone_into_box(&self) -> Box<dyn Source + Send + Sync> {
        Box::new(self.clone())
    }

    fn collect(&self) -> std::result::Result<HashMap<String, config::Value>, config::ConfigError> {
        let mut kv = self.0.clone();
        // make sure it's not getting endlessly recursive
        kv.remove("presets");
        Ok(kv)
    }
}

/// The main structure holding application config
pub struct AppConfig(config::Config);

impl AppConfig {
    fn new() -> Self {
        // Start with empty
        Self(config::Config::new())
    }

    /// Load the built-in defaults
    pub fn setup(&mut self) -> Result<&mut Self> {
        self.0
            .merge(config::File::from_str(DEFAULT_CONFIG, config::FileFormat::Toml))?;
        Ok(self)
    }

    /// Load config from a file
    pub fn use_file(&mut self, path: &Path) -> Result<&mut Self> {
        self.0.merge(config::File::from(path))?;
        Ok(self)
    }

    /// Deep-merge the table `presets.<name>` over the root
    pub fn use_preset(&mut self, name: &str) -> Result<&mut Self> {
        let preset: Preset = self.get(format!("presets.{}", name))?;
        self.0.merge(preset)?;
        Ok(self)
    }

    /// Merge settings with env variables, these win over everything else
    pub fn use_env(&mut self) -> Result<&mut Self> {
        self.0.merge(Environment::with_prefix(ENV_PREFIX))?;
        Ok(self)
    }

    /// Get a single value and deserialize to the given type
    pub fn get<T, K>(&self, key: K) -> Result<T>
    where
        // use DeserializeOwned, because we are reading CONFIG using RWLock
        // and the lock is released before returning. So T should not borrow
        // anything from CONFIG.
        T: serde::de::DeserializeOwned,
        K: AsRef<str>,
    {
        Ok(self.0.get(key.as_ref())?)
    }

    /// Deserialize the whole config to the given type
    pub fn fetch<T>(&self) -> Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        let t = self.0.clone().try_into()?;
        Ok(t)
    }
}

lazy_static! {
    /// global AppConfig instance
    static ref CONFIG: RwLock<AppConfig> = RwLock::new(AppConfig::new());
}

/// Load defaults, then the optional file and preset, then the environment
pub fn init(file: Option<&Path>, preset: Option<&str>) -> Result<()> {
    let mut cfg = config_mut();
    cfg.setup()?;
    if let Some(path) = file {
        cfg.use_file(path)?;
    }
    if let Some(name) = preset {
        cfg.use_preset(name)?;
    }
    cfg.use_env()?;
    Ok(())
}

/// global AppConfig instance
pub fn config() -> RwLockReadGuard<'static, AppConfig> {
    CONFIG.read().unwrap()
}

/// mutable global AppConfig instance
pub fn config_mut() -> RwLockWriteGuard<'static, AppConfig> {
    CONFIG.write().unwrap()
}

pub mod prelude {
    pub use super::{config, config_mut};
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CutoffPolicy, ShopParams, SimConfig};

    fn test_config() -> AppConfig {
        let mut config = AppConfig::new();
        config.setup().unwrap();
        config
            .use_file(Path::new(concat!(
                env!("CARGO_MANIFEST_DIR"),
                "/resources/test_config.toml"
            )))
            .unwrap();

        config
    }

    #[test]
    fn defaults_deserialize() {
        let mut config = AppConfig::new();
        config.setup().unwrap();

        let cfg: SimConfig = config.fetch().unwrap();
        assert_eq!(cfg.shop, ShopParams::default());
        assert_eq!(cfg.max_events, None);
    }

    #[test]
    fn file_overrides_defaults() {
        let config = test_config();

        let stock: u32 = config.get("shop.initial_stock").unwrap();
        let seed: String = config.get("seed").unwrap();
        assert_eq!(stock, 0);
        assert_eq!(seed, "test seed");

        // untouched keys keep their default
        let mean: f64 = config.get("shop.mean_interarrival").unwrap();
        assert!((mean - 20.0).abs() < f64::EPSILON);
    }

    #[test]
    fn preset() {
        let mut config = test_config();

        config.use_preset("late_close").unwrap();
        let shop: ShopParams = config.get("shop").unwrap();
        assert_eq!(shop.cutoff, CutoffPolicy::RejectLateDropOffs { after: 480.0 });
        // value from the file survives the preset
        assert_eq!(shop.initial_stock, 0);
    }
}
