use crate::app::config::ConveyConfig;
use anyhow::Error;
use parking_lot::{RwLock, RwLockReadGuard};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Loads and maybe in the future watches the local cfg file for
/// changes.. keeping the lock here lets us do that if wanted
pub struct ConfigManager {
    path: PathBuf,
    cfg: Arc<RwLock<ConveyConfig>>,
    started: AtomicBool,
}

impl ConfigManager {
    fn reload(&self) -> Result<(), Error> {
        let cfg = ConveyConfig::load(&self.path)?;
        *self.cfg.write() = cfg;

        Ok(())
    }

    pub fn new(cfg_path: PathBuf) -> ConfigManager {
        ConfigManager {
            path: cfg_path,
            cfg: Arc::new(RwLock::new(ConveyConfig::default())),
            started: AtomicBool::new(false),
        }
    }

    /// Loads and validates the initial config
    pub fn start(&self) -> Result<(), Error> {
        self.reload()?;
        self.cfg.read().validate()?;
        self.started.store(true, Ordering::Release);

        Ok(())
    }

    /// Get an immutable read for the current config
    pub fn get(&self) -> RwLockReadGuard<'_, ConveyConfig> {
        if !self.started.load(Ordering::Acquire) {
            panic!("ConfigManager not started yet but fetching config");
        }

        self.cfg.read()
    }
}
