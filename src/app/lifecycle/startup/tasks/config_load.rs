use crate::app::lifecycle::context::StartupContext;
use crate::core::config_manager::ConfigManager;
use crate::core::pipeline::BlockingTask;
use anyhow::{Error, anyhow};
use std::sync::Arc;

pub(crate) struct ConfigLoadTask {
    manager: ConfigManager,
}

impl ConfigLoadTask {
    pub fn new(manager: ConfigManager) -> Self {
        Self { manager }
    }
}

impl BlockingTask<StartupContext, anyhow::Error> for ConfigLoadTask {
    fn run(&self, ctx: &StartupContext) -> Result<(), Error> {
        self.manager.start()?;

        // Logging is not up yet at this point
        println!("Config loaded");

        ctx.config
            .set(Arc::new(self.manager.get().clone()))
            .map_err(|_| anyhow!("Config already set on startup context"))?;

        Ok(())
    }
}
