use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::{
    clock::SystemClock,
    delivery::ConsoleCodeNotifier,
    facade::AuthFacade,
    navigation::{HistoryNavigator, Screen},
    storage::FileStorage,
    store::{SessionStore, StoreConfig},
};

/// Settings shared by every subcommand.
#[derive(Debug, Clone)]
pub struct GlobalArgs {
    pub data_dir: PathBuf,
    pub store_config: StoreConfig,
    pub latency: Duration,
}

impl GlobalArgs {
    #[must_use]
    pub fn new(data_dir: PathBuf) -> Self {
        Self {
            data_dir,
            store_config: StoreConfig::default(),
            latency: Duration::ZERO,
        }
    }

    #[must_use]
    pub fn with_store_config(mut self, store_config: StoreConfig) -> Self {
        self.store_config = store_config;
        self
    }

    #[must_use]
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Open the file-backed store and wrap it in a facade whose consumer
    /// starts out on `screen`.
    #[must_use]
    pub fn open(&self, screen: Screen) -> (AuthFacade, Arc<HistoryNavigator>) {
        let store = SessionStore::new(
            self.store_config,
            Arc::new(FileStorage::new(self.data_dir.clone())),
            Arc::new(ConsoleCodeNotifier),
            Arc::new(SystemClock),
        );
        let navigator = Arc::new(HistoryNavigator::new(screen));
        let facade = AuthFacade::new(store, navigator.clone()).with_latency(self.latency);
        (facade, navigator)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::navigation::Navigator;
    use anyhow::Result;

    #[test]
    fn test_global_args() {
        let args = GlobalArgs::new(PathBuf::from(".onboard"));
        assert_eq!(args.data_dir, PathBuf::from(".onboard"));
        assert_eq!(args.store_config.code_ttl_seconds(), 120);
        assert_eq!(args.store_config.max_attempts(), 3);
        assert_eq!(args.latency, Duration::ZERO);
    }

    #[tokio::test]
    async fn test_open_reads_data_dir() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let args = GlobalArgs::new(dir.path().to_path_buf())
            .with_store_config(StoreConfig::new().with_max_attempts(5));

        let (facade, navigator) = args.open(Screen::Register);
        assert!(!facade.is_authenticated());
        assert_eq!(facade.store().config().max_attempts(), 5);
        assert_eq!(navigator.current(), Screen::Register);
        Ok(())
    }
}
