use crate::config::HubConfig;
use crate::helpers::build_runner;
use crate::sim::Runner;
use crate::workloads::{ClassificationMeta, ExportMeta, FileMeta};

/// The three queues the dashboard shows, each with its own simulator.
#[derive(Clone)]
pub struct Hub {
    pub config: HubConfig,
    pub exports: Runner<ExportMeta>,
    pub ingestion: Runner<FileMeta>,
    pub classifications: Runner<ClassificationMeta>,
}

impl Hub {
    pub fn new(mut config: HubConfig) -> Self {
        config.normalize();
        Self {
            exports: build_runner(&config),
            ingestion: build_runner(&config),
            classifications: build_runner(&config),
            config,
        }
    }
}

impl Default for Hub {
    fn default() -> Self {
        Self::new(HubConfig::default())
    }
}
