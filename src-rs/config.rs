use crate::helpers::{env_bool, env_u16, env_u32, env_u64};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HubConfig {
    pub port: u16,
    pub tick_interval_ms: u64,
    pub progress_step: u32,
    pub auto_start: bool,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            tick_interval_ms: 500,
            progress_step: 10,
            auto_start: true,
        }
    }
}

impl HubConfig {
    /// Defaults overridden by `MARINE_HUB_*` variables. `PORT` is honored
    /// when `MARINE_HUB_PORT` is absent.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let port = env_u16("MARINE_HUB_PORT").or_else(|| env_u16("PORT"));
        let mut cfg = Self {
            port: port.unwrap_or(defaults.port),
            tick_interval_ms: env_u64("MARINE_HUB_TICK_MS").unwrap_or(defaults.tick_interval_ms),
            progress_step: env_u32("MARINE_HUB_PROGRESS_STEP").unwrap_or(defaults.progress_step),
            auto_start: env_bool("MARINE_HUB_AUTO_START").unwrap_or(defaults.auto_start),
        };
        cfg.normalize();
        cfg
    }

    pub fn normalize(&mut self) {
        if self.progress_step == 0 || self.progress_step > 100 {
            self.progress_step = Self::default().progress_step;
        }
        if self.tick_interval_ms == 0 {
            self.tick_interval_ms = Self::default().tick_interval_ms;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_replaces_unusable_values() {
        let mut cfg = HubConfig {
            port: 9000,
            tick_interval_ms: 0,
            progress_step: 250,
            auto_start: false,
        };
        cfg.normalize();
        assert_eq!(cfg.tick_interval_ms, 500);
        assert_eq!(cfg.progress_step, 10);
        assert_eq!(cfg.port, 9000);
        assert!(!cfg.auto_start);
    }
}
