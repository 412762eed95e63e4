use std::env;
use std::str::FromStr;

use crate::config::HubConfig;
use crate::job::SharedQueue;
use crate::sim::{Runner, SimSettings};
use crate::workloads::{new_queue, Workload};

fn env_parse<T: FromStr>(key: &str) -> Option<T> {
    let raw = env::var(key).ok()?;
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<T>().ok()
}

pub fn env_u16(key: &str) -> Option<u16> {
    env_parse(key)
}

pub fn env_u32(key: &str) -> Option<u32> {
    env_parse(key)
}

pub fn env_u64(key: &str) -> Option<u64> {
    env_parse(key)
}

pub fn env_bool(key: &str) -> Option<bool> {
    let raw = env::var(key).ok()?;
    parse_flag(&raw)
}

pub fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "on" | "true" | "1" | "yes" => Some(true),
        "off" | "false" | "0" | "no" => Some(false),
        _ => None,
    }
}

pub fn build_runner<W: Workload>(cfg: &HubConfig) -> Runner<W> {
    let queue: SharedQueue<W> = new_queue::<W>().shared();
    Runner::new(queue, SimSettings::from(cfg))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_accept_common_spellings() {
        assert_eq!(parse_flag("YES"), Some(true));
        assert_eq!(parse_flag(" off "), Some(false));
        assert_eq!(parse_flag("maybe"), None);
    }

    #[test]
    fn env_parse_ignores_blank_and_garbage() {
        env::set_var("MARINE_HUB_TEST_BLANK", "  ");
        env::set_var("MARINE_HUB_TEST_GARBAGE", "eighty");
        env::set_var("MARINE_HUB_TEST_PORT", " 9090 ");
        assert_eq!(env_u16("MARINE_HUB_TEST_BLANK"), None);
        assert_eq!(env_u16("MARINE_HUB_TEST_GARBAGE"), None);
        assert_eq!(env_u16("MARINE_HUB_TEST_PORT"), Some(9090));
        assert_eq!(env_u16("MARINE_HUB_TEST_UNSET"), None);
    }
}
