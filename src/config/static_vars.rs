use super::{load_config, Config};
use once_cell::sync::Lazy;
use std::sync::RwLock;

static POST_POLICY_CONFIG: Lazy<RwLock<Option<Config>>> =
    Lazy::new(|| RwLock::new(load_config()));

pub(super) fn post_policy_config() -> &'static RwLock<Option<Config>> {
    &POST_POLICY_CONFIG
}

#[cfg(test)]
pub(super) fn reset_static_vars() {
    *post_policy_config().write().unwrap() = load_config();
}
