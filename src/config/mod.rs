mod policy_config;
mod static_vars;

pub use policy_config::{Config, ConfigBuilder};

use super::base::policy::PostPolicy;
use log::{error, info, warn};
use static_vars::post_policy_config;
use std::{
    env, fs,
    path::{Path, PathBuf},
};
use tap::prelude::*;
use thiserror::Error;

const POST_POLICY_ENV: &str = "POST_POLICY";

/// 判断当前是否已经加载上传策略配置
///
/// 如果当前没有设置 POST_POLICY 环境变量，或加载该环境变量出现错误，则返回 false
#[inline]
pub fn is_post_policy_enabled() -> bool {
    post_policy_config().read().unwrap().is_some()
}

/// 手动设置上传策略配置
#[inline]
pub fn set_post_policy_config(config: Config) {
    let mut current = post_policy_config().write().unwrap();
    *current = Some(config);
    info!("POST_POLICY_CONFIG set: {:?}", *current);
}

/// 重新读取 POST_POLICY 环境变量指定的配置文件
///
/// 读取失败时保留当前配置
#[inline]
pub fn reload_post_policy_config() {
    if let Some(config) = load_config() {
        let mut current = post_policy_config().write().unwrap();
        *current = Some(config);
        info!("POST_POLICY_CONFIG reloaded: {:?}", *current);
    }
}

fn load_config() -> Option<Config> {
    env::var_os(POST_POLICY_ENV)
        .tap_none(|| warn!("POST_POLICY Env IS NOT ENABLED"))
        .and_then(|config_path| {
            fs::read(&config_path)
                .tap_err(|err| {
                    error!(
                        "Post policy config file ({:?}) cannot be open: {}",
                        config_path, err
                    )
                })
                .ok()
                .and_then(|config| {
                    Config::parse(Path::new(&config_path), &config)
                        .tap_err(|err| {
                            error!(
                                "Post policy config file ({:?}) cannot be deserialized: {}",
                                config_path, err
                            )
                        })
                        .ok()
                })
        })
}

pub(super) fn build_policy_from_env() -> Option<PostPolicy> {
    post_policy_config()
        .read()
        .unwrap()
        .as_ref()
        .map(|config| config.build_policy())
}

/// 上传策略配置信息解析错误
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ConfigParseError {
    /// 配置信息 JSON 解析错误
    #[error("Parse config as json error: {0}")]
    JSONError(#[from] serde_json::Error),

    /// 配置信息 TOML 解析错误
    #[error("Parse config as toml error: {0}")]
    TOMLError(#[from] toml::de::Error),

    /// 配置文件扩展名不是 .toml 或 .json
    #[error("Config file can only be .toml or .json: {0:?}")]
    UnsupportedExtension(PathBuf),
}

#[cfg(test)]
mod tests {
    use super::{static_vars::reset_static_vars, *};
    use crate::base::condition::{Condition, ConditionKey};
    use anyhow::Result;
    use std::{io::Write, time::Duration};
    use tempfile::Builder as TempFileBuilder;

    #[test]
    fn test_load_config() -> Result<()> {
        env_logger::try_init().ok();

        env::remove_var(POST_POLICY_ENV);
        reset_static_vars();
        assert!(!is_post_policy_enabled());
        assert!(PostPolicy::from_env().is_none());

        let mut config = ConfigBuilder::new("test-bucket-1")
            .key_prefix("user/user1/")
            .lifetime(Duration::from_secs(600))
            .build();

        let tempfile_path = {
            let mut tempfile = TempFileBuilder::new().suffix(".toml").tempfile()?;
            tempfile.write_all(&toml::to_vec(&config)?)?;
            tempfile.flush()?;
            env::set_var(POST_POLICY_ENV, tempfile.path().as_os_str());
            tempfile.into_temp_path()
        };
        *config.original_path_mut() = Some(tempfile_path.to_path_buf());

        assert_eq!(load_config().as_ref(), Some(&config));
        reset_static_vars();
        assert!(is_post_policy_enabled());

        let policy = PostPolicy::from_env().unwrap();
        assert_eq!(
            policy.conditions(),
            config.build_policy_at(policy.expiration()).conditions()
        );

        config.set_bucket("test-bucket-2");
        set_post_policy_config(config.to_owned());
        let policy = PostPolicy::from_env().unwrap();
        assert_eq!(policy.conditions(), PostPolicy::from_config(&config).conditions());

        env::set_var(POST_POLICY_ENV, tempfile_path.as_os_str());
        reload_post_policy_config();
        assert_eq!(
            PostPolicy::from_env().unwrap().conditions()[0],
            Condition::exact(ConditionKey::BUCKET, "test-bucket-1")
        );

        env::set_var(POST_POLICY_ENV, "/not/existed/post-policy.toml");
        reload_post_policy_config();
        assert!(is_post_policy_enabled());
        assert_eq!(
            PostPolicy::from_env().unwrap().conditions()[0],
            Condition::exact(ConditionKey::BUCKET, "test-bucket-1")
        );

        env::remove_var(POST_POLICY_ENV);
        reset_static_vars();
        assert!(!is_post_policy_enabled());

        Ok(())
    }
}
