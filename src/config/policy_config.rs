use super::ConfigParseError;
use crate::base::{
    condition::{Condition, ConditionKey},
    policy::PostPolicy,
};
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use serde::{Deserialize, Serialize};
use std::{
    path::{Path, PathBuf},
    time::Duration,
};
use tap::TapFallible;

const DEFAULT_LIFETIME: Duration = Duration::from_secs(3600);

/// 上传策略配置信息
///
/// 用于从配置文件生成固定格式的上传策略
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq, Debug, Default)]
pub struct Config {
    bucket: String,

    #[serde(alias = "prefix")]
    key_prefix: Option<String>,

    acl: Option<String>,
    lifetime_s: Option<u64>,
    min_content_length: Option<u64>,
    max_content_length: Option<u64>,
    content_type_prefix: Option<String>,
    success_action_status: Option<u16>,
    success_action_redirect: Option<String>,

    #[serde(alias = "x-amz-algorithm")]
    algorithm: Option<String>,

    #[serde(skip)]
    extra: Extra,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
struct Extra {
    original_path: Option<PathBuf>,
}

impl Config {
    /// 创建上传策略配置信息构建器
    #[inline]
    pub fn builder(bucket: impl Into<String>) -> ConfigBuilder {
        ConfigBuilder::new(bucket)
    }

    pub(super) fn parse(path: &Path, bytes: &[u8]) -> Result<Self, ConfigParseError> {
        match path.extension().and_then(|s| s.to_str()) {
            Some("toml") => toml::from_slice(bytes).map_err(|err| err.into()),
            Some("json") => serde_json::from_slice(bytes).map_err(|err| err.into()),
            _ => Err(ConfigParseError::UnsupportedExtension(path.to_owned())),
        }
        .tap_ok_mut(|config: &mut Self| {
            config.extra.original_path = Some(path.to_owned());
        })
    }

    /// 根据配置生成上传策略，过期时间从当前时间开始计算
    #[inline]
    pub fn build_policy(&self) -> PostPolicy {
        self.build_policy_at(Utc::now())
    }

    /// 根据配置生成上传策略，过期时间从给定时间开始计算
    pub fn build_policy_at(&self, now: DateTime<Utc>) -> PostPolicy {
        let lifetime = ChronoDuration::from_std(self.lifetime())
            .unwrap_or_else(|_| ChronoDuration::max_value());
        let mut policy = PostPolicy::new(
            now.checked_add_signed(lifetime)
                .unwrap_or(chrono::MAX_DATETIME),
        );

        policy.push(Condition::exact(ConditionKey::BUCKET, self.bucket.to_owned()));

        match self.key_prefix.as_deref() {
            Some(prefix) if !prefix.is_empty() => {
                policy.push(Condition::starts_with(ConditionKey::KEY, prefix));
            }
            _ => {
                policy.push(Condition::any(ConditionKey::KEY));
            }
        }

        if let Some(acl) = &self.acl {
            policy.push(Condition::exact(ConditionKey::ACL, acl.to_owned()));
        }

        if let Some(status) = self.success_action_status {
            policy.push(Condition::exact(
                ConditionKey::SUCCESS_ACTION_STATUS,
                status.to_string(),
            ));
        }

        if let Some(redirect) = &self.success_action_redirect {
            policy.push(Condition::exact(
                ConditionKey::SUCCESS_ACTION_REDIRECT,
                redirect.to_owned(),
            ));
        }

        if let Some(content_type_prefix) = &self.content_type_prefix {
            policy.push(Condition::starts_with(
                ConditionKey::CONTENT_TYPE,
                content_type_prefix.to_owned(),
            ));
        }

        if self.min_content_length.is_some() || self.max_content_length.is_some() {
            policy.set_range_condition(
                ConditionKey::CONTENT_LENGTH_RANGE,
                self.min_content_length.unwrap_or(0),
                self.max_content_length.unwrap_or(u64::MAX),
            );
        }

        if let Some(algorithm) = &self.algorithm {
            policy.push(Condition::exact(
                ConditionKey::AMZ_ALGORITHM,
                algorithm.to_owned(),
            ));
        }

        policy
    }

    /// 获取存储空间
    #[inline]
    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// 设置存储空间
    #[inline]
    pub fn set_bucket(&mut self, bucket: impl Into<String>) -> &mut Self {
        self.bucket = bucket.into();
        self
    }

    /// 获取对象名称前缀
    #[inline]
    pub fn key_prefix(&self) -> Option<&str> {
        self.key_prefix.as_deref()
    }

    /// 设置对象名称前缀
    #[inline]
    pub fn set_key_prefix(&mut self, key_prefix: Option<impl Into<String>>) -> &mut Self {
        self.key_prefix = key_prefix.map(|prefix| prefix.into());
        self
    }

    /// 获取对象 ACL
    #[inline]
    pub fn acl(&self) -> Option<&str> {
        self.acl.as_deref()
    }

    /// 设置对象 ACL
    #[inline]
    pub fn set_acl(&mut self, acl: Option<impl Into<String>>) -> &mut Self {
        self.acl = acl.map(|acl| acl.into());
        self
    }

    /// 获取上传策略有效期，未设置时为一小时
    #[inline]
    pub fn lifetime(&self) -> Duration {
        self.lifetime_s
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_LIFETIME)
    }

    /// 设置上传策略有效期，不足一秒的部分向上取整
    #[inline]
    pub fn set_lifetime(&mut self, lifetime: Option<Duration>) -> &mut Self {
        self.lifetime_s = lifetime.map(|lifetime| {
            if lifetime.subsec_nanos() > 0 {
                lifetime.as_secs().saturating_add(1)
            } else {
                lifetime.as_secs()
            }
        });
        self
    }

    /// 获取上传文件的最小尺寸
    #[inline]
    pub fn min_content_length(&self) -> Option<u64> {
        self.min_content_length
    }

    /// 设置上传文件的最小尺寸
    #[inline]
    pub fn set_min_content_length(&mut self, min_content_length: Option<u64>) -> &mut Self {
        self.min_content_length = min_content_length;
        self
    }

    /// 获取上传文件的最大尺寸
    #[inline]
    pub fn max_content_length(&self) -> Option<u64> {
        self.max_content_length
    }

    /// 设置上传文件的最大尺寸
    #[inline]
    pub fn set_max_content_length(&mut self, max_content_length: Option<u64>) -> &mut Self {
        self.max_content_length = max_content_length;
        self
    }

    /// 获取 Content-Type 前缀
    #[inline]
    pub fn content_type_prefix(&self) -> Option<&str> {
        self.content_type_prefix.as_deref()
    }

    /// 设置 Content-Type 前缀
    #[inline]
    pub fn set_content_type_prefix(
        &mut self,
        content_type_prefix: Option<impl Into<String>>,
    ) -> &mut Self {
        self.content_type_prefix = content_type_prefix.map(|prefix| prefix.into());
        self
    }

    /// 获取上传成功后返回的状态码
    #[inline]
    pub fn success_action_status(&self) -> Option<u16> {
        self.success_action_status
    }

    /// 设置上传成功后返回的状态码
    #[inline]
    pub fn set_success_action_status(&mut self, status: Option<u16>) -> &mut Self {
        self.success_action_status = status;
        self
    }

    /// 获取上传成功后的跳转地址
    #[inline]
    pub fn success_action_redirect(&self) -> Option<&str> {
        self.success_action_redirect.as_deref()
    }

    /// 设置上传成功后的跳转地址
    #[inline]
    pub fn set_success_action_redirect(
        &mut self,
        redirect: Option<impl Into<String>>,
    ) -> &mut Self {
        self.success_action_redirect = redirect.map(|redirect| redirect.into());
        self
    }

    /// 获取签名算法
    #[inline]
    pub fn algorithm(&self) -> Option<&str> {
        self.algorithm.as_deref()
    }

    /// 设置签名算法
    #[inline]
    pub fn set_algorithm(&mut self, algorithm: Option<impl Into<String>>) -> &mut Self {
        self.algorithm = algorithm.map(|algorithm| algorithm.into());
        self
    }

    /// 获取配置文件路径
    #[inline]
    pub fn original_path(&self) -> Option<&Path> {
        self.extra.original_path.as_deref()
    }

    #[inline]
    #[cfg(test)]
    pub(crate) fn original_path_mut(&mut self) -> &mut Option<PathBuf> {
        &mut self.extra.original_path
    }
}

/// 上传策略配置信息构建器
#[derive(Debug)]
pub struct ConfigBuilder {
    inner: Config,
}

impl ConfigBuilder {
    /// 创建上传策略配置信息构建器
    #[inline]
    pub fn new(bucket: impl Into<String>) -> Self {
        Self {
            inner: Config {
                bucket: bucket.into(),
                ..Default::default()
            },
        }
    }

    /// 构建上传策略配置信息
    #[inline]
    pub fn build(self) -> Config {
        self.inner
    }

    /// 设置对象名称前缀
    #[inline]
    pub fn key_prefix(mut self, key_prefix: impl Into<String>) -> Self {
        self.inner.set_key_prefix(Some(key_prefix));
        self
    }

    /// 设置对象 ACL
    #[inline]
    pub fn acl(mut self, acl: impl Into<String>) -> Self {
        self.inner.set_acl(Some(acl));
        self
    }

    /// 设置上传策略有效期
    #[inline]
    pub fn lifetime(mut self, lifetime: Duration) -> Self {
        self.inner.set_lifetime(Some(lifetime));
        self
    }

    /// 设置上传文件的尺寸范围
    #[inline]
    pub fn content_length_range(mut self, min: u64, max: u64) -> Self {
        self.inner
            .set_min_content_length(Some(min))
            .set_max_content_length(Some(max));
        self
    }

    /// 设置 Content-Type 前缀
    #[inline]
    pub fn content_type_prefix(mut self, content_type_prefix: impl Into<String>) -> Self {
        self.inner.set_content_type_prefix(Some(content_type_prefix));
        self
    }

    /// 设置上传成功后返回的状态码
    #[inline]
    pub fn success_action_status(mut self, status: u16) -> Self {
        self.inner.set_success_action_status(Some(status));
        self
    }

    /// 设置上传成功后的跳转地址
    #[inline]
    pub fn success_action_redirect(mut self, redirect: impl Into<String>) -> Self {
        self.inner.set_success_action_redirect(Some(redirect));
        self
    }

    /// 设置签名算法
    #[inline]
    pub fn algorithm(mut self, algorithm: impl Into<String>) -> Self {
        self.inner.set_algorithm(Some(algorithm));
        self
    }
}
