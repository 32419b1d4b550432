#![warn(missing_docs)]

//! # qiniu-post-policy
//!
//! ## 浏览器直传上传策略
//!
//! 负责生成浏览器直传对象存储时使用的 POST 上传策略文档。
//! 上传策略只负责生成文档本身，签名计算与表单构建由调用方完成
//!
//! ```
//! use qiniu_post_policy::{ConditionKey, ConditionMatch, PostPolicy};
//! use std::time::Duration;
//!
//! let mut policy = PostPolicy::new_with_lifetime(Duration::from_secs(3600));
//! policy
//!     .set_condition(ConditionKey::BUCKET, "test-bucket", ConditionMatch::Exact)
//!     .unwrap()
//!     .set_condition(ConditionKey::KEY, "user/user1/", ConditionMatch::StartsWith)
//!     .unwrap()
//!     .set_range_condition(ConditionKey::CONTENT_LENGTH_RANGE, 0, 10485760);
//! let policy_json = policy.to_json().unwrap();
//! ```

mod base;
mod config;

pub use base::{
    condition::{Condition, ConditionKey, ConditionMatch, AWS_V4_SIGNATURE_ALGORITHM},
    policy::PostPolicy,
    PolicyError, PolicyResult,
};
pub use config::{
    is_post_policy_enabled, reload_post_policy_config, set_post_policy_config, Config,
    ConfigBuilder, ConfigParseError,
};
