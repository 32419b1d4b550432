pub(crate) mod base64;
pub(crate) mod condition;
pub(crate) mod policy;

use condition::ConditionMatch;
use thiserror::Error;

/// 上传策略错误
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum PolicyError {
    /// 匹配方式与调用的构造方法不符
    #[error("Match kind `{0}` cannot be used with a string value, use a range condition instead")]
    InvalidMatchKind(ConditionMatch),

    /// 上传策略 JSON 序列化错误
    #[error("Serialize policy as json error: {0}")]
    JSONError(#[from] serde_json::Error),
}

/// 上传策略结果
pub type PolicyResult<T> = Result<T, PolicyError>;
