use super::PolicyError;
use serde::ser::{Serialize, SerializeMap, SerializeTuple, Serializer};
use std::{borrow::Cow, fmt};

/// `x-amz-algorithm` 条件常用的签名算法
pub const AWS_V4_SIGNATURE_ALGORITHM: &str = "AWS4-HMAC-SHA256";

const STARTS_WITH: &str = "starts-with";

/// 条件字段名称
///
/// 除了下面列出的常用字段外，也可以使用任意字段名，例如 `x-amz-meta-*` 或 `x-amz-*`
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConditionKey(Cow<'static, str>);

impl ConditionKey {
    /// 对象 ACL
    pub const ACL: ConditionKey = ConditionKey::from_static("acl");
    /// 存储空间
    pub const BUCKET: ConditionKey = ConditionKey::from_static("bucket");
    /// 上传文件大小范围
    pub const CONTENT_LENGTH_RANGE: ConditionKey =
        ConditionKey::from_static("content-length-range");
    /// Cache-Control 头
    pub const CACHE_CONTROL: ConditionKey = ConditionKey::from_static("Cache-Control");
    /// Content-Type 头
    pub const CONTENT_TYPE: ConditionKey = ConditionKey::from_static("Content-Type");
    /// Content-Disposition 头
    pub const CONTENT_DISPOSITION: ConditionKey =
        ConditionKey::from_static("Content-Disposition");
    /// Content-Encoding 头
    pub const CONTENT_ENCODING: ConditionKey = ConditionKey::from_static("Content-Encoding");
    /// Expires 头
    pub const EXPIRES: ConditionKey = ConditionKey::from_static("Expires");
    /// 对象名称
    pub const KEY: ConditionKey = ConditionKey::from_static("key");
    /// 上传成功后的跳转地址
    pub const SUCCESS_ACTION_REDIRECT: ConditionKey =
        ConditionKey::from_static("success_action_redirect");
    /// 上传成功后的跳转地址（旧字段）
    pub const REDIRECT: ConditionKey = ConditionKey::from_static("redirect");
    /// 上传成功后返回的状态码
    pub const SUCCESS_ACTION_STATUS: ConditionKey =
        ConditionKey::from_static("success_action_status");
    /// 签名算法
    pub const AMZ_ALGORITHM: ConditionKey = ConditionKey::from_static("x-amz-algorithm");
    /// 签名凭证
    pub const AMZ_CREDENTIAL: ConditionKey = ConditionKey::from_static("x-amz-credential");
    /// 签名日期
    pub const AMZ_DATE: ConditionKey = ConditionKey::from_static("x-amz-date");
    /// 临时凭证的安全令牌
    pub const AMZ_SECURITY_TOKEN: ConditionKey =
        ConditionKey::from_static("x-amz-security-token");

    /// 创建条件字段名称
    #[inline]
    pub fn new(key: impl Into<Cow<'static, str>>) -> Self {
        Self(key.into())
    }

    #[inline]
    const fn from_static(key: &'static str) -> Self {
        Self(Cow::Borrowed(key))
    }

    /// 创建用户自定义元数据字段，即 `x-amz-meta-<name>`
    #[inline]
    pub fn amz_meta(name: impl AsRef<str>) -> Self {
        Self(Cow::Owned(format!("x-amz-meta-{}", name.as_ref())))
    }

    /// 创建扩展头字段，即 `x-amz-<name>`
    #[inline]
    pub fn amz(name: impl AsRef<str>) -> Self {
        Self(Cow::Owned(format!("x-amz-{}", name.as_ref())))
    }

    /// 获取字段名称
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for ConditionKey {
    #[inline]
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for ConditionKey {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&'static str> for ConditionKey {
    #[inline]
    fn from(key: &'static str) -> Self {
        Self::new(key)
    }
}

impl From<String> for ConditionKey {
    #[inline]
    fn from(key: String) -> Self {
        Self::new(key)
    }
}

/// 条件匹配方式
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ConditionMatch {
    /// 字段值必须与给定值完全相同
    Exact,
    /// 字段值必须以给定值作为前缀
    StartsWith,
    /// 字段值可以是任意值
    Any,
    /// 字段值必须落在给定的闭区间内，仅用于文件大小
    Range,
}

impl fmt::Display for ConditionMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ConditionMatch::Exact => "exact",
            ConditionMatch::StartsWith => "starts-with",
            ConditionMatch::Any => "any",
            ConditionMatch::Range => "range",
        };
        f.write_str(name)
    }
}

/// 上传策略中的单个条件
///
/// 每种匹配方式只携带它序列化时需要的数据，因此不存在匹配方式与数据不一致的条件
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Condition {
    /// 精确匹配，序列化为 `{"<key>": "<value>"}`
    Exact {
        /// 字段名称
        key: ConditionKey,
        /// 字段值
        value: String,
    },
    /// 前缀匹配，序列化为 `["starts-with", "$<key>", "<value>"]`
    StartsWith {
        /// 字段名称
        key: ConditionKey,
        /// 前缀
        value: String,
    },
    /// 任意值，序列化为 `["starts-with", "$<key>", ""]`
    Any {
        /// 字段名称
        key: ConditionKey,
    },
    /// 范围匹配，序列化为 `["<key>", "<lower>", "<upper>"]`
    Range {
        /// 字段名称
        key: ConditionKey,
        /// 下限（包含）
        lower: u64,
        /// 上限（包含）
        upper: u64,
    },
}

impl Condition {
    /// 根据匹配方式创建字符串值条件
    ///
    /// `ConditionMatch::Range` 不能在这里使用，请调用 [`Condition::new_range`]。
    /// `ConditionMatch::Any` 会忽略传入的值
    pub fn new_value(
        key: impl Into<ConditionKey>,
        value: impl Into<String>,
        match_kind: ConditionMatch,
    ) -> Result<Self, PolicyError> {
        let key = key.into();
        match match_kind {
            ConditionMatch::Exact => Ok(Self::exact(key, value)),
            ConditionMatch::StartsWith => Ok(Self::starts_with(key, value)),
            ConditionMatch::Any => Ok(Self::any(key)),
            ConditionMatch::Range => Err(PolicyError::InvalidMatchKind(match_kind)),
        }
    }

    /// 创建范围条件
    ///
    /// 不检查 `lower <= upper`
    #[inline]
    pub fn new_range(key: impl Into<ConditionKey>, lower: u64, upper: u64) -> Self {
        Self::Range {
            key: key.into(),
            lower,
            upper,
        }
    }

    /// 创建精确匹配条件
    #[inline]
    pub fn exact(key: impl Into<ConditionKey>, value: impl Into<String>) -> Self {
        Self::Exact {
            key: key.into(),
            value: value.into(),
        }
    }

    /// 创建前缀匹配条件
    #[inline]
    pub fn starts_with(key: impl Into<ConditionKey>, prefix: impl Into<String>) -> Self {
        Self::StartsWith {
            key: key.into(),
            value: prefix.into(),
        }
    }

    /// 创建任意值条件
    #[inline]
    pub fn any(key: impl Into<ConditionKey>) -> Self {
        Self::Any { key: key.into() }
    }

    /// 获取字段名称
    #[inline]
    pub fn key(&self) -> &ConditionKey {
        match self {
            Self::Exact { key, .. }
            | Self::StartsWith { key, .. }
            | Self::Any { key }
            | Self::Range { key, .. } => key,
        }
    }

    /// 获取匹配方式
    #[inline]
    pub fn match_kind(&self) -> ConditionMatch {
        match self {
            Self::Exact { .. } => ConditionMatch::Exact,
            Self::StartsWith { .. } => ConditionMatch::StartsWith,
            Self::Any { .. } => ConditionMatch::Any,
            Self::Range { .. } => ConditionMatch::Range,
        }
    }
}

impl Serialize for Condition {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Exact { key, value } => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry(key.as_str(), value)?;
                map.end()
            }
            Self::StartsWith { key, value } => {
                serialize_triple(serializer, STARTS_WITH, &format!("${}", key), value)
            }
            Self::Any { key } => {
                serialize_triple(serializer, STARTS_WITH, &format!("${}", key), "")
            }
            Self::Range { key, lower, upper } => serialize_triple(
                serializer,
                key.as_str(),
                &lower.to_string(),
                &upper.to_string(),
            ),
        }
    }
}

fn serialize_triple<S: Serializer>(
    serializer: S,
    first: &str,
    second: &str,
    third: &str,
) -> Result<S::Ok, S::Error> {
    let mut tuple = serializer.serialize_tuple(3)?;
    tuple.serialize_element(first)?;
    tuple.serialize_element(second)?;
    tuple.serialize_element(third)?;
    tuple.end()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value as JSONValue};
    use std::{error::Error, result::Result};

    #[test]
    fn test_exact_condition() -> Result<(), Box<dyn Error>> {
        let condition =
            Condition::new_value(ConditionKey::ACL, "public-read", ConditionMatch::Exact)?;
        assert_eq!(condition.match_kind(), ConditionMatch::Exact);
        assert_eq!(serde_json::to_string(&condition)?, r#"{"acl":"public-read"}"#);

        let value: JSONValue = serde_json::to_value(&condition)?;
        let map = value.as_object().unwrap();
        assert_eq!(map.len(), 1);
        assert_eq!(map.get("acl").and_then(|v| v.as_str()), Some("public-read"));
        Ok(())
    }

    #[test]
    fn test_exact_condition_with_escaped_chars() -> Result<(), Box<dyn Error>> {
        let condition = Condition::exact("x-amz-meta-note", "say \"hi\"\n");
        let value: JSONValue = serde_json::from_str(&serde_json::to_string(&condition)?)?;
        assert_eq!(value, json!({"x-amz-meta-note": "say \"hi\"\n"}));
        Ok(())
    }

    #[test]
    fn test_starts_with_condition() -> Result<(), Box<dyn Error>> {
        let condition =
            Condition::new_value(ConditionKey::KEY, "user/user1/", ConditionMatch::StartsWith)?;
        assert_eq!(
            serde_json::to_string(&condition)?,
            r#"["starts-with","$key","user/user1/"]"#
        );
        Ok(())
    }

    #[test]
    fn test_any_condition_ignores_value() -> Result<(), Box<dyn Error>> {
        let condition = Condition::new_value(
            ConditionKey::SUCCESS_ACTION_REDIRECT,
            "https://example.com/ignored",
            ConditionMatch::Any,
        )?;
        assert_eq!(condition, Condition::any("success_action_redirect"));
        assert_eq!(
            serde_json::to_string(&condition)?,
            r#"["starts-with","$success_action_redirect",""]"#
        );
        Ok(())
    }

    #[test]
    fn test_range_condition() -> Result<(), Box<dyn Error>> {
        let condition = Condition::new_range(ConditionKey::CONTENT_LENGTH_RANGE, 1048579, 10485760);
        assert_eq!(condition.match_kind(), ConditionMatch::Range);
        assert_eq!(
            serde_json::to_string(&condition)?,
            r#"["content-length-range","1048579","10485760"]"#
        );

        let condition = Condition::new_range("content-length-range", 0, u64::MAX);
        assert_eq!(
            serde_json::to_string(&condition)?,
            r#"["content-length-range","0","18446744073709551615"]"#
        );
        Ok(())
    }

    #[test]
    fn test_range_condition_with_inverted_bounds() -> Result<(), Box<dyn Error>> {
        let condition = Condition::new_range(ConditionKey::CONTENT_LENGTH_RANGE, 10, 1);
        assert_eq!(
            serde_json::to_string(&condition)?,
            r#"["content-length-range","10","1"]"#
        );
        Ok(())
    }

    #[test]
    fn test_value_condition_rejects_range() {
        let err = Condition::new_value(
            ConditionKey::CONTENT_LENGTH_RANGE,
            "0",
            ConditionMatch::Range,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            PolicyError::InvalidMatchKind(ConditionMatch::Range)
        ));
    }

    #[test]
    fn test_well_known_keys() {
        let keys = [
            (ConditionKey::ACL, "acl"),
            (ConditionKey::BUCKET, "bucket"),
            (ConditionKey::CONTENT_LENGTH_RANGE, "content-length-range"),
            (ConditionKey::CACHE_CONTROL, "Cache-Control"),
            (ConditionKey::CONTENT_TYPE, "Content-Type"),
            (ConditionKey::CONTENT_DISPOSITION, "Content-Disposition"),
            (ConditionKey::CONTENT_ENCODING, "Content-Encoding"),
            (ConditionKey::EXPIRES, "Expires"),
            (ConditionKey::KEY, "key"),
            (ConditionKey::SUCCESS_ACTION_REDIRECT, "success_action_redirect"),
            (ConditionKey::REDIRECT, "redirect"),
            (ConditionKey::SUCCESS_ACTION_STATUS, "success_action_status"),
            (ConditionKey::AMZ_ALGORITHM, "x-amz-algorithm"),
            (ConditionKey::AMZ_CREDENTIAL, "x-amz-credential"),
            (ConditionKey::AMZ_DATE, "x-amz-date"),
            (ConditionKey::AMZ_SECURITY_TOKEN, "x-amz-security-token"),
        ];
        for (key, expected) in keys.iter() {
            assert_eq!(key.as_str(), *expected);
            assert_eq!(key, &ConditionKey::from(*expected));
        }
        assert_eq!(AWS_V4_SIGNATURE_ALGORITHM, "AWS4-HMAC-SHA256");
    }

    #[test]
    fn test_custom_keys() {
        assert_eq!(ConditionKey::amz_meta("uuid").as_str(), "x-amz-meta-uuid");
        assert_eq!(ConditionKey::amz("storage-class").as_str(), "x-amz-storage-class");
        assert_eq!(ConditionKey::from(String::from("tagging")).to_string(), "tagging");
        assert_eq!(Condition::any(ConditionKey::amz_meta("tag")).key().as_str(), "x-amz-meta-tag");
    }
}
