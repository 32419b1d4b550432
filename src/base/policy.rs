use super::{
    super::config::{build_policy_from_env, Config},
    base64,
    condition::{Condition, ConditionKey, ConditionMatch},
    PolicyResult,
};
use chrono::{DateTime, Duration as ChronoDuration, NaiveDate, Utc};
use log::debug;
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::time::Duration;

const EXPIRATION_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

// `%Y` only stays four digits wide for years 0000..=9999
fn clamp_expiration(expiration: DateTime<Utc>) -> DateTime<Utc> {
    let earliest = DateTime::<Utc>::from_utc(NaiveDate::from_ymd(0, 1, 1).and_hms(0, 0, 0), Utc);
    let latest = DateTime::<Utc>::from_utc(
        NaiveDate::from_ymd(9999, 12, 31).and_hms_milli(23, 59, 59, 999),
        Utc,
    );
    expiration.max(earliest).min(latest)
}

/// 浏览器直传上传策略
///
/// 上传策略由过期时间和一组有序的条件组成，序列化后交给签名方计算签名，
/// 浏览器上传时必须满足其中的每一个条件
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PostPolicy {
    expiration: DateTime<Utc>,
    conditions: Vec<Condition>,
}

impl PostPolicy {
    /// 创建上传策略，指定过期时间
    ///
    /// 过期时间会被限制在 0000 年至 9999 年之间
    #[inline]
    pub fn new(expiration: impl Into<DateTime<Utc>>) -> Self {
        Self {
            expiration: clamp_expiration(expiration.into()),
            conditions: Vec::new(),
        }
    }

    /// 创建上传策略，过期时间为当前时间加上有效期
    pub fn new_with_lifetime(lifetime: Duration) -> Self {
        let lifetime =
            ChronoDuration::from_std(lifetime).unwrap_or_else(|_| ChronoDuration::max_value());
        Self::new(
            Utc::now()
                .checked_add_signed(lifetime)
                .unwrap_or(chrono::MAX_DATETIME),
        )
    }

    /// 根据上传策略配置信息创建上传策略
    #[inline]
    pub fn from_config(config: &Config) -> Self {
        config.build_policy()
    }

    /// 根据 POST_POLICY 环境变量指定的配置文件创建上传策略
    ///
    /// 如果没有设置该环境变量或配置文件无法读取，则返回 None
    #[inline]
    pub fn from_env() -> Option<Self> {
        build_policy_from_env()
    }

    /// 获取过期时间
    #[inline]
    pub fn expiration(&self) -> DateTime<Utc> {
        self.expiration
    }

    /// 设置过期时间，同样会被限制在 0000 年至 9999 年之间
    #[inline]
    pub fn set_expiration(&mut self, expiration: impl Into<DateTime<Utc>>) -> &mut Self {
        self.expiration = clamp_expiration(expiration.into());
        self
    }

    /// 获取格式化后的过期时间，毫秒以下的精度会被截断
    #[inline]
    pub fn formatted_expiration(&self) -> String {
        self.expiration.format(EXPIRATION_FORMAT).to_string()
    }

    /// 获取全部条件，按添加顺序排列
    #[inline]
    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    /// 添加字符串值条件
    ///
    /// 同一个字段可以添加多个条件。`ConditionMatch::Range` 不能在这里使用，
    /// 请调用 [`PostPolicy::set_range_condition`]
    pub fn set_condition(
        &mut self,
        key: impl Into<ConditionKey>,
        value: impl Into<String>,
        match_kind: ConditionMatch,
    ) -> PolicyResult<&mut Self> {
        let condition = Condition::new_value(key, value, match_kind)?;
        Ok(self.push(condition))
    }

    /// 添加范围条件
    #[inline]
    pub fn set_range_condition(
        &mut self,
        key: impl Into<ConditionKey>,
        lower: u64,
        upper: u64,
    ) -> &mut Self {
        self.push(Condition::new_range(key, lower, upper))
    }

    /// 添加已经构建好的条件
    #[inline]
    pub fn push(&mut self, condition: Condition) -> &mut Self {
        self.conditions.push(condition);
        self
    }

    /// 序列化为 JSON 字符串
    pub fn to_json(&self) -> PolicyResult<String> {
        let json = serde_json::to_string(self)?;
        debug!("post policy serialized: {}", json);
        Ok(json)
    }

    /// 序列化为 JSON 字节数组
    #[inline]
    pub fn to_json_vec(&self) -> PolicyResult<Vec<u8>> {
        self.to_json().map(String::into_bytes)
    }

    /// 序列化为 JSON 后进行标准 Base64 编码，即表单中 `policy` 字段的值
    #[inline]
    pub fn to_base64(&self) -> PolicyResult<String> {
        self.to_json().map(|json| base64::standard(json.as_bytes()))
    }

    /// 序列化为 JSON 后进行 URL 安全的 Base64 编码
    #[inline]
    pub fn to_urlsafe_base64(&self) -> PolicyResult<String> {
        self.to_json().map(|json| base64::urlsafe(json.as_bytes()))
    }
}

impl Serialize for PostPolicy {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry("expiration", &self.formatted_expiration())?;
        map.serialize_entry("conditions", &self.conditions)?;
        map.end()
    }
}
