//! 重试策略的配置面。
//!
//! # 契约说明（What）
//! - 键名为 snake_case，时长以毫秒整数表示；有符号类型使负值能够到达校验并得到明确的错误，
//!   而不是在反序列化阶段以类型错误失败；
//! - 未出现的键取零值，与 [`RetryPolicy`] 的“零即未设置”约定一致；未知键视为错误。
//!
//! ```toml
//! backoff_factor = 2.0
//! min_interval_ms = 100
//! max_interval_ms = 2000
//! max_iterations = 8
//! total_limit_ms = 10000
//! ```

use core::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::RetryPolicyError;
use crate::handler::RetryHandler;
use crate::policy::RetryPolicy;

/// 重试策略的可序列化配置记录。
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RetryConfig {
    /// 相邻间隔之比。
    pub backoff_factor: f64,
    /// 关闭间隔抖动。
    pub disable_jitter: bool,
    /// 单个间隔上限（毫秒）。
    pub max_interval_ms: i64,
    /// 尝试次数上限。
    pub max_iterations: u32,
    /// 起始间隔（毫秒）。
    pub min_interval_ms: i64,
    /// 间隔总和上限（毫秒）。
    pub total_limit_ms: i64,
}

impl RetryConfig {
    /// 解析 TOML 文本。
    pub fn from_toml_str(text: &str) -> Result<Self, RetryPolicyError> {
        toml::from_str(text).map_err(|err| RetryPolicyError::Config(err.to_string()))
    }

    /// 校验并构建重试处理器。
    pub fn build(self) -> Result<RetryHandler, RetryPolicyError> {
        RetryPolicy::try_from(self)?.build()
    }
}

impl TryFrom<RetryConfig> for RetryPolicy {
    type Error = RetryPolicyError;

    fn try_from(config: RetryConfig) -> Result<Self, Self::Error> {
        let min_interval = millis(config.min_interval_ms)
            .ok_or(RetryPolicyError::NegativeMinInterval(config.min_interval_ms))?;
        let max_interval = millis(config.max_interval_ms)
            .ok_or(RetryPolicyError::NegativeMaxInterval(config.max_interval_ms))?;
        let total_limit = millis(config.total_limit_ms)
            .ok_or(RetryPolicyError::NegativeTotalLimit(config.total_limit_ms))?;
        Ok(Self {
            backoff_factor: config.backoff_factor,
            disable_jitter: config.disable_jitter,
            max_interval,
            max_iterations: config.max_iterations,
            min_interval,
            total_limit,
        })
    }
}

fn millis(ms: i64) -> Option<Duration> {
    u64::try_from(ms).ok().map(Duration::from_millis)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_documented_example() {
        let config = RetryConfig::from_toml_str(
            r#"
            backoff_factor = 2.0
            min_interval_ms = 100
            max_interval_ms = 2000
            max_iterations = 8
            total_limit_ms = 10000
            "#,
        )
        .expect("valid toml");
        let policy = RetryPolicy::try_from(config).expect("non-negative");
        assert_eq!(policy.min_interval, Duration::from_millis(100));
        assert_eq!(policy.max_interval, Duration::from_secs(2));
        assert_eq!(policy.total_limit, Duration::from_secs(10));
        assert!(!policy.disable_jitter);
    }

    #[test]
    fn negative_values_are_named() {
        let negative_min = RetryConfig {
            max_iterations: 3,
            min_interval_ms: -1,
            ..Default::default()
        };
        assert_eq!(
            negative_min.build(),
            Err(RetryPolicyError::NegativeMinInterval(-1))
        );
        let negative_total = RetryConfig {
            total_limit_ms: -5,
            ..Default::default()
        };
        assert_eq!(
            RetryPolicy::try_from(negative_total),
            Err(RetryPolicyError::NegativeTotalLimit(-5))
        );
    }

    #[test]
    fn malformed_text_is_a_config_error() {
        assert!(matches!(
            RetryConfig::from_toml_str("max_iterations = \"many\""),
            Err(RetryPolicyError::Config(_))
        ));
        assert!(matches!(
            RetryConfig::from_toml_str("retries = 3"),
            Err(RetryPolicyError::Config(_))
        ));
    }
}
