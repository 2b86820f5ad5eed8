//! 重试策略与重试驱动的错误域。

use core::time::Duration;

use thiserror::Error;

/// 构建重试处理器时的配置错误。
///
/// # 教案式说明
/// - **意图 (Why)**：所有约束在构建时一次性校验，错误不会延迟到使用时才暴露；
/// - **契约 (What)**：每个变体对应一条被违反的约束，消息中给出违规的取值，属于本地、不可重试的错误。
#[derive(Clone, Debug, Error, PartialEq)]
pub enum RetryPolicyError {
    /// 迭代上限与总时长预算都未设置。
    #[error("retry: cannot have both max_iterations and total_limit unspecified")]
    Unbounded,

    /// 退避系数小于 1.0 或不是有限数。
    #[error("retry: backoff_factor must be a finite value >= 1.0, not {0}")]
    BackoffFactor(f64),

    /// 最大间隔小于最小间隔。
    #[error("retry: max_interval ({max:?}) must be greater than or equal to min_interval ({min:?})")]
    IntervalOrder {
        /// 最小间隔。
        min: Duration,
        /// 最大间隔。
        max: Duration,
    },

    /// 最小间隔为负（毫秒）。
    #[error("retry: min_interval must be greater than or equal to zero: {0}ms")]
    NegativeMinInterval(i64),

    /// 最大间隔为负（毫秒）。
    #[error("retry: max_interval must be greater than or equal to zero: {0}ms")]
    NegativeMaxInterval(i64),

    /// 总时长预算为负（毫秒）。
    #[error("retry: total_limit cannot be negative: {0}ms")]
    NegativeTotalLimit(i64),

    /// 间隔序列无法在 `max_len` 步内结束：没有迭代上限或上限过大，且时长预算不足以提前终止。
    #[error("retry: schedule must end within {max_len} steps; lower max_iterations or total_limit")]
    NonTerminating {
        /// 允许的最大序列长度。
        max_len: usize,
    },

    /// 配置文本解析失败。
    #[error("retry: invalid configuration: {0}")]
    Config(String),
}

/// [`RetryHandler::run`](crate::RetryHandler::run) 的失败结果。
#[derive(Debug, Error)]
pub enum RetryError<E> {
    /// 操作返回了不可重试的错误，立即终止。
    #[error("retry: non-retriable failure on attempt {attempt}")]
    Fatal {
        /// 失败所在的尝试序号，从 0 开始。
        attempt: usize,
        /// 操作返回的错误。
        #[source]
        error: E,
    },

    /// 所有尝试都以可重试错误失败。
    #[error("retry: gave up after {attempts} attempts")]
    Exhausted {
        /// 实际执行的尝试次数。
        attempts: usize,
        /// 最后一次尝试的错误。
        #[source]
        last: E,
    },
}

impl<E> RetryError<E> {
    /// 取出底层错误。
    pub fn into_inner(self) -> E {
        match self {
            Self::Fatal { error, .. } => error,
            Self::Exhausted { last, .. } => last,
        }
    }
}
