//! 重试策略：约束校验与间隔序列生成。

use core::time::Duration;
use std::hash::{BuildHasher, RandomState};

use tracing::debug;

use crate::error::RetryPolicyError;
use crate::handler::RetryHandler;

/// 生成序列的最大长度；无迭代上限或上限更大时，预算须在此之前终止序列。
pub const MAX_SCHEDULE_LEN: usize = 1 << 16;

const JITTER_RANGE: f64 = 0.05;

/// 重试策略。
///
/// 零值字段表示“未设置”：`backoff_factor` 为 0 时取 1.0（等间隔），`max_iterations` 或
/// `total_limit` 为 0 时不作限制，但二者至少设置其一。
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RetryPolicy {
    /// 相邻间隔之比，须 `>= 1.0`；指数退避取 2.0。
    pub backoff_factor: f64,
    /// 关闭间隔抖动。
    pub disable_jitter: bool,
    /// 单个间隔的上限，须 `>= min_interval`。
    pub max_interval: Duration,
    /// 尝试次数上限（含首次尝试）。
    pub max_iterations: u32,
    /// 第二次尝试前的等待间隔。
    pub min_interval: Duration,
    /// 全部间隔之和的上限。
    pub total_limit: Duration,
}

impl RetryPolicy {
    /// 校验约束并生成重试处理器。
    ///
    /// # 教案式说明
    /// - **契约 (What)**：首个间隔恒为零；此后每个间隔是前一个乘以退避系数并夹紧到
    ///   `max_interval`；达到迭代上限，或累计时长将超过 `total_limit` 时停止；
    /// - **抖动 (How)**：未关闭抖动时，每个非零间隔按“处理器种子 + 尝试序号”的 SplitMix64 结果缩放到
    ///   `[0.95, 1.05]` 倍并再次夹紧；种子取自 [`RandomState`]，不同处理器的抖动彼此错开。
    ///   乘法递推与停止判定使用未抖动的值，因此序列长度与是否抖动无关；抖动后的间隔再截断到
    ///   剩余预算，总和不会超过 `total_limit`；
    /// - **失败 (What)**：任一约束不满足，或序列无法在 [`MAX_SCHEDULE_LEN`] 步内结束时返回
    ///   [`RetryPolicyError`]，不会生成部分结果。
    pub fn build(&self) -> Result<RetryHandler, RetryPolicyError> {
        self.build_seeded(RandomState::new().hash_one(self.max_iterations))
    }

    fn build_seeded(&self, seed: u64) -> Result<RetryHandler, RetryPolicyError> {
        if self.max_iterations == 0 && self.total_limit.is_zero() {
            return Err(RetryPolicyError::Unbounded);
        }
        let factor = if self.backoff_factor == 0.0 {
            1.0
        } else if self.backoff_factor.is_finite() && self.backoff_factor >= 1.0 {
            self.backoff_factor
        } else {
            return Err(RetryPolicyError::BackoffFactor(self.backoff_factor));
        };
        if self.max_interval < self.min_interval {
            return Err(RetryPolicyError::IntervalOrder {
                min: self.min_interval,
                max: self.max_interval,
            });
        }
        if self.max_iterations == 0 && self.min_interval.is_zero() {
            return Err(RetryPolicyError::NonTerminating {
                max_len: MAX_SCHEDULE_LEN,
            });
        }

        let cap = self.max_iterations as usize;
        let mut intervals = vec![Duration::ZERO];
        let mut interval = self.min_interval;
        // 未抖动的累计值决定何时停止；`spent` 是实际写入序列的累计值。
        let mut total = Duration::ZERO;
        let mut spent = Duration::ZERO;
        loop {
            if cap > 0 && intervals.len() == cap {
                break;
            }
            if intervals.len() == MAX_SCHEDULE_LEN {
                return Err(RetryPolicyError::NonTerminating {
                    max_len: MAX_SCHEDULE_LEN,
                });
            }
            if intervals.len() == 1 {
                total = interval;
            } else {
                interval = scale(interval, factor, self.max_interval);
                total = total.saturating_add(interval);
            }
            if !self.total_limit.is_zero() && total > self.total_limit {
                break;
            }
            let mut wait = if self.disable_jitter {
                interval
            } else {
                jitter(interval, seed.wrapping_add(intervals.len() as u64), self.max_interval)
            };
            if !self.total_limit.is_zero() {
                wait = wait.min(self.total_limit.saturating_sub(spent));
            }
            spent = spent.saturating_add(wait);
            intervals.push(wait);
        }

        let handler = RetryHandler::from_intervals(intervals);
        debug!(
            attempts = handler.len(),
            total_wait = ?handler.total_wait(),
            "retry handler built"
        );
        Ok(handler)
    }
}

/// `interval * factor`，向零截断到纳秒并饱和到 `max`。
fn scale(interval: Duration, factor: f64, max: Duration) -> Duration {
    let nanos = interval.as_nanos() as f64 * factor;
    if nanos >= max.as_nanos() as f64 {
        max
    } else {
        Duration::from_nanos(nanos as u64)
    }
}

fn jitter(interval: Duration, seed: u64, max: Duration) -> Duration {
    if interval.is_zero() {
        return interval;
    }
    let jittered = interval.as_nanos() as f64 * jitter_factor(seed);
    if jittered >= max.as_nanos() as f64 {
        max
    } else {
        Duration::from_nanos(jittered as u64)
    }
}

/// 把种子映射到 `[1 - JITTER_RANGE, 1 + JITTER_RANGE]`。
fn jitter_factor(seed: u64) -> f64 {
    let mixed = mix64(seed);
    let mantissa = (mixed >> 11) as f64;
    let unit = mantissa / ((1u64 << 53) as f64);
    1.0 + (unit * 2.0 - 1.0) * JITTER_RANGE
}

#[inline]
fn mix64(mut x: u64) -> u64 {
    x = x.wrapping_add(0x9E3779B97F4A7C15);
    x = (x ^ (x >> 30)).wrapping_mul(0xBF58476D1CE4E5B9);
    x = (x ^ (x >> 27)).wrapping_mul(0x94D049BB133111EB);
    x ^ (x >> 31)
}

#[cfg(test)]
mod tests {
    use tracing_test::traced_test;

    use super::*;

    const MS: Duration = Duration::from_millis(1);

    #[test]
    fn exponential_schedule_without_jitter() {
        let handler = RetryPolicy {
            backoff_factor: 2.0,
            disable_jitter: true,
            max_interval: 5 * MS,
            max_iterations: 6,
            min_interval: MS,
            ..Default::default()
        }
        .build()
        .expect("valid policy");
        assert_eq!(
            handler.intervals(),
            &[Duration::ZERO, MS, 2 * MS, 4 * MS, 5 * MS, 5 * MS]
        );
    }

    #[test]
    fn total_limit_stops_before_overrun() {
        let handler = RetryPolicy {
            disable_jitter: true,
            max_interval: 3 * MS,
            min_interval: 3 * MS,
            total_limit: 10 * MS,
            ..Default::default()
        }
        .build()
        .expect("valid policy");
        // 3 + 3 + 3 = 9 <= 10，再加 3 将超出预算。
        assert_eq!(handler.intervals(), &[Duration::ZERO, 3 * MS, 3 * MS, 3 * MS]);
    }

    #[test]
    fn jitter_keeps_length_and_stays_within_bounds() {
        let base = RetryPolicy {
            backoff_factor: 1.5,
            max_interval: 30 * MS,
            max_iterations: 12,
            min_interval: 2 * MS,
            total_limit: 200 * MS,
            ..Default::default()
        };
        let plain = RetryPolicy {
            disable_jitter: true,
            ..base
        }
        .build()
        .expect("plain");
        for seed in [0, 7, u64::MAX] {
            let jittered = base.build_seeded(seed).expect("jittered");
            assert_eq!(jittered.len(), plain.len());
            assert_eq!(jittered.intervals()[0], Duration::ZERO);
            for (j, p) in jittered.intervals().iter().zip(plain.intervals()).skip(1) {
                assert!(*j <= 30 * MS);
                assert!(j.as_secs_f64() >= p.as_secs_f64() * 0.95 - 1e-9);
                assert!(j.as_secs_f64() <= p.as_secs_f64() * 1.05 + 1e-9);
            }
            assert_eq!(jittered, base.build_seeded(seed).expect("same seed"));
        }
    }

    #[test]
    fn jittered_handlers_are_spread_apart() {
        let policy = RetryPolicy {
            backoff_factor: 2.0,
            max_interval: 100 * MS,
            max_iterations: 5,
            min_interval: MS,
            ..Default::default()
        };
        let first = policy.build().expect("first");
        let second = policy.build().expect("second");
        assert_eq!(first.len(), second.len());
        assert_ne!(first, second);
    }

    #[test]
    fn jittered_schedule_never_exceeds_total_limit() {
        let tight = RetryPolicy {
            min_interval: MS,
            max_interval: 10 * MS,
            total_limit: MS,
            ..Default::default()
        };
        let budget = RetryPolicy {
            backoff_factor: 1.5,
            min_interval: 3 * MS,
            max_interval: 20 * MS,
            total_limit: 60 * MS,
            ..Default::default()
        };
        for policy in [tight, budget] {
            let plain = RetryPolicy {
                disable_jitter: true,
                ..policy
            }
            .build()
            .expect("plain");
            for seed in 0..2_000 {
                let handler = policy.build_seeded(seed).expect("valid policy");
                assert!(
                    handler.total_wait() <= policy.total_limit,
                    "seed {seed}: {:?}",
                    handler.intervals()
                );
                assert_eq!(handler.len(), plain.len());
            }
        }
    }

    #[test]
    fn jitter_factor_stays_in_range() {
        for seed in 0..10_000 {
            let factor = jitter_factor(seed);
            assert!((0.95..=1.05).contains(&factor), "seed {seed}: {factor}");
        }
    }

    #[test]
    fn invalid_policies_fail_fast() {
        assert_eq!(
            RetryPolicy::default().build(),
            Err(RetryPolicyError::Unbounded)
        );
        assert_eq!(
            RetryPolicy {
                backoff_factor: 0.5,
                max_iterations: 3,
                ..Default::default()
            }
            .build(),
            Err(RetryPolicyError::BackoffFactor(0.5))
        );
        assert!(matches!(
            RetryPolicy {
                backoff_factor: f64::NAN,
                max_iterations: 3,
                ..Default::default()
            }
            .build(),
            Err(RetryPolicyError::BackoffFactor(_))
        ));
        assert_eq!(
            RetryPolicy {
                max_iterations: 3,
                min_interval: 2 * MS,
                max_interval: MS,
                ..Default::default()
            }
            .build(),
            Err(RetryPolicyError::IntervalOrder {
                min: 2 * MS,
                max: MS
            })
        );
        assert_eq!(
            RetryPolicy {
                total_limit: 10 * MS,
                ..Default::default()
            }
            .build(),
            Err(RetryPolicyError::NonTerminating {
                max_len: MAX_SCHEDULE_LEN
            })
        );
    }

    #[test]
    fn runaway_schedule_is_rejected() {
        let result = RetryPolicy {
            disable_jitter: true,
            min_interval: Duration::from_nanos(1),
            max_interval: Duration::from_nanos(1),
            total_limit: Duration::from_secs(1),
            ..Default::default()
        }
        .build();
        assert!(matches!(
            result,
            Err(RetryPolicyError::NonTerminating { .. })
        ));
    }

    #[test]
    fn oversized_iteration_cap_is_rejected_without_budget() {
        let oversized = RetryPolicy {
            disable_jitter: true,
            min_interval: MS,
            max_interval: MS,
            max_iterations: u32::MAX,
            ..Default::default()
        };
        assert_eq!(
            oversized.build(),
            Err(RetryPolicyError::NonTerminating {
                max_len: MAX_SCHEDULE_LEN
            })
        );
        let at_limit = RetryPolicy {
            max_iterations: MAX_SCHEDULE_LEN as u32,
            ..oversized
        }
        .build()
        .expect("cap equal to the maximum length");
        assert_eq!(at_limit.len(), MAX_SCHEDULE_LEN);
        let budgeted = RetryPolicy {
            total_limit: 5 * MS,
            ..oversized
        }
        .build()
        .expect("budget ends the schedule first");
        assert_eq!(budgeted.len(), 6);
    }

    #[test]
    #[traced_test]
    fn build_is_logged() {
        RetryPolicy {
            max_iterations: 2,
            ..Default::default()
        }
        .build()
        .expect("valid policy");
        assert!(logs_contain("retry handler built"));
    }
}
