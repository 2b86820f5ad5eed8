//! 重试处理器与迭代器。
//!
//! # 契约说明（What）
//! - [`RetryHandler`] 是不可变的间隔序列，首元素恒为零；克隆只增加引用计数，可跨线程共享；
//! - [`RetryIter`] 是处理器剩余后缀上的游标，每个逻辑重试循环各建一个，彼此互不影响；
//! - [`RetryIter::next_attempt`] 弹出首个间隔并睡眠（零间隔不睡眠），耗尽后永远返回 `false`。
//!   睡眠一旦开始不可取消，需要取消的调用方应在两次调用之间检查。

use core::iter::FusedIterator;
use core::time::Duration;
use std::io;
use std::sync::{Arc, LazyLock};

use tracing::{debug, trace, warn};

use crate::error::RetryError;

static DEFAULT_HANDLER: LazyLock<RetryHandler> =
    LazyLock::new(|| RetryHandler::from_intervals(vec![Duration::ZERO; 5]));

static NEVER: LazyLock<RetryHandler> =
    LazyLock::new(|| RetryHandler::from_intervals(vec![Duration::ZERO]));

/// 预先计算好的重试间隔序列。
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RetryHandler {
    intervals: Arc<[Duration]>,
}

impl RetryHandler {
    pub(crate) fn from_intervals(intervals: Vec<Duration>) -> Self {
        Self {
            intervals: Arc::from(intervals),
        }
    }

    /// 默认处理器：最多 5 次尝试，彼此之间不等待。
    pub fn default_handler() -> &'static RetryHandler {
        &DEFAULT_HANDLER
    }

    /// 从不重试：只尝试一次。
    pub fn never() -> &'static RetryHandler {
        &NEVER
    }

    /// 尝试次数，即间隔个数。
    pub fn len(&self) -> usize {
        self.intervals.len()
    }

    /// 是否为空；由策略构建的处理器总含首个零间隔。
    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }

    /// 全部间隔。
    pub fn intervals(&self) -> &[Duration] {
        &self.intervals
    }

    /// 全部间隔之和。
    pub fn total_wait(&self) -> Duration {
        self.intervals
            .iter()
            .fold(Duration::ZERO, |acc, d| acc.saturating_add(*d))
    }

    /// 以真实睡眠创建迭代器。
    pub fn iter(&self) -> RetryIter<'_, ThreadSleeper> {
        self.iter_with(ThreadSleeper)
    }

    /// 以自定义睡眠实现创建迭代器。
    pub fn iter_with<S: Sleeper>(&self, sleeper: S) -> RetryIter<'_, S> {
        RetryIter {
            remaining: &self.intervals,
            sleeper,
            attempt: 0,
        }
    }

    /// 按处理器的节律驱动 `op`，直到成功、遇到不可重试错误或耗尽全部尝试。
    ///
    /// `op` 收到从 0 开始的尝试序号。
    pub fn run<T, E, F>(&self, op: F) -> Result<T, RetryError<E>>
    where
        E: Retriable,
        F: FnMut(usize) -> Result<T, E>,
    {
        self.run_with(ThreadSleeper, op)
    }

    /// 与 [`run`](Self::run) 相同，但使用自定义睡眠实现。
    pub fn run_with<T, E, F, S>(&self, sleeper: S, mut op: F) -> Result<T, RetryError<E>>
    where
        E: Retriable,
        F: FnMut(usize) -> Result<T, E>,
        S: Sleeper,
    {
        let mut iter = self.iter_with(sleeper);
        // 首个间隔恒为零，首次尝试立即执行。
        iter.next_attempt();
        loop {
            let attempt = iter.attempts().saturating_sub(1);
            let error = match op(attempt) {
                Ok(value) => return Ok(value),
                Err(error) if !error.is_retriable() => {
                    return Err(RetryError::Fatal { attempt, error });
                }
                Err(error) => error,
            };
            warn!(attempt, error = %error, "retriable failure");
            if !iter.next_attempt() {
                let attempts = attempt + 1;
                debug!(attempts, "retry attempts exhausted");
                return Err(RetryError::Exhausted {
                    attempts,
                    last: error,
                });
            }
        }
    }
}

impl<'a> IntoIterator for &'a RetryHandler {
    type Item = usize;
    type IntoIter = RetryIter<'a, ThreadSleeper>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// 睡眠策略；测试中可替换为记录时长而不真正睡眠的实现。
pub trait Sleeper {
    /// 阻塞 `duration`。
    fn sleep(&mut self, duration: Duration);
}

impl<S: Sleeper + ?Sized> Sleeper for &mut S {
    fn sleep(&mut self, duration: Duration) {
        (**self).sleep(duration);
    }
}

/// 调用 [`std::thread::sleep`] 的真实睡眠。
#[derive(Clone, Copy, Debug, Default)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&mut self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// 可判定是否值得重试的错误。
pub trait Retriable: std::error::Error {
    /// 是否可重试。
    fn is_retriable(&self) -> bool;
}

impl Retriable for io::Error {
    fn is_retriable(&self) -> bool {
        matches!(
            self.kind(),
            io::ErrorKind::Interrupted
                | io::ErrorKind::WouldBlock
                | io::ErrorKind::TimedOut
                | io::ErrorKind::ConnectionReset
                | io::ErrorKind::ConnectionAborted
                | io::ErrorKind::ConnectionRefused
                | io::ErrorKind::BrokenPipe
                | io::ErrorKind::UnexpectedEof
        )
    }
}

/// [`RetryHandler`] 剩余间隔上的游标。
#[derive(Debug)]
pub struct RetryIter<'a, S> {
    remaining: &'a [Duration],
    sleeper: S,
    attempt: usize,
}

impl<S: Sleeper> RetryIter<'_, S> {
    /// 前进一步：弹出首个间隔并睡眠；已耗尽时返回 `false`。
    pub fn next_attempt(&mut self) -> bool {
        let Some((&wait, rest)) = self.remaining.split_first() else {
            return false;
        };
        self.remaining = rest;
        if !wait.is_zero() {
            trace!(attempt = self.attempt, wait = ?wait, "retry backoff");
            self.sleeper.sleep(wait);
        }
        self.attempt += 1;
        true
    }

    /// 已消耗的步数。
    pub fn attempts(&self) -> usize {
        self.attempt
    }

    /// 剩余步数。
    pub fn remaining(&self) -> usize {
        self.remaining.len()
    }
}

impl<S: Sleeper> Iterator for RetryIter<'_, S> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        let attempt = self.attempt;
        self.next_attempt().then_some(attempt)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining.len(), Some(self.remaining.len()))
    }
}

impl<S: Sleeper> ExactSizeIterator for RetryIter<'_, S> {}

impl<S: Sleeper> FusedIterator for RetryIter<'_, S> {}
