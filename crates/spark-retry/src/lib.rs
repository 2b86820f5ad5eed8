#![warn(missing_docs)]

//! `spark-retry` 提供预先计算的退避序列，供网络调用循环按节律重试。
//!
//! # 教案背景（Why）
//! - 退避间隔在启动时一次算好并校验，运行期只需沿序列前进，不再做任何浮点计算或配置检查；
//! - 处理器不可变，可被任意多个独立迭代器同时消费。
//!
//! # 使用概览（How）
//! - 通过 [`RetryPolicy::build`] 或 [`RetryConfig::build`] 得到 [`RetryHandler`]；
//! - 每个逻辑重试循环调用 [`RetryHandler::iter`]，以 `while it.next_attempt() { ... }` 驱动，
//!   成功时跳出；或直接使用 [`RetryHandler::run`]；
//! - 测试中以 [`RetryHandler::iter_with`] 注入自定义 [`Sleeper`]，避免真实睡眠。
//!
//! # 合约说明（What）
//! - 首次尝试从不等待；
//! - 构建失败返回 [`RetryPolicyError`]，指明被违反的约束。

mod config;
mod error;
mod handler;
mod policy;

pub use crate::config::RetryConfig;
pub use crate::error::{RetryError, RetryPolicyError};
pub use crate::handler::{Retriable, RetryHandler, RetryIter, Sleeper, ThreadSleeper};
pub use crate::policy::{MAX_SCHEDULE_LEN, RetryPolicy};
