//! 重试策略
//!
//! 只对可重试的错误重试；次数用完后按策略降级为空结果或返回错误。

use std::future::Future;

use tracing::warn;

/// 重试耗尽后的处理方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnExhausted {
    /// 返回默认值（空结果）
    Degrade,
    /// 返回最后一次的错误
    Fail,
}

/// 重试策略
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// 总尝试次数（含第一次），至少为 1
    pub max_attempts: u32,
    pub on_exhausted: OnExhausted,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::single_retry()
    }
}

impl RetryPolicy {
    /// 失败后重试一次，仍失败则降级
    pub const fn single_retry() -> Self {
        Self {
            max_attempts: 2,
            on_exhausted: OnExhausted::Degrade,
        }
    }

    pub const fn new(max_attempts: u32, on_exhausted: OnExhausted) -> Self {
        Self {
            max_attempts,
            on_exhausted,
        }
    }

    /// 执行操作
    ///
    /// `op` 接收当前尝试序号（从 0 开始）。`is_retryable` 为 false 的错误
    /// 不再重试，直接进入耗尽处理。
    pub async fn run<T, E, F, Fut>(
        &self,
        mut op: F,
        is_retryable: impl Fn(&E) -> bool,
    ) -> Result<T, E>
    where
        T: Default,
        E: std::fmt::Display,
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut attempt = 0;

        let last_error = loop {
            match op(attempt).await {
                Ok(value) => return Ok(value),
                Err(e) if is_retryable(&e) && attempt + 1 < max_attempts => {
                    warn!(attempt = attempt + 1, error = %e, "调用失败，重新请求");
                    attempt += 1;
                }
                Err(e) => break e,
            }
        };

        match self.on_exhausted {
            OnExhausted::Degrade => {
                warn!(attempts = attempt + 1, error = %last_error, "重试耗尽，降级为空结果");
                Ok(T::default())
            }
            OnExhausted::Fail => Err(last_error),
        }
    }
}
