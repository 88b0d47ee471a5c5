//! 时钟抽象
//!
//! 会话过期判断需要"现在"，验证超时需要"等待"。两者都通过 `Clock` 注入，
//! 浏览器中使用 `BrowserClock`，测试中使用可手动拨动的时钟。

use crate::error::ApiError;
use futures::future::{Either, LocalBoxFuture, select};
use rocket_assess_shared::Timestamp;
use std::future::Future;
use std::time::Duration;

pub trait Clock {
    /// 当前时间
    fn now(&self) -> Timestamp;
    /// 等待指定时长后完成
    fn sleep(&self, duration: Duration) -> LocalBoxFuture<'static, ()>;
}

/// 浏览器时钟：`Date.now()` + `setTimeout`
#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserClock;

impl Clock for BrowserClock {
    fn now(&self) -> Timestamp {
        Timestamp::now()
    }

    fn sleep(&self, duration: Duration) -> LocalBoxFuture<'static, ()> {
        Box::pin(gloo_timers::future::sleep(duration))
    }
}

/// 为请求加上超时；超时后请求 future 被直接 drop（即取消）
pub async fn with_timeout<F, T>(clock: &dyn Clock, timeout: Duration, request: F) -> Result<T, ApiError>
where
    F: Future<Output = Result<T, ApiError>> + Unpin,
{
    match select(request, clock.sleep(timeout)).await {
        Either::Left((result, _)) => result,
        Either::Right(((), _)) => Err(ApiError::Timeout(timeout)),
    }
}

#[cfg(test)]
pub mod testing {
    use super::*;
    use std::cell::Cell;

    /// 可手动设置"现在"的时钟，等待基于 tokio 计时器
    pub struct ManualClock {
        now: Cell<i64>,
    }

    impl ManualClock {
        pub fn new(now_ms: i64) -> Self {
            Self {
                now: Cell::new(now_ms),
            }
        }

        pub fn set(&self, now_ms: i64) {
            self.now.set(now_ms);
        }

        pub fn advance(&self, by: Duration) {
            self.now.set(self.now.get() + by.as_millis() as i64);
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> Timestamp {
            Timestamp::new(self.now.get())
        }

        fn sleep(&self, duration: Duration) -> LocalBoxFuture<'static, ()> {
            Box::pin(tokio::time::sleep(duration))
        }
    }
}
