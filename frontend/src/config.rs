//! 运行时配置
//!
//! 浏览器端没有环境变量，API 地址在编译期通过 `ROCKET_ASSESS_API_URL` 注入，
//! 未设置时使用同源地址。

use crate::auth::verifier::DEFAULT_VERIFY_TIMEOUT;
use crate::session::DEFAULT_SESSION_TIMEOUT;
use std::time::Duration;

const DEFAULT_REVERIFY_INTERVAL: Duration = Duration::from_secs(5 * 60);
const DEFAULT_NOTICE_DELAY: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// REST API 根地址，空字符串表示同源
    pub api_base_url: String,
    /// 会话无操作超时
    pub session_timeout: Duration,
    /// 单次服务端验证的超时
    pub verify_timeout: Duration,
    /// 页头周期性重新验证的间隔
    pub reverify_interval: Duration,
    /// 角色重定向提示的延迟
    pub notice_delay: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: option_env!("ROCKET_ASSESS_API_URL")
                .unwrap_or_default()
                .to_string(),
            session_timeout: DEFAULT_SESSION_TIMEOUT,
            verify_timeout: DEFAULT_VERIFY_TIMEOUT,
            reverify_interval: DEFAULT_REVERIFY_INTERVAL,
            notice_delay: DEFAULT_NOTICE_DELAY,
        }
    }
}

impl AppConfig {
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }

    pub fn with_session_timeout(mut self, timeout: Duration) -> Self {
        self.session_timeout = timeout;
        self
    }

    pub fn with_verify_timeout(mut self, timeout: Duration) -> Self {
        self.verify_timeout = timeout;
        self
    }

    pub fn with_reverify_interval(mut self, interval: Duration) -> Self {
        self.reverify_interval = interval;
        self
    }

    pub fn with_notice_delay(mut self, delay: Duration) -> Self {
        self.notice_delay = delay;
        self
    }

    /// 定时器使用的毫秒间隔，超出 `u32` 时饱和
    pub fn reverify_interval_millis(&self) -> u32 {
        u32::try_from(self.reverify_interval.as_millis()).unwrap_or(u32::MAX)
    }
}
