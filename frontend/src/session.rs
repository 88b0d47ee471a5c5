//! 会话管理模块
//!
//! `SessionManager` 回答"本标签页当前是否处于登录状态、以什么角色登录"。
//! 在应用启动时构造一次，通过 `AuthServices` 注入给页头与路由守卫。
//!
//! 所有公开操作都不会返回错误：存储异常被捕获、记录，并按"未登录"处理。

mod identity;
mod store;

pub use identity::{IdentityStore, StoredIdentity, TabSession};
pub use store::{KeyValueStore, MemoryStore};

use crate::clock::Clock;
use crate::error::StorageError;
use rocket_assess_shared::{AuthData, UserProfile, UserRole};
use std::rc::Rc;
use std::time::Duration;

/// 默认会话超时：8 小时
pub const DEFAULT_SESSION_TIMEOUT: Duration = Duration::from_secs(480 * 60);

/// 三种存储介质
#[derive(Clone)]
pub struct StorageBackends {
    /// Cookie（跨标签页共享）
    pub cookies: Rc<dyn KeyValueStore>,
    /// LocalStorage（跨标签页共享）
    pub local: Rc<dyn KeyValueStore>,
    /// SessionStorage（仅本标签页）
    pub tab: Rc<dyn KeyValueStore>,
}

impl StorageBackends {
    /// 全内存后端（非浏览器环境）
    pub fn in_memory() -> Self {
        Self {
            cookies: Rc::new(MemoryStore::new()),
            local: Rc::new(MemoryStore::new()),
            tab: Rc::new(MemoryStore::new()),
        }
    }
}

pub struct SessionManager {
    identity: IdentityStore,
    tab: TabSession,
    clock: Rc<dyn Clock>,
    timeout: Duration,
}

impl SessionManager {
    /// 创建会话管理器并初始化本标签页的会话 ID
    pub fn new(backends: StorageBackends, clock: Rc<dyn Clock>) -> Self {
        let manager = Self {
            identity: IdentityStore::new(backends.cookies, backends.local),
            tab: TabSession::new(backends.tab),
            clock,
            timeout: DEFAULT_SESSION_TIMEOUT,
        };
        manager.initialize_session();
        manager
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// 确保会话 ID 存在（幂等）
    pub fn initialize_session(&self) {
        if let Err(e) = self.tab.ensure_id() {
            log_warn!("[Session] initialize failed: {}", e);
        }
    }

    pub fn session_id(&self) -> Option<String> {
        self.tab.id().unwrap_or_else(|e| {
            log_warn!("[Session] read session id failed: {}", e);
            None
        })
    }

    /// 标记本标签页为已登录
    ///
    /// 同时写入共享身份（唯一写入者）与标签页会话。
    /// 资料不完整或任何写入失败时返回 `false`。
    pub fn set_logged_in(&self, role: UserRole, profile: &UserProfile) -> bool {
        if !profile.is_complete() {
            log_warn!("[Session] refusing login for {}: incomplete profile", role);
            return false;
        }

        let result = self.identity.store(role, profile).and_then(|_| {
            self.tab.ensure_id()?;
            self.tab.mark_authenticated(role, self.clock.now())
        });

        match result {
            Ok(()) => {
                log_info!("[Session] logged in as {}", role);
                true
            }
            Err(e) => {
                log_warn!("[Session] set_logged_in failed: {}", e);
                false
            }
        }
    }

    /// 标签页标记为已登录、会话 ID 存在，且该角色的共享身份可解析
    pub fn is_logged_in(&self) -> bool {
        self.tracked_identity().is_some()
    }

    /// 使用配置的超时判断会话是否过期
    pub fn is_session_expired(&self) -> bool {
        self.is_session_expired_after(self.timeout)
    }

    /// 时间戳缺失、无法解析或已超过 `timeout` 时视为过期
    pub fn is_session_expired_after(&self, timeout: Duration) -> bool {
        match self.tab.timestamp() {
            Ok(Some(ts)) => self.clock.now() - ts > timeout,
            Ok(None) => true,
            Err(e) => {
                log_warn!("[Session] read timestamp failed: {}", e);
                true
            }
        }
    }

    pub fn user_type(&self) -> Option<UserRole> {
        self.tracked_identity().map(|(role, _)| role)
    }

    /// 用于验证与 API 调用的身份记录；邮箱缺失时返回 `None`
    pub fn auth_data(&self) -> Option<AuthData> {
        let (role, identity) = self.tracked_identity()?;
        identity.email.map(|email| AuthData {
            email,
            user_type: role,
        })
    }

    /// 当前登录用户的显示名称
    pub fn display_name(&self) -> Option<String> {
        self.tracked_identity().map(|(_, identity)| identity.name)
    }

    /// 教师主键（登出请求需要）
    pub fn teacher_pk(&self) -> Option<String> {
        self.identity.teacher_pk().unwrap_or_else(|e| {
            log_warn!("[Session] read teacher_pk failed: {}", e);
            None
        })
    }

    /// 滑动过期：已登录时把时间戳更新为现在
    pub fn refresh_session(&self) {
        if !self.is_logged_in() {
            return;
        }
        if let Err(e) = self.tab.touch(self.clock.now()) {
            log_warn!("[Session] refresh failed: {}", e);
        }
    }

    /// 只清除本标签页的会话键，共享身份保持不变
    pub fn clear_session(&self) {
        if let Err(e) = self.tab.clear() {
            log_warn!("[Session] clear session failed: {}", e);
        }
    }

    /// 清除本标签页会话以及全部共享身份
    pub fn clear_all_auth_data(&self) {
        self.clear_session();
        if let Err(e) = self.identity.clear() {
            log_warn!("[Session] clear identity failed: {}", e);
        }
    }

    fn tracked_identity(&self) -> Option<(UserRole, StoredIdentity)> {
        match self.try_tracked_identity() {
            Ok(found) => found,
            Err(e) => {
                log_warn!("[Session] identity lookup failed: {}", e);
                None
            }
        }
    }

    fn try_tracked_identity(&self) -> Result<Option<(UserRole, StoredIdentity)>, StorageError> {
        if !self.tab.is_authenticated()? || self.tab.id()?.is_none() {
            return Ok(None);
        }
        let Some(role) = self.tab.role()? else {
            return Ok(None);
        };
        Ok(self.identity.resolve(role)?.map(|identity| (role, identity)))
    }
}

#[cfg(test)]
mod tests;
