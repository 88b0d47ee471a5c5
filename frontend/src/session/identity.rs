//! 身份存储
//!
//! 共享身份（Cookie + LocalStorage）与标签页会话（SessionStorage）各有唯一的写入者：
//! - `IdentityStore`: 写入前先清空所有角色的键，同一时刻最多只存在一个角色的身份。
//! - `TabSession`: 只管理本标签页的四个会话键。

use super::store::KeyValueStore;
use crate::error::StorageError;
use rocket_assess_shared::{
    Timestamp, UserProfile, UserRole, cookie_keys, local_keys, session_keys,
};
use std::rc::Rc;

/// 从共享存储中解析出的身份
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredIdentity {
    pub name: String,
    pub email: Option<String>,
}

/// 读取键值并把空字符串视为不存在
fn read_non_empty(store: &dyn KeyValueStore, key: &str) -> Result<Option<String>, StorageError> {
    Ok(store.get(key)?.filter(|v| !v.trim().is_empty()))
}

// =========================================================
// IdentityStore
// =========================================================

#[derive(Clone)]
pub struct IdentityStore {
    cookies: Rc<dyn KeyValueStore>,
    local: Rc<dyn KeyValueStore>,
}

impl IdentityStore {
    pub fn new(cookies: Rc<dyn KeyValueStore>, local: Rc<dyn KeyValueStore>) -> Self {
        Self { cookies, local }
    }

    /// 写入角色身份
    ///
    /// 先清除所有角色的共享键，再按 Cookie/LocalStorage 布局写入该角色的键。
    pub fn store(&self, role: UserRole, profile: &UserProfile) -> Result<(), StorageError> {
        self.clear()?;

        match role {
            UserRole::Organization => {
                self.cookies.set(cookie_keys::ORG_NAME, &profile.name)?;
                if let Some(code) = &profile.org_code {
                    self.cookies.set(cookie_keys::ORG_CODE, code)?;
                }
                self.cookies.set(cookie_keys::USER_EMAIL, &profile.email)?;
            }
            UserRole::Teacher => {
                self.cookies.set(cookie_keys::TEACHER_NAME, &profile.name)?;
                self.local.set(local_keys::TEACHER_NAME, &profile.name)?;
                self.cookies.set(cookie_keys::USER_EMAIL, &profile.email)?;
                if let Some(teacher_id) = &profile.teacher_id {
                    self.cookies.set(cookie_keys::TEACHER_ID, teacher_id)?;
                }
                if let Some(pk) = &profile.teacher_pk {
                    self.cookies.set(cookie_keys::TEACHER_PK, pk)?;
                    self.local.set(local_keys::TEACHER_PK, pk)?;
                }
            }
            UserRole::Student => {
                self.local.set(local_keys::STUDENT_NAME, &profile.name)?;
                self.local.set(local_keys::STUDENT_EMAIL, &profile.email)?;
            }
        }
        Ok(())
    }

    /// 只解析指定角色的身份，其他角色残留的键不参与判断
    pub fn resolve(&self, role: UserRole) -> Result<Option<StoredIdentity>, StorageError> {
        let (name, email) = match role {
            UserRole::Organization => (
                read_non_empty(self.cookies.as_ref(), cookie_keys::ORG_NAME)?,
                read_non_empty(self.cookies.as_ref(), cookie_keys::USER_EMAIL)?,
            ),
            UserRole::Teacher => (
                read_non_empty(self.cookies.as_ref(), cookie_keys::TEACHER_NAME)?,
                read_non_empty(self.cookies.as_ref(), cookie_keys::USER_EMAIL)?,
            ),
            UserRole::Student => (
                read_non_empty(self.local.as_ref(), local_keys::STUDENT_NAME)?,
                read_non_empty(self.local.as_ref(), local_keys::STUDENT_EMAIL)?,
            ),
        };
        Ok(name.map(|name| StoredIdentity { name, email }))
    }

    pub fn teacher_pk(&self) -> Result<Option<String>, StorageError> {
        read_non_empty(self.cookies.as_ref(), cookie_keys::TEACHER_PK)
    }

    /// 清除全部共享身份键
    ///
    /// 单个键失败不会中断其余键的清理，返回遇到的第一个错误。
    pub fn clear(&self) -> Result<(), StorageError> {
        let mut first_err = None;
        let removals = cookie_keys::ALL
            .iter()
            .map(|key| self.cookies.remove(key))
            .chain(local_keys::ALL.iter().map(|key| self.local.remove(key)));
        for result in removals {
            if let Err(e) = result {
                first_err.get_or_insert(e);
            }
        }
        first_err.map_or(Ok(()), Err)
    }
}

// =========================================================
// TabSession
// =========================================================

const AUTH_TRUE: &str = "true";

#[derive(Clone)]
pub struct TabSession {
    store: Rc<dyn KeyValueStore>,
}

impl TabSession {
    pub fn new(store: Rc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// 确保本标签页拥有会话 ID，返回当前 ID
    pub fn ensure_id(&self) -> Result<String, StorageError> {
        if let Some(id) = read_non_empty(self.store.as_ref(), session_keys::SESSION_ID)? {
            return Ok(id);
        }
        let id = format!("session_{}", uuid::Uuid::new_v4().simple());
        self.store.set(session_keys::SESSION_ID, &id)?;
        Ok(id)
    }

    pub fn id(&self) -> Result<Option<String>, StorageError> {
        read_non_empty(self.store.as_ref(), session_keys::SESSION_ID)
    }

    pub fn mark_authenticated(&self, role: UserRole, now: Timestamp) -> Result<(), StorageError> {
        self.store.set(session_keys::AUTH, AUTH_TRUE)?;
        self.store.set(session_keys::USER_TYPE, role.as_str())?;
        self.store
            .set(session_keys::TIMESTAMP, &now.as_millis().to_string())
    }

    pub fn is_authenticated(&self) -> Result<bool, StorageError> {
        Ok(self.store.get(session_keys::AUTH)?.as_deref() == Some(AUTH_TRUE))
    }

    /// 标签页记录的角色；无法识别的字符串视为无角色
    pub fn role(&self) -> Result<Option<UserRole>, StorageError> {
        Ok(self
            .store
            .get(session_keys::USER_TYPE)?
            .as_deref()
            .and_then(UserRole::parse))
    }

    /// 会话时间戳；缺失或无法解析均返回 `None`
    pub fn timestamp(&self) -> Result<Option<Timestamp>, StorageError> {
        Ok(self
            .store
            .get(session_keys::TIMESTAMP)?
            .as_deref()
            .and_then(Timestamp::parse_millis))
    }

    pub fn touch(&self, now: Timestamp) -> Result<(), StorageError> {
        self.store
            .set(session_keys::TIMESTAMP, &now.as_millis().to_string())
    }

    pub fn clear(&self) -> Result<(), StorageError> {
        let mut first_err = None;
        for key in session_keys::ALL {
            if let Err(e) = self.store.remove(key) {
                first_err.get_or_insert(e);
            }
        }
        first_err.map_or(Ok(()), Err)
    }
}
