use crate::error::StorageError;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

// =========================================================
// 抽象存储接口
// =========================================================

/// 键值存储：Cookie、LocalStorage、SessionStorage 的统一接口
///
/// 浏览器存储都是同步 API，这里保持同步。
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

// =========================================================
// 内存实现
// =========================================================

/// 内存键值存储
///
/// 克隆后共享同一份数据，可用来模拟多个标签页共享的 Cookie。
/// 非浏览器目标也使用它作为后备。
#[derive(Clone, Default)]
pub struct MemoryStore {
    map: Rc<RefCell<HashMap<String, String>>>,
    failing: Rc<Cell<bool>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 模拟存储不可用：之后所有操作都返回错误
    pub fn set_failing(&self, failing: bool) {
        self.failing.set(failing);
    }

    pub fn contains(&self, key: &str) -> bool {
        self.map.borrow().contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.map.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.borrow().is_empty()
    }

    fn check(&self) -> Result<(), StorageError> {
        if self.failing.get() {
            Err(StorageError::Unavailable("memory store disabled"))
        } else {
            Ok(())
        }
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.check()?;
        Ok(self.map.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.check()?;
        self.map
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.check()?;
        self.map.borrow_mut().remove(key);
        Ok(())
    }
}
