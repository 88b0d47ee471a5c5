//! 浏览器存储封装模块
//!
//! 使用 `web_sys` 原生 API 实现 `KeyValueStore`：
//! - `BrowserLocalStorage`: LocalStorage（跨标签页共享）
//! - `BrowserSessionStorage`: SessionStorage（仅本标签页）
//! - `CookieJar`: `document.cookie`（跨标签页共享）
//!
//! 值按原样字符串读写，不做 JSON 编码，与服务端页面写入的格式保持一致。

use crate::error::StorageError;
use crate::session::KeyValueStore;
use rocket_assess_shared::COOKIE_EXPIRY_DAYS;
use wasm_bindgen::JsCast;

fn js_message(e: wasm_bindgen::JsValue) -> String {
    e.as_string().unwrap_or_else(|| format!("{:?}", e))
}

fn get_item(storage: web_sys::Storage, key: &str) -> Result<Option<String>, StorageError> {
    storage
        .get_item(key)
        .map_err(|e| StorageError::read(key, js_message(e)))
}

fn set_item(storage: web_sys::Storage, key: &str, value: &str) -> Result<(), StorageError> {
    storage
        .set_item(key, value)
        .map_err(|e| StorageError::write(key, js_message(e)))
}

fn remove_item(storage: web_sys::Storage, key: &str) -> Result<(), StorageError> {
    storage
        .remove_item(key)
        .map_err(|e| StorageError::write(key, js_message(e)))
}

// =========================================================
// LocalStorage / SessionStorage
// =========================================================

#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserLocalStorage;

impl BrowserLocalStorage {
    fn storage() -> Result<web_sys::Storage, StorageError> {
        web_sys::window()
            .and_then(|w| w.local_storage().ok().flatten())
            .ok_or(StorageError::Unavailable("localStorage"))
    }
}

impl KeyValueStore for BrowserLocalStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        get_item(Self::storage()?, key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        set_item(Self::storage()?, key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        remove_item(Self::storage()?, key)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserSessionStorage;

impl BrowserSessionStorage {
    fn storage() -> Result<web_sys::Storage, StorageError> {
        web_sys::window()
            .and_then(|w| w.session_storage().ok().flatten())
            .ok_or(StorageError::Unavailable("sessionStorage"))
    }
}

impl KeyValueStore for BrowserSessionStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        get_item(Self::storage()?, key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        set_item(Self::storage()?, key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        remove_item(Self::storage()?, key)
    }
}

// =========================================================
// Cookie
// =========================================================

/// `document.cookie` 读写
///
/// 写入时附带 `path=/` 与有效期；删除通过写入过去的过期时间实现。
#[derive(Debug, Clone, Copy)]
pub struct CookieJar {
    max_age_secs: u32,
}

impl Default for CookieJar {
    fn default() -> Self {
        Self {
            max_age_secs: COOKIE_EXPIRY_DAYS * 24 * 60 * 60,
        }
    }
}

impl CookieJar {
    pub fn new() -> Self {
        Self::default()
    }

    fn document() -> Result<web_sys::HtmlDocument, StorageError> {
        web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.dyn_into::<web_sys::HtmlDocument>().ok())
            .ok_or(StorageError::Unavailable("document.cookie"))
    }
}

impl KeyValueStore for CookieJar {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let header = Self::document()?
            .cookie()
            .map_err(|e| StorageError::read(key, js_message(e)))?;

        let Some(raw) = parse_cookie(&header, key) else {
            return Ok(None);
        };
        // 无法解码的值按原样返回
        let value = js_sys::decode_uri_component(raw)
            .map(String::from)
            .unwrap_or_else(|_| raw.to_string());
        Ok(Some(value))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let encoded = String::from(js_sys::encode_uri_component(value));
        let cookie = format!(
            "{}={}; max-age={}; path=/; SameSite=Lax",
            key, encoded, self.max_age_secs
        );
        Self::document()?
            .set_cookie(&cookie)
            .map_err(|e| StorageError::write(key, js_message(e)))
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let cookie = format!("{}=; expires=Thu, 01 Jan 1970 00:00:00 UTC; path=/", key);
        Self::document()?
            .set_cookie(&cookie)
            .map_err(|e| StorageError::write(key, js_message(e)))
    }
}

/// 从 `document.cookie` 字符串中取出指定键的原始值
pub(crate) fn parse_cookie<'a>(header: &'a str, key: &str) -> Option<&'a str> {
    header.split(';').find_map(|pair| {
        let (name, value) = pair.trim().split_once('=')?;
        (name == key).then_some(value)
    })
}
