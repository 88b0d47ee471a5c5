//! window 事件监听
//!
//! `WindowListener` 持有闭包，drop 时移除监听，
//! 替代泄漏闭包（`forget`）的写法。

use wasm_bindgen::prelude::*;

pub struct WindowListener {
    event: &'static str,
    closure: Closure<dyn Fn(web_sys::Event)>,
}

impl WindowListener {
    /// 在 window 上注册监听；无法获取 window 或注册失败时返回 `None`
    pub fn new<F>(event: &'static str, callback: F) -> Option<Self>
    where
        F: Fn(web_sys::Event) + 'static,
    {
        let closure = Closure::<dyn Fn(web_sys::Event)>::new(callback);
        web_sys::window()?
            .add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())
            .ok()?;
        Some(Self { event, closure })
    }
}

impl Drop for WindowListener {
    fn drop(&mut self) {
        if let Some(window) = web_sys::window() {
            let _ = window
                .remove_event_listener_with_callback(self.event, self.closure.as_ref().unchecked_ref());
        }
    }
}
