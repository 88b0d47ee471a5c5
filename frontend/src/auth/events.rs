//! 认证事件发布器
//!
//! 登录、登出、会话清除与验证成功都会在这里发布。页头等组件订阅后自行重新验证，
//! 不再依赖定时轮询与 storage 事件来间接感知认证变化。

use rocket_assess_shared::UserRole;
use std::cell::RefCell;
use std::rc::{Rc, Weak};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthEvent {
    LoggedIn(UserRole),
    LoggedOut,
    /// 会话因过期、验证失败或网络错误被清除
    SessionCleared,
    Verified(UserRole),
}

type Listener = Rc<dyn Fn(&AuthEvent)>;

#[derive(Default)]
struct Subscribers {
    next_id: u64,
    listeners: Vec<(u64, Listener)>,
}

/// 事件总线，克隆后共享同一组订阅者
#[derive(Clone, Default)]
pub struct AuthEvents {
    inner: Rc<RefCell<Subscribers>>,
}

impl AuthEvents {
    pub fn new() -> Self {
        Self::default()
    }

    /// 订阅事件；返回的句柄被 drop 时自动取消订阅
    #[must_use = "dropping the subscription unsubscribes immediately"]
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&AuthEvent) + 'static,
    {
        let mut subs = self.inner.borrow_mut();
        let id = subs.next_id;
        subs.next_id += 1;
        subs.listeners.push((id, Rc::new(listener)));
        Subscription {
            id,
            subscribers: Rc::downgrade(&self.inner),
        }
    }

    /// 发布事件
    ///
    /// 先复制订阅者列表再逐个回调，回调中可以继续发布或订阅。
    pub fn publish(&self, event: AuthEvent) {
        let listeners: Vec<Listener> = self
            .inner
            .borrow()
            .listeners
            .iter()
            .map(|(_, l)| l.clone())
            .collect();
        for listener in listeners {
            listener(&event);
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.borrow().listeners.len()
    }
}

/// 订阅句柄
pub struct Subscription {
    id: u64,
    subscribers: Weak<RefCell<Subscribers>>,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(subs) = self.subscribers.upgrade() {
            subs.borrow_mut().listeners.retain(|(id, _)| *id != self.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[test]
    fn subscribers_receive_events_until_dropped() {
        let events = AuthEvents::new();
        let seen = Rc::new(RefCell::new(Vec::new()));

        let sub = {
            let seen = seen.clone();
            events.subscribe(move |e| seen.borrow_mut().push(*e))
        };
        events.publish(AuthEvent::LoggedIn(UserRole::Student));
        assert_eq!(events.subscriber_count(), 1);

        drop(sub);
        events.publish(AuthEvent::LoggedOut);

        assert_eq!(*seen.borrow(), vec![AuthEvent::LoggedIn(UserRole::Student)]);
        assert_eq!(events.subscriber_count(), 0);
    }

    #[test]
    fn publish_from_inside_a_listener() {
        let events = AuthEvents::new();
        let seen = Rc::new(RefCell::new(Vec::new()));

        let _relay = {
            let events = events.clone();
            events.clone().subscribe(move |e| {
                if *e == AuthEvent::LoggedOut {
                    events.publish(AuthEvent::SessionCleared);
                }
            })
        };
        let _recorder = {
            let seen = seen.clone();
            events.subscribe(move |e| seen.borrow_mut().push(*e))
        };

        events.publish(AuthEvent::LoggedOut);
        assert_eq!(
            *seen.borrow(),
            vec![AuthEvent::SessionCleared, AuthEvent::LoggedOut]
        );
    }

    #[test]
    fn subscription_outliving_bus_is_harmless() {
        let events = AuthEvents::new();
        let sub = events.subscribe(|_| {});
        drop(events);
        drop(sub);
    }
}
