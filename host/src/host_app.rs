//! 把应用接到 harness 上的宿主

use crate::app::mailbox::Mailbox;
use crate::app::set_assert_hook;
use core::sync::atomic::{AtomicBool, Ordering};
use harness::{EventBridge, Host};
use sync::SpinLock;

/// 共享收件箱容量
pub const INBOX_CAPACITY: usize = 8;

/// 测试共享的收件箱，仅在 init 与 teardown 之间存在
pub static INBOX: SpinLock<Option<Mailbox>> = SpinLock::new(None);

static READY: AtomicBool = AtomicBool::new(false);
static BRIDGE: SpinLock<Option<&'static EventBridge>> = SpinLock::new(None);

/// 宿主是否已完成 init
pub fn is_ready() -> bool {
    READY.load(Ordering::Acquire)
}

fn forward_assert(message: &str) {
    let bridge = *BRIDGE.lock();
    match bridge {
        Some(bridge) => bridge.assert_failed(message),
        None => harness::bridge::assert_failed(message),
    }
}

/// 示例宿主
#[derive(Debug, Default)]
pub struct HostApp;

impl Host for HostApp {
    fn init(&mut self, bridge: &'static EventBridge) {
        *BRIDGE.lock() = Some(bridge);
        set_assert_hook(Some(forward_assert));
        *INBOX.lock() = Some(Mailbox::with_capacity(INBOX_CAPACITY));
        READY.store(true, Ordering::Release);
        log::info!("host ready, inbox capacity {}", INBOX_CAPACITY);
    }

    fn teardown(&mut self) {
        READY.store(false, Ordering::Release);
        // 收件箱在 init 后分配，必须在这里归还，否则计为 teardown 泄漏
        INBOX.lock().take();
        set_assert_hook(None);
        BRIDGE.lock().take();
    }
}
