//! 宿主钩子的 Mock 实现

use core::ptr;
use harness::{EventBridge, Host, Tracker};

/// 记录钩子调用的宿主
///
/// 可选地在 `init` 中通过给定的跟踪器分配一块夹具内存，在 `teardown` 中释放；
/// [`MockHost::leak_fixture`] 让 `teardown` 不释放它，以触发 teardown 泄漏。
/// 未释放的夹具在 Drop 时归还。
pub struct MockHost {
    /// init 调用次数
    pub init_calls: usize,
    /// teardown 调用次数
    pub teardown_calls: usize,
    /// init 收到的事件桥
    pub bridge: Option<&'static EventBridge>,
    tracker: Option<&'static Tracker>,
    fixture_size: usize,
    release_on_teardown: bool,
    fixture: *mut u8,
}

impl MockHost {
    /// 只计数的宿主
    pub fn new() -> Self {
        Self {
            init_calls: 0,
            teardown_calls: 0,
            bridge: None,
            tracker: None,
            fixture_size: 0,
            release_on_teardown: true,
            fixture: ptr::null_mut(),
        }
    }

    /// 在 init 中分配 `size` 字节夹具、在 teardown 中释放的宿主
    pub fn with_fixture(tracker: &'static Tracker, size: usize) -> Self {
        Self {
            tracker: Some(tracker),
            fixture_size: size,
            ..Self::new()
        }
    }

    /// teardown 时不释放夹具
    pub fn leak_fixture(mut self) -> Self {
        self.release_on_teardown = false;
        self
    }

    fn release(&mut self) {
        if let Some(tracker) = self.tracker {
            // SAFETY: fixture 为空或来自同一 tracker 的 allocate
            unsafe { tracker.free(self.fixture) };
            self.fixture = ptr::null_mut();
        }
    }
}

impl Default for MockHost {
    fn default() -> Self {
        Self::new()
    }
}

impl Host for MockHost {
    fn init(&mut self, bridge: &'static EventBridge) {
        self.init_calls += 1;
        self.bridge = Some(bridge);
        if let Some(tracker) = self.tracker {
            self.fixture = tracker.allocate(self.fixture_size);
        }
    }

    fn teardown(&mut self) {
        self.teardown_calls += 1;
        if self.release_on_teardown {
            self.release();
        }
    }
}

impl Drop for MockHost {
    fn drop(&mut self) {
        self.release();
    }
}
