//! 事件桥
//!
//! 被测代码（宿主应用）通过两个处理槽报告内部事件：
//!
//! - 断言失败：[`EventBridge::assert_failed`]`(message)`
//! - 日志：[`EventBridge::log_emitted`]`(level, message)`
//!
//! 调用方只看到裸的 `(message)` / `(level, message)` 形式；桥负责把事件解析到当前正在运行的测试的
//! [`UnitTestResult`]，再以显式参数的形式交给处理函数。
//!
//! # 单一活动槽
//!
//! 当前测试由 runner 通过 [`EventBridge::with_active`] 设置，只有一个槽，不是栈；
//! 嵌套调用在返回时恢复外层的值。它只在串行执行模型下有效：测试一次只运行一个，
//! 测试遗留的后台线程在测试返回后报告的事件会落到下一个活动测试上（或没有活动测试）。

use crate::config::ERROR_SEVERITY;
use crate::console::console;
use crate::console_print;
use crate::debug::debug_break;
use crate::result::UnitTestResult;
use core::ptr;
use core::sync::atomic::{AtomicPtr, AtomicUsize, Ordering};
use log::Level;

/// 断言失败处理函数：当前测试（若有）和消息
pub type AssertHandler = fn(Option<&UnitTestResult>, &str);

/// 日志处理函数：当前测试（若有）、级别和消息
pub type LogHandler = fn(Option<&UnitTestResult>, Level, &str);

/// 两个处理槽加一个活动测试槽
///
/// 处理函数以函数指针形式原子存储，可以在任意上下文中安装和调用。
#[derive(Debug)]
pub struct EventBridge {
    assert_handler: AtomicPtr<()>,
    log_handler: AtomicPtr<()>,
    active: AtomicPtr<UnitTestResult>,
    /// 正在读取活动槽、尚未返回的分发次数
    in_flight: AtomicUsize,
}

impl EventBridge {
    /// 创建一个空的事件桥：没有处理函数，没有活动测试
    pub const fn new() -> Self {
        Self {
            assert_handler: AtomicPtr::new(ptr::null_mut()),
            log_handler: AtomicPtr::new(ptr::null_mut()),
            active: AtomicPtr::new(ptr::null_mut()),
            in_flight: AtomicUsize::new(0),
        }
    }

    /// 安装处理函数，替换之前的实现
    pub fn install(&self, on_assert: AssertHandler, on_log: LogHandler) {
        self.assert_handler
            .store(on_assert as *const () as *mut (), Ordering::Release);
        self.log_handler
            .store(on_log as *const () as *mut (), Ordering::Release);
    }

    /// 安装 harness 的默认处理函数
    pub fn install_defaults(&self) {
        self.install(on_assert_failed, on_log_emitted);
    }

    /// 报告一次断言失败；未安装处理函数时忽略
    pub fn assert_failed(&self, message: &str) {
        let raw = self.assert_handler.load(Ordering::Acquire);
        if raw.is_null() {
            return;
        }
        // SAFETY: 非空值只可能由 install 写入，且写入的是 AssertHandler
        let handler = unsafe { core::mem::transmute::<*mut (), AssertHandler>(raw) };
        self.dispatch(|active| handler(active, message));
    }

    /// 报告一条日志；未安装处理函数时忽略
    pub fn log_emitted(&self, level: Level, message: &str) {
        let raw = self.log_handler.load(Ordering::Acquire);
        if raw.is_null() {
            return;
        }
        // SAFETY: 非空值只可能由 install 写入，且写入的是 LogHandler
        let handler = unsafe { core::mem::transmute::<*mut (), LogHandler>(raw) };
        self.dispatch(|active| handler(active, level, message));
    }

    /// 在 `f` 执行期间把 `result` 设为当前测试
    ///
    /// `f` 返回（或 panic 展开）时恢复之前的活动槽，并等待其它线程上仍持有 `result`
    /// 的处理函数返回，活动指针不会比 `result` 活得更久。处理函数内部不得调用本方法。
    pub fn with_active<R>(&self, result: &UnitTestResult, f: impl FnOnce() -> R) -> R {
        let previous = self.active.swap(
            result as *const UnitTestResult as *mut UnitTestResult,
            Ordering::SeqCst,
        );
        let _restore = ActiveTest {
            bridge: self,
            previous,
        };
        f()
    }

    /// 当前是否有测试在运行
    pub fn is_active(&self) -> bool {
        !self.active.load(Ordering::Acquire).is_null()
    }

    fn dispatch(&self, handle: impl FnOnce(Option<&UnitTestResult>)) {
        self.in_flight.fetch_add(1, Ordering::SeqCst);
        let _done = InFlight(&self.in_flight);
        let active = self.active.load(Ordering::SeqCst);
        // SAFETY: 非空指针只在 with_active 调用期间存在；with_active 返回前会等待
        // in_flight 归零，因此在这里读到的结果在 handle 返回之前一直有效。
        // 守卫不对外暴露，不会被 forget
        handle(unsafe { active.as_ref() });
    }
}

impl Default for EventBridge {
    fn default() -> Self {
        Self::new()
    }
}

/// 释放时恢复之前的活动槽
struct ActiveTest<'b> {
    bridge: &'b EventBridge,
    previous: *mut UnitTestResult,
}

impl Drop for ActiveTest<'_> {
    fn drop(&mut self) {
        self.bridge.active.store(self.previous, Ordering::SeqCst);
        while self.bridge.in_flight.load(Ordering::SeqCst) != 0 {
            core::hint::spin_loop();
        }
    }
}

/// 分发结束（包括处理函数 panic）时减少计数
struct InFlight<'b>(&'b AtomicUsize);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// 默认断言处理：未被抑制时标记失败、打印诊断并触发断点
pub fn on_assert_failed(active: Option<&UnitTestResult>, message: &str) {
    let Some(result) = active else {
        console_print!(console(), "Assert outside of a unit test: {}\n", message);
        return;
    };
    if result.ignores_asserts() {
        return;
    }

    console_print!(console(), " Failed assert {}", message);
    console().flush();
    result.mark_failed_assert();
    debug_break();
}

/// 默认日志处理：未被抑制的 Error 级别日志标记失败并触发断点，其余只作为诊断输出
pub fn on_log_emitted(active: Option<&UnitTestResult>, level: Level, message: &str) {
    let Some(result) = active else {
        console_print!(console(), "[{}] {}\n", level, message);
        return;
    };
    if result.ignores_log() {
        console_print!(console(), " [{}] (ignored) {} ", level, message);
        return;
    }

    console_print!(console(), " [{}] {} ", level, message);
    console().flush();
    if level == ERROR_SEVERITY {
        result.mark_failed_log();
        debug_break();
    }
}

/// 进程级事件桥
pub static BRIDGE: EventBridge = EventBridge::new();

/// 通过进程级事件桥报告断言失败
pub fn assert_failed(message: &str) {
    BRIDGE.assert_failed(message);
}

/// 通过进程级事件桥报告日志
pub fn log_emitted(level: Level, message: &str) {
    BRIDGE.log_emitted(level, message);
}
