//! 被测应用
//!
//! 应用代码通过 [`app_assert!`](crate::app_assert) 报告契约违反，通过 `log` 门面记录日志。
//! 断言的去向由宿主在启动时用 [`set_assert_hook`] 决定；未设置时只记一条 Error 日志。

pub mod mailbox;

use sync::SpinLock;

/// 断言钩子
pub type AssertHook = fn(&str);

static ASSERT_HOOK: SpinLock<Option<AssertHook>> = SpinLock::new(None);

/// 设置（或清除）断言钩子
pub fn set_assert_hook(hook: Option<AssertHook>) {
    *ASSERT_HOOK.lock() = hook;
}

/// 报告一次断言失败
pub fn report_assert(message: &str) {
    // 先取出钩子再调用，钩子内部可能再次设置钩子
    let hook = *ASSERT_HOOK.lock();
    match hook {
        Some(hook) => hook(message),
        None => log::error!("assertion failed: {}", message),
    }
}

/// 条件为假时报告断言失败，调用方继续执行
#[macro_export]
macro_rules! app_assert {
    ($cond:expr $(,)?) => {{
        if !$cond {
            $crate::app::report_assert(concat!(file!(), ":", line!(), ": ", stringify!($cond)));
        }
    }};
}
