//! 宿主钩子
//!
//! 嵌入 harness 的应用实现 [`Host`]：`init` 在第一个测试之前调用一次，`teardown` 在最后一个测试
//! 之后调用一次。`teardown` 之后 runner 比较存活字节数与运行前的基线，宿主在 `init` 中分配、
//! 却没有在 `teardown` 中释放的内存会被报告为 teardown 泄漏。

use crate::bridge::EventBridge;

/// 宿主应用钩子
pub trait Host {
    /// 运行任何测试之前调用一次
    ///
    /// 默认事件处理函数此时已经安装；宿主可以在这里把 `bridge` 接入自己的断言/日志钩子，
    /// 或用 [`EventBridge::install`] 替换处理函数。
    fn init(&mut self, bridge: &'static EventBridge) {
        let _ = bridge;
    }

    /// 所有测试结束后调用一次
    fn teardown(&mut self) {}
}

/// 没有任何钩子的宿主
#[derive(Debug, Default, Clone, Copy)]
pub struct NoHost;

impl Host for NoHost {}
