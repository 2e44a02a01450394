//! 单个测试的结果记录
//!
//! runner 在每个测试运行前新建一个 [`UnitTestResult`]，以共享引用同时交给测试体和事件桥。
//! 所有修改都经过内部可变性，测试体持有引用期间事件桥仍可记录事件。

use crate::debug::debug_break;
use bitflags::bitflags;
use core::sync::atomic::{AtomicU8, Ordering};
use std::sync::OnceLock;

/// 测试中第一个失败的期望
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct FailedExpectation {
    /// 条件的源码文本
    pub condition: &'static str,
    /// 所在源文件
    pub file: &'static str,
    /// 所在行
    pub line: u32,
}

impl FailedExpectation {
    /// 构造记录，通常由 `expect!` 宏完成
    pub const fn new(condition: &'static str, file: &'static str, line: u32) -> Self {
        Self {
            condition,
            file,
            line,
        }
    }
}

bitflags! {
    /// 单个测试的抑制开关和事件失败标记
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct TestFlags: u8 {
        /// 忽略断言事件
        const IGNORE_ASSERTS = 1 << 0;
        /// 收到过未被抑制的断言事件
        const FAILED_ASSERT = 1 << 1;
        /// 日志事件不视为失败
        const IGNORE_LOG = 1 << 2;
        /// 收到过未被抑制的 Error 日志
        const FAILED_LOG = 1 << 3;
    }
}

/// 一次测试运行的结果
#[derive(Debug, Default)]
pub struct UnitTestResult {
    failure: OnceLock<FailedExpectation>,
    flags: AtomicU8,
}

impl UnitTestResult {
    /// 干净的记录：无失败、无抑制
    pub const fn new() -> Self {
        Self {
            failure: OnceLock::new(),
            flags: AtomicU8::new(0),
        }
    }

    /// 记录一个失败的期望
    ///
    /// 只保留第一次失败；已有记录时返回 `false`。
    pub fn record_failure(&self, failure: FailedExpectation) -> bool {
        if self.failure.get().is_some() {
            return false;
        }
        debug_break();
        self.failure.set(failure).is_ok()
    }

    /// 第一个失败的期望（若有）
    pub fn failure(&self) -> Option<&FailedExpectation> {
        self.failure.get()
    }

    /// 当前标记
    pub fn flags(&self) -> TestFlags {
        TestFlags::from_bits_truncate(self.flags.load(Ordering::Acquire))
    }

    fn set_flag(&self, flag: TestFlags, on: bool) {
        if on {
            self.flags.fetch_or(flag.bits(), Ordering::AcqRel);
        } else {
            self.flags.fetch_and(!flag.bits(), Ordering::AcqRel);
        }
    }

    /// 开关断言抑制，不会自动复位
    pub fn set_ignore_asserts(&self, on: bool) {
        self.set_flag(TestFlags::IGNORE_ASSERTS, on);
    }

    /// 开关日志抑制，不会自动复位
    pub fn set_ignore_log(&self, on: bool) {
        self.set_flag(TestFlags::IGNORE_LOG, on);
    }

    /// 断言事件当前是否被抑制
    pub fn ignores_asserts(&self) -> bool {
        self.flags().contains(TestFlags::IGNORE_ASSERTS)
    }

    /// 日志事件当前是否被抑制
    pub fn ignores_log(&self) -> bool {
        self.flags().contains(TestFlags::IGNORE_LOG)
    }

    /// 标记断言事件导致失败
    pub fn mark_failed_assert(&self) {
        self.set_flag(TestFlags::FAILED_ASSERT, true);
    }

    /// 标记 Error 日志导致失败
    pub fn mark_failed_log(&self) {
        self.set_flag(TestFlags::FAILED_LOG, true);
    }

    /// 是否因断言事件失败
    pub fn failed_assert(&self) -> bool {
        self.flags().contains(TestFlags::FAILED_ASSERT)
    }

    /// 是否因 Error 日志失败
    pub fn failed_log(&self) -> bool {
        self.flags().contains(TestFlags::FAILED_LOG)
    }
}
