//! 单元测试 harness
//!
//! 一个最小的原生单元测试框架：测试在进程启动时自行注册，runner 依次执行，
//! 分配跟踪层在每个测试结束时以及整个运行结束时检测内存泄漏。
//!
//! # 组件
//!
//! - [`tracker`] - 带大小头部的计数分配器，可作为 `#[global_allocator]`
//! - [`bridge`] - 事件桥：被测代码报告断言失败和日志的两个处理槽
//! - [`logger`] - `log` 门面到事件桥的转发
//! - [`registry`] - 静态（`inventory`）与运行时测试注册
//! - [`result`] - 单个测试的结果记录
//! - [`runner`] - 逐个执行测试并汇总判定
//! - [`host`] - 宿主应用的 `init` / `teardown` 钩子
//! - [`config`] - 常量与运行配置
//! - [`console`] - 控制台输出抽象
//! - [`debug`] - 调试器断点
//!
//! # 失败模型
//!
//! 三个独立的失败通道在报告时合并为一个判定：
//!
//! 1. **期望失败**：测试体内的 [`expect!`]，只保留第一次失败；
//! 2. **事件失败**：被测代码经事件桥报告的断言失败或 Error 日志，记录后测试继续执行，
//!    可以用 [`ignore_asserts!`] / [`ignore_log!`] 抑制；
//! 3. **泄漏**：测试返回后存活字节数与测试前不一致，无法抑制。
//!
//! 所有失败都只终结当前测试，runner 总是继续下一个测试。
//!
//! # 示例
//!
//! ```no_run
//! use harness::{NoHost, expect, unit_test};
//!
//! #[global_allocator]
//! static GLOBAL: harness::Tracker = harness::Tracker::new(&harness::tracker::COUNTERS);
//!
//! unit_test!(fn vec_round_trip(t) {
//!     let v = vec![1, 2, 3];
//!     expect!(t, v.iter().sum::<i32>() == 6);
//! });
//!
//! fn main() -> std::process::ExitCode {
//!     harness::run_main(&mut NoHost)
//! }
//! ```

pub mod bridge;
pub mod config;
pub mod console;
pub mod debug;
pub mod error;
pub mod host;
pub mod logger;
mod macros;
pub mod registry;
pub mod result;
pub mod runner;
pub mod tracker;

#[doc(hidden)]
pub use inventory;

pub use bridge::{AssertHandler, BRIDGE, EventBridge, LogHandler};
pub use config::RunConfig;
pub use console::{ConsoleOutput, StdoutConsole, register_console};
pub use debug::debug_break;
pub use error::{HarnessError, HarnessResult};
pub use host::{Host, NoHost};
pub use logger::init_logger;
pub use registry::{UnitTest, UnitTestFn, register, registered_tests};
pub use result::{FailedExpectation, TestFlags, UnitTestResult};
pub use runner::{
    FailureCause, Outcome, RunReport, Runner, TeardownLeak, TestOutcome, Verdict, run_main,
};
pub use tracker::{AllocCounters, AllocSnapshot, Tracker};
