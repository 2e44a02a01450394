//! 示例宿主程序
//!
//! 运行所有注册的单元测试：
//!
//! ```text
//! host [NAME_FILTER]
//! ```
//!
//! 只运行名称包含 `NAME_FILTER` 的测试，其余打印跳过提示。
//! `HARNESS_LOG_LEVEL` 调整转发到事件桥的日志级别。退出码 0 表示全部通过。

mod app;
mod host_app;
mod tests;

use host_app::HostApp;
use std::process::ExitCode;

#[cfg(feature = "leak-detection")]
#[global_allocator]
static GLOBAL: harness::Tracker = harness::Tracker::new(&harness::tracker::COUNTERS);

fn main() -> ExitCode {
    harness::run_main(&mut HostApp)
}
