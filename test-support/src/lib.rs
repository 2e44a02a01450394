//! 测试支持 crate
//!
//! 为 harness 的集成测试提供宿主钩子和控制台的 Mock 实现

pub mod mock;

pub use mock::console::CaptureConsole;
pub use mock::host::MockHost;
