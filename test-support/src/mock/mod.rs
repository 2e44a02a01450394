//! Mock 实现模块
//!
//! 提供宿主钩子和控制台输出的 Mock 实现，用于测试

pub mod console;
pub mod host;
