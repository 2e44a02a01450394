//! 同步原语
//!
//! 向 harness 的其它模块提供基本的自旋锁。
//!
//! 注册表、控制台注册槽等全局状态都可能在 `main` 之前被访问
//! （静态注册阶段），因此这里的锁必须满足：
//!
//! - 可以在 `const` 上下文中构造，静态变量无需惰性初始化；
//! - 加锁/解锁过程不分配内存，不会干扰分配计数；
//! - 不会因持有者 panic 而"中毒"。
//!
//! 锁的外壳由 [`lock_api`] 提供，这里只实现底层的 [`RawSpinLock`]。

#![no_std]

#[cfg(test)]
extern crate std;

mod raw_spin_lock;
mod spin_lock;

pub use raw_spin_lock::*;
pub use spin_lock::*;
