//! 自旋锁实现
//!
//! 基于原子操作实现的原始自旋锁，作为 [`lock_api::RawMutex`] 接入 `lock_api`。

use core::{
    hint,
    sync::atomic::{AtomicBool, Ordering},
};

/// 原始自旋锁，仅维护一个占用标志。
///
/// 不可重入 (即同一线程不能嵌套获取同一把锁)。
/// 一般不直接使用，而是通过 [`SpinLock`](crate::SpinLock) 访问被保护的数据。
///
/// # 示例
/// ```
/// use lock_api::RawMutex;
/// use sync::RawSpinLock;
///
/// let lock = RawSpinLock::new();
/// lock.lock();
/// assert!(!lock.try_lock());
/// unsafe { lock.unlock() };
/// assert!(lock.try_lock());
/// ```
#[derive(Debug)]
pub struct RawSpinLock {
    lock: AtomicBool,
}

impl RawSpinLock {
    /// 创建一个新的 RawSpinLock 实例。
    pub const fn new() -> Self {
        RawSpinLock {
            lock: AtomicBool::new(false),
        }
    }
}

impl Default for RawSpinLock {
    fn default() -> Self {
        Self::new()
    }
}

unsafe impl lock_api::RawMutex for RawSpinLock {
    #[allow(clippy::declare_interior_mutable_const)]
    const INIT: Self = RawSpinLock::new();

    type GuardMarker = lock_api::GuardSend;

    fn lock(&self) {
        while self
            .lock
            .compare_exchange_weak(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_err()
        {
            // 只读自旋，避免在竞争时反复写缓存行
            while self.lock.load(Ordering::Relaxed) {
                hint::spin_loop();
            }
        }
    }

    fn try_lock(&self) -> bool {
        self.lock
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_ok()
    }

    unsafe fn unlock(&self) {
        self.lock.store(false, Ordering::Release);
    }

    fn is_locked(&self) -> bool {
        self.lock.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lock_api::RawMutex;

    #[test]
    fn test_lock_unlock() {
        let lock = RawSpinLock::new();
        assert!(!lock.is_locked());

        lock.lock();
        assert!(lock.is_locked());

        unsafe { lock.unlock() };
        assert!(!lock.is_locked());
    }

    #[test]
    fn test_try_lock_contended() {
        let lock = RawSpinLock::new();
        assert!(lock.try_lock());
        assert!(!lock.try_lock());

        unsafe { lock.unlock() };
        assert!(lock.try_lock());
        unsafe { lock.unlock() };
    }
}
