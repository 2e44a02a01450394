//! 分配跟踪器
//!
//! 进程级的两个计数器：
//!
//! - `bytes_allocated`：当前存活字节数（有符号，容忍短暂的不平衡）
//! - `total_bytes_allocated`：累计分配字节数，只用于报告，不参与泄漏判断
//!
//! [`Tracker`] 包装一个底层分配器（默认 [`System`]），在每块内存前放一个定宽头部记录请求的大小，
//! 因此 [`Tracker::free`] 只凭指针即可恢复大小，不需要外部表。
//!
//! # 内存布局
//!
//! ```text
//! raw                                user
//!  |<------------- header ------------->|<---- size ---->|
//!  |        (padding)        | size:usize|    payload     |
//! ```
//!
//! 头部宽度为 `max(HEADER_SIZE, align)`，返回指针保持请求的对齐。
//!
//! # 全局分配器
//!
//! [`Tracker`] 实现了 [`GlobalAlloc`]，可以通过 `#[global_allocator]` 直接替换进程的默认分配器，
//! 此时所有堆分配都参与泄漏检测；失败条件与底层分配器完全一致（返回空指针）。

use crate::config::HEADER_SIZE;
use core::alloc::{GlobalAlloc, Layout};
use core::ptr;
use core::sync::atomic::{AtomicI64, Ordering};
use std::alloc::System;

/// 存活字节和累计字节计数器
#[derive(Debug, Default)]
pub struct AllocCounters {
    bytes_allocated: AtomicI64,
    total_bytes_allocated: AtomicI64,
}

/// 某一时刻的计数器快照
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct AllocSnapshot {
    /// 存活字节数
    pub live: i64,
    /// 累计分配字节数
    pub total: i64,
}

impl AllocCounters {
    /// 全零计数器
    pub const fn new() -> Self {
        Self {
            bytes_allocated: AtomicI64::new(0),
            total_bytes_allocated: AtomicI64::new(0),
        }
    }

    /// 记录一次分配
    pub fn record_alloc(&self, size: usize) {
        let size = size as i64;
        self.bytes_allocated.fetch_add(size, Ordering::Relaxed);
        self.total_bytes_allocated.fetch_add(size, Ordering::Relaxed);
    }

    /// 记录一次释放
    pub fn record_free(&self, size: usize) {
        self.bytes_allocated
            .fetch_sub(size as i64, Ordering::Relaxed);
    }

    /// 当前存活字节数
    pub fn bytes_allocated(&self) -> i64 {
        self.bytes_allocated.load(Ordering::Relaxed)
    }

    /// 累计分配字节数
    pub fn total_bytes_allocated(&self) -> i64 {
        self.total_bytes_allocated.load(Ordering::Relaxed)
    }

    /// 读取快照
    pub fn snapshot(&self) -> AllocSnapshot {
        AllocSnapshot {
            live: self.bytes_allocated(),
            total: self.total_bytes_allocated(),
        }
    }
}

/// 带大小头部的计数分配器
#[derive(Debug)]
pub struct Tracker<A = System> {
    backend: A,
    counters: &'static AllocCounters,
}

impl Tracker<System> {
    /// 以系统分配器为后端
    pub const fn new(counters: &'static AllocCounters) -> Self {
        Self {
            backend: System,
            counters,
        }
    }
}

impl<A> Tracker<A> {
    /// 以任意分配器为后端
    pub const fn with_backend(backend: A, counters: &'static AllocCounters) -> Self {
        Self { backend, counters }
    }

    /// 该跟踪器更新的计数器
    pub fn counters(&self) -> &'static AllocCounters {
        self.counters
    }
}

impl<A: GlobalAlloc> Tracker<A> {
    /// 分配 `size` 字节，返回对齐到 [`HEADER_SIZE`] 的指针
    ///
    /// 底层分配失败或大小溢出时返回空指针，计数器不变。
    pub fn allocate(&self, size: usize) -> *mut u8 {
        let Some(raw_layout) = raw_layout(size, HEADER_SIZE) else {
            return ptr::null_mut();
        };

        // SAFETY: raw_layout 大小至少为 HEADER_SIZE，非零
        let raw = unsafe { self.backend.alloc(raw_layout) };
        if raw.is_null() {
            return raw;
        }

        self.counters.record_alloc(size);
        // SAFETY: raw 指向 size + HEADER_SIZE 字节的新分配块
        unsafe { write_header(raw, HEADER_SIZE, size) }
    }

    /// 释放由 [`Tracker::allocate`] 返回的指针；空指针是空操作
    ///
    /// # Safety
    ///
    /// `ptr` 必须为空，或是同一后端的 [`Tracker::allocate`] 返回且尚未释放的指针。
    pub unsafe fn free(&self, ptr: *mut u8) {
        if ptr.is_null() {
            return;
        }

        // SAFETY: 调用者保证 ptr 来自 allocate，头部有效
        let size = unsafe { read_header(ptr) };
        // SAFETY: 与 allocate 使用相同的头部宽度和布局
        unsafe {
            let raw = ptr.sub(HEADER_SIZE);
            let layout = Layout::from_size_align_unchecked(size + HEADER_SIZE, HEADER_SIZE);
            self.backend.dealloc(raw, layout);
        }
        self.counters.record_free(size);
    }

    /// 读取一块存活内存记录的请求大小
    ///
    /// # Safety
    ///
    /// `ptr` 必须是该跟踪器返回且尚未释放的非空指针。
    pub unsafe fn requested_size(&self, ptr: *const u8) -> usize {
        // SAFETY: 由调用者保证
        unsafe { read_header(ptr) }
    }
}

unsafe impl<A: GlobalAlloc> GlobalAlloc for Tracker<A> {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        let header = header_width(layout);
        let Some(raw_layout) = raw_layout(layout.size(), header) else {
            return ptr::null_mut();
        };

        // SAFETY: raw_layout 非零大小
        let raw = unsafe { self.backend.alloc(raw_layout) };
        if raw.is_null() {
            return raw;
        }

        self.counters.record_alloc(layout.size());
        // SAFETY: raw 指向 size + header 字节的新分配块
        unsafe { write_header(raw, header, layout.size()) }
    }

    unsafe fn alloc_zeroed(&self, layout: Layout) -> *mut u8 {
        let header = header_width(layout);
        let Some(raw_layout) = raw_layout(layout.size(), header) else {
            return ptr::null_mut();
        };

        // SAFETY: raw_layout 非零大小
        let raw = unsafe { self.backend.alloc_zeroed(raw_layout) };
        if raw.is_null() {
            return raw;
        }

        self.counters.record_alloc(layout.size());
        // SAFETY: 同 alloc
        unsafe { write_header(raw, header, layout.size()) }
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        let header = header_width(layout);
        // SAFETY: ptr 来自本分配器的 alloc，头部有效
        let size = unsafe { read_header(ptr) };
        debug_assert_eq!(size, layout.size());

        // SAFETY: 与 alloc 使用相同的头部宽度，布局在分配时已校验
        unsafe {
            let raw = ptr.sub(header);
            let raw_layout = Layout::from_size_align_unchecked(size + header, header);
            self.backend.dealloc(raw, raw_layout);
        }
        self.counters.record_free(size);
    }

    unsafe fn realloc(&self, ptr: *mut u8, layout: Layout, new_size: usize) -> *mut u8 {
        let header = header_width(layout);
        let Some(new_raw_layout) = raw_layout(new_size, header) else {
            return ptr::null_mut();
        };

        // SAFETY: ptr 来自本分配器的 alloc，旧布局与分配时一致
        let new_raw = unsafe {
            let raw = ptr.sub(header);
            let old_raw_layout = Layout::from_size_align_unchecked(layout.size() + header, header);
            self.backend.realloc(raw, old_raw_layout, new_raw_layout.size())
        };
        if new_raw.is_null() {
            // 旧块保持不变，计数器也不变
            return new_raw;
        }

        self.counters.record_free(layout.size());
        self.counters.record_alloc(new_size);
        // SAFETY: new_raw 指向 new_size + header 字节，头部区域由 realloc 原样保留
        unsafe { write_header(new_raw, header, new_size) }
    }
}

/// 头部宽度：至少 HEADER_SIZE，且不小于请求的对齐
#[inline]
fn header_width(layout: Layout) -> usize {
    layout.align().max(HEADER_SIZE)
}

/// 实际向后端申请的布局；溢出时返回 None
#[inline]
fn raw_layout(size: usize, header: usize) -> Option<Layout> {
    let total = size.checked_add(header)?;
    Layout::from_size_align(total, header).ok()
}

/// 在 raw 块中写入大小头部，返回用户指针
///
/// # Safety
///
/// `raw` 必须指向至少 `header + size` 字节、按 `header` 对齐的可写内存。
#[inline]
unsafe fn write_header(raw: *mut u8, header: usize, size: usize) -> *mut u8 {
    // SAFETY: header >= size_of::<usize>()，user - 1 个 usize 仍落在头部内且按 usize 对齐
    unsafe {
        let user = raw.add(header);
        user.cast::<usize>().sub(1).write(size);
        user
    }
}

/// 读取用户指针前的大小头部
///
/// # Safety
///
/// `user` 必须是 [`write_header`] 返回且尚未释放的指针。
#[inline]
unsafe fn read_header(user: *const u8) -> usize {
    // SAFETY: 由调用者保证
    unsafe { user.cast::<usize>().sub(1).read() }
}

/// 进程级计数器
pub static COUNTERS: AllocCounters = AllocCounters::new();

/// 使用进程级计数器的显式跟踪器
pub static TRACKER: Tracker = Tracker::new(&COUNTERS);

/// 通过进程级跟踪器分配
pub fn allocate(size: usize) -> *mut u8 {
    TRACKER.allocate(size)
}

/// 通过进程级跟踪器释放
///
/// # Safety
///
/// 见 [`Tracker::free`]。
pub unsafe fn free(ptr: *mut u8) {
    // SAFETY: 由调用者保证
    unsafe { TRACKER.free(ptr) }
}

/// 进程级存活字节数
pub fn bytes_allocated() -> i64 {
    COUNTERS.bytes_allocated()
}

/// 进程级累计分配字节数
pub fn total_bytes_allocated() -> i64 {
    COUNTERS.total_bytes_allocated()
}
