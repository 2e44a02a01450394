//! 调试器断点
//!
//! [`debug_break`] 只在检测到调试器附加时才陷入；没有调试器（或平台不支持检测）时是空操作，
//! 因此可以在任何失败路径上无条件调用。

use once_cell::race::OnceBool;

/// 探测结果缓存，探测只做一次
static DEBUGGER_ATTACHED: OnceBool = OnceBool::new();

/// 当前进程是否被调试器跟踪
pub fn debugger_attached() -> bool {
    DEBUGGER_ATTACHED.get_or_init(detect_debugger)
}

/// 通知已附加的调试器；未附加时什么也不做
pub fn debug_break() {
    if debugger_attached() {
        log::trace!("debugger attached, trapping");
        trap();
    }
}

#[inline(always)]
fn trap() {
    // SAFETY: 断点指令不访问内存也不改变栈，调试器处理完后从下一条指令继续执行
    #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
    unsafe {
        core::arch::asm!("int3", options(nomem, nostack));
    }
    #[cfg(target_arch = "aarch64")]
    unsafe {
        core::arch::asm!("brk #0xf000", options(nomem, nostack));
    }
    #[cfg(target_arch = "riscv64")]
    unsafe {
        core::arch::asm!("ebreak", options(nomem, nostack));
    }
}

/// 读取 `/proc/self/status` 中的 TracerPid
///
/// 使用栈上缓冲区，探测过程不产生堆分配。
#[cfg(target_os = "linux")]
fn detect_debugger() -> bool {
    use std::io::Read;

    let mut buf = [0u8; 4096];
    let Ok(mut file) = std::fs::File::open("/proc/self/status") else {
        return false;
    };

    let mut len = 0;
    while len < buf.len() {
        match file.read(&mut buf[len..]) {
            Ok(0) => break,
            Ok(n) => len += n,
            Err(_) => return false,
        }
    }

    parse_tracer_pid(&buf[..len]).is_some_and(|pid| pid != 0)
}

#[cfg(not(target_os = "linux"))]
fn detect_debugger() -> bool {
    false
}

#[cfg_attr(not(target_os = "linux"), allow(dead_code))]
fn parse_tracer_pid(status: &[u8]) -> Option<u32> {
    // 缓冲区可能截断在多字节字符中间，只取合法前缀
    let text = match core::str::from_utf8(status) {
        Ok(text) => text,
        Err(err) => core::str::from_utf8(&status[..err.valid_up_to()]).ok()?,
    };

    text.lines()
        .find_map(|line| line.strip_prefix("TracerPid:"))
        .and_then(|pid| pid.trim().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tracer_pid() {
        let status = b"Name:\tunit\nState:\tR (running)\nTracerPid:\t0\nUid:\t0\n";
        assert_eq!(parse_tracer_pid(status), Some(0));

        let status = b"Name:\tunit\nTracerPid:\t4242\n";
        assert_eq!(parse_tracer_pid(status), Some(4242));
    }

    #[test]
    fn test_parse_tracer_pid_missing() {
        assert_eq!(parse_tracer_pid(b"Name:\tunit\n"), None);
        assert_eq!(parse_tracer_pid(b""), None);
    }

    #[test]
    fn test_parse_tracer_pid_truncated_utf8() {
        let mut status = b"TracerPid:\t7\nName:\t".to_vec();
        status.extend_from_slice(&"é".as_bytes()[..1]);
        assert_eq!(parse_tracer_pid(&status), Some(7));
    }

    #[test]
    fn test_detection_is_cached() {
        assert_eq!(debugger_attached(), debugger_attached());
    }
}
