//! `log` 门面到事件桥的转发
//!
//! 被测代码通过 `log::error!` 等宏输出的日志，与直接调用事件桥日志槽的效果相同：
//! 运行中的测试遇到未被抑制的 Error 级别日志即判定失败。
//!
//! 消息先格式化到固定大小的栈缓冲区（超长截断），转发过程不分配内存。

use crate::bridge::{BRIDGE, EventBridge};
use crate::config::MAX_LOG_MESSAGE_LENGTH;
use crate::error::{HarnessError, HarnessResult};
use core::fmt::{self, Write};
use log::{LevelFilter, Log, Metadata, Record};

/// 把 `log` 记录转发到事件桥日志槽的后端
#[derive(Debug)]
pub struct BridgeLogger {
    bridge: &'static EventBridge,
}

impl BridgeLogger {
    /// 创建转发到 `bridge` 的日志后端
    pub const fn new(bridge: &'static EventBridge) -> Self {
        Self { bridge }
    }
}

impl Log for BridgeLogger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record<'_>) {
        let mut message = MessageBuf::new();
        let _ = write!(message, "{}", record.args());
        self.bridge.log_emitted(record.level(), message.as_str());
    }

    fn flush(&self) {}
}

static LOGGER: BridgeLogger = BridgeLogger::new(&BRIDGE);

/// 安装进程级日志后端
///
/// Error 级别始终启用，即使 `level` 更低，否则 `log::error!` 无法让测试失败。
pub fn init_logger(level: LevelFilter) -> HarnessResult<()> {
    log::set_logger(&LOGGER).map_err(|_| HarnessError::LoggerAlreadySet)?;
    log::set_max_level(level.max(LevelFilter::Error));
    Ok(())
}

/// 定长消息缓冲区，超出容量的内容被截断在字符边界上
struct MessageBuf {
    buf: [u8; MAX_LOG_MESSAGE_LENGTH],
    len: usize,
}

impl MessageBuf {
    const fn new() -> Self {
        Self {
            buf: [0; MAX_LOG_MESSAGE_LENGTH],
            len: 0,
        }
    }

    fn as_str(&self) -> &str {
        core::str::from_utf8(&self.buf[..self.len]).unwrap_or_default()
    }
}

impl Write for MessageBuf {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        let mut take = s.len().min(MAX_LOG_MESSAGE_LENGTH - self.len);
        while !s.is_char_boundary(take) {
            take -= 1;
        }
        self.buf[self.len..self.len + take].copy_from_slice(&s.as_bytes()[..take]);
        self.len += take;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::result::UnitTestResult;
    use log::Level;

    #[test]
    fn test_message_truncation() {
        let mut message = MessageBuf::new();
        let long = "x".repeat(MAX_LOG_MESSAGE_LENGTH + 10);
        write!(message, "{}", long).unwrap();
        assert_eq!(message.as_str().len(), MAX_LOG_MESSAGE_LENGTH);
    }

    #[test]
    fn test_truncation_respects_char_boundary() {
        let mut message = MessageBuf::new();
        let filler = "a".repeat(MAX_LOG_MESSAGE_LENGTH - 1);
        write!(message, "{}é", filler).unwrap();
        assert_eq!(message.as_str(), filler);
    }

    #[test]
    fn test_record_forwarded_to_bridge() {
        static LOCAL: EventBridge = EventBridge::new();
        static LOCAL_LOGGER: BridgeLogger = BridgeLogger::new(&LOCAL);
        LOCAL.install_defaults();

        let result = UnitTestResult::new();
        LOCAL.with_active(&result, || {
            LOCAL_LOGGER.log(
                &Record::builder()
                    .args(format_args!("disk {}", "full"))
                    .level(Level::Warn)
                    .build(),
            );
            assert!(!result.failed_log());

            LOCAL_LOGGER.log(
                &Record::builder()
                    .args(format_args!("disk {}", "gone"))
                    .level(Level::Error)
                    .build(),
            );
        });
        assert!(result.failed_log());
    }
}
