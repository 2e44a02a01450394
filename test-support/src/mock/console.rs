//! 捕获输出的控制台

use harness::ConsoleOutput;
use sync::SpinLock;

/// 把所有输出追加到内存缓冲区的控制台
///
/// 在启用了跟踪分配器的进程中使用时，应先调用 [`CaptureConsole::reserve`] 预留足够容量，
/// 否则测试执行期间缓冲区扩容会被计为泄漏。
pub struct CaptureConsole {
    buf: SpinLock<String>,
}

impl CaptureConsole {
    /// 空控制台，可用于 `static`
    pub const fn new() -> Self {
        Self {
            buf: SpinLock::new(String::new()),
        }
    }

    /// 预留容量
    pub fn reserve(&self, additional: usize) {
        self.buf.lock().reserve(additional);
    }

    /// 当前捕获内容的副本
    pub fn contents(&self) -> String {
        self.buf.lock().clone()
    }
}

impl Default for CaptureConsole {
    fn default() -> Self {
        Self::new()
    }
}

impl ConsoleOutput for CaptureConsole {
    fn write_str(&self, s: &str) {
        self.buf.lock().push_str(s);
    }
}
