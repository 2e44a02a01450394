//! 控制台输出
//!
//! runner 通过传入的 [`ConsoleOutput`] 输出测试进度；事件桥的诊断信息则写到进程级控制台，
//! 默认是标准输出，可通过 [`register_console`] 替换（例如测试中捕获输出）。
//!
//! 所有格式化都经过 [`core::fmt::Write`] 适配器直接写入，不产生中间 `String`，
//! 因此在测试执行期间打印不会影响分配计数。

use core::fmt;
use std::io;
use sync::SpinLock;

/// 控制台输出 trait
pub trait ConsoleOutput: Send + Sync {
    /// 输出字符串
    fn write_str(&self, s: &str);

    /// 刷新缓冲的输出
    fn flush(&self) {}
}

/// 标准输出控制台
#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutConsole;

impl ConsoleOutput for StdoutConsole {
    fn write_str(&self, s: &str) {
        write_quietly(&mut io::stdout(), s);
    }

    fn flush(&self) {
        let _ = io::Write::flush(&mut io::stdout());
    }
}

/// 写入失败（管道关闭、磁盘已满）时丢弃输出，运行继续
fn write_quietly(out: &mut impl io::Write, s: &str) {
    let _ = out.write_all(s.as_bytes());
}

/// 默认控制台实例
pub static STDOUT: StdoutConsole = StdoutConsole;

/// 进程级控制台注册槽
static CONSOLE: SpinLock<Option<&'static dyn ConsoleOutput>> = SpinLock::new(None);

/// 注册进程级控制台，替换之前注册的实现
pub fn register_console(console: &'static dyn ConsoleOutput) {
    *CONSOLE.lock() = Some(console);
}

/// 获取进程级控制台；未注册时返回 [`STDOUT`]
pub fn console() -> &'static dyn ConsoleOutput {
    let registered = *CONSOLE.lock();
    registered.unwrap_or(&STDOUT)
}

struct ConsoleWriter<'a>(&'a dyn ConsoleOutput);

impl fmt::Write for ConsoleWriter<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.0.write_str(s);
        Ok(())
    }
}

/// 将格式化参数写入控制台
pub fn write_fmt(console: &dyn ConsoleOutput, args: fmt::Arguments<'_>) {
    let _ = fmt::Write::write_fmt(&mut ConsoleWriter(console), args);
}

/// 格式化输出到指定控制台
#[doc(hidden)]
#[macro_export]
macro_rules! console_print {
    ($console:expr, $($arg:tt)*) => {
        $crate::console::write_fmt($console, format_args!($($arg)*))
    };
}
