//! harness 错误类型
//!
//! 测试本身的失败不走这里（见 [`Verdict`](crate::Verdict)）；
//! 这里只描述运行前的配置和初始化错误。

use core::fmt;

/// harness 配置 / 初始化阶段可能发生的错误
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HarnessError {
    /// 位置参数多于一个（携带实际个数）
    TooManyArguments(usize),
    /// 无法解析的日志级别字符串
    InvalidLogLevel(String),
    /// 进程中已经安装了其它 `log` 后端
    LoggerAlreadySet,
}

impl fmt::Display for HarnessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HarnessError::TooManyArguments(count) => write!(
                f,
                "expected at most one test name filter, got {} arguments; running all tests",
                count
            ),
            HarnessError::InvalidLogLevel(raw) => {
                write!(f, "invalid log level '{}'; using the default level", raw)
            }
            HarnessError::LoggerAlreadySet => {
                f.write_str("a logger is already installed; log events are not forwarded")
            }
        }
    }
}

impl std::error::Error for HarnessError {}

/// harness 操作的结果类型
pub type HarnessResult<T> = Result<T, HarnessError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        assert_eq!(
            HarnessError::TooManyArguments(3).to_string(),
            "expected at most one test name filter, got 3 arguments; running all tests"
        );
        assert_eq!(
            HarnessError::InvalidLogLevel("loud".into()).to_string(),
            "invalid log level 'loud'; using the default level"
        );
        assert!(
            HarnessError::LoggerAlreadySet
                .to_string()
                .contains("already installed")
        );
    }
}
