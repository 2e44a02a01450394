//! 运行配置
//!
//! 编译期常量 + 由命令行参数 / 环境变量构造的 [`RunConfig`]。

use crate::error::{HarnessError, HarnessResult};
use log::{Level, LevelFilter};
use std::ffi::OsStr;

/// 分配头宽度（字节）
///
/// 头部记录请求的大小，同时必须保持返回指针的自然对齐，
/// 因此取主流平台 `max_align_t` 的大小。
pub const HEADER_SIZE: usize = 16;

/// 转发到事件桥的日志最低级别（默认值）
///
/// Error 总会被转发；Warn 作为诊断输出打印，Info 及以下默认过滤。
pub const DEFAULT_LOG_LEVEL: LevelFilter = LevelFilter::Warn;

/// 被视为测试失败的日志级别
pub const ERROR_SEVERITY: Level = Level::Error;

/// 单条日志消息的最大长度（字节），超出部分被截断
pub const MAX_LOG_MESSAGE_LENGTH: usize = 256;

/// 覆盖日志级别的环境变量名
pub const LOG_LEVEL_ENV: &str = "HARNESS_LOG_LEVEL";

/// 单次运行的配置
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    /// 测试名过滤子串（区分大小写）；`None` 表示运行全部测试
    pub filter: Option<String>,
    /// 日志转发级别
    pub log_level: LevelFilter,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            filter: None,
            log_level: DEFAULT_LOG_LEVEL,
        }
    }
}

impl RunConfig {
    /// 从位置参数（不含程序名）和可选的日志级别字符串构造配置
    ///
    /// 过滤串和日志级别各自独立解析：任一项有问题时只有该项回退到默认值，
    /// 问题随配置一起返回，由调用方决定如何报告。
    ///
    /// - 最多接受一个参数作为测试名过滤子串；非 UTF-8 字节按替换字符处理；
    /// - 参数多于一个时不过滤；
    /// - 日志级别无法解析时使用 [`DEFAULT_LOG_LEVEL`]。
    pub fn from_args<I, S>(args: I, log_level: Option<&str>) -> (Self, Vec<HarnessError>)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let mut problems = Vec::new();

        let filter = parse_filter(args).unwrap_or_else(|err| {
            problems.push(err);
            None
        });
        let log_level = log_level
            .map(parse_log_level)
            .transpose()
            .unwrap_or_else(|err| {
                problems.push(err);
                None
            })
            .unwrap_or(DEFAULT_LOG_LEVEL);

        (Self { filter, log_level }, problems)
    }

    /// 从进程参数和 [`LOG_LEVEL_ENV`] 构造配置
    pub fn from_env() -> (Self, Vec<HarnessError>) {
        let level = std::env::var_os(LOG_LEVEL_ENV).map(|raw| raw.to_string_lossy().into_owned());
        Self::from_args(std::env::args_os().skip(1), level.as_deref())
    }

    /// 测试名是否通过过滤
    pub fn matches(&self, name: &str) -> bool {
        match &self.filter {
            Some(filter) => name.contains(filter.as_str()),
            None => true,
        }
    }
}

fn parse_filter<I, S>(args: I) -> HarnessResult<Option<String>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let mut args = args.into_iter();
    let Some(first) = args.next() else {
        return Ok(None);
    };

    let rest = args.count();
    if rest > 0 {
        return Err(HarnessError::TooManyArguments(rest + 1));
    }
    Ok(Some(first.as_ref().to_string_lossy().into_owned()))
}

fn parse_log_level(raw: &str) -> HarnessResult<LevelFilter> {
    raw.trim()
        .parse::<LevelFilter>()
        .map_err(|_| HarnessError::InvalidLogLevel(raw.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn parse(list: &[&str], log_level: Option<&str>) -> RunConfig {
        let (config, problems) = RunConfig::from_args(args(list), log_level);
        assert!(problems.is_empty(), "unexpected problems: {problems:?}");
        config
    }

    #[test]
    fn test_no_arguments_runs_everything() {
        let config = parse(&[], None);
        assert_eq!(config, RunConfig::default());
        assert!(config.matches("anything"));
        assert!(config.matches(""));
    }

    #[test]
    fn test_single_argument_is_filter() {
        let config = parse(&["Nested"], None);
        assert_eq!(config.filter.as_deref(), Some("Nested"));
        assert!(config.matches("ExampleTest_Nested"));
        assert!(config.matches("Nested"));
        assert!(!config.matches("ExampleTest_nested"));
        assert!(!config.matches("ExampleTest"));
    }

    #[test]
    fn test_too_many_arguments() {
        let (config, problems) = RunConfig::from_args(args(&["a", "b"]), Some("info"));
        assert_eq!(problems, [HarnessError::TooManyArguments(2)]);
        assert_eq!(config.filter, None);
        assert_eq!(config.log_level, LevelFilter::Info);
    }

    #[test]
    fn test_log_level_override() {
        let config = parse(&[], Some("debug"));
        assert_eq!(config.log_level, LevelFilter::Debug);

        let config = parse(&[], Some(" OFF "));
        assert_eq!(config.log_level, LevelFilter::Off);
    }

    #[test]
    fn test_invalid_log_level_keeps_filter() {
        let (config, problems) = RunConfig::from_args(args(&["Nested"]), Some("loud"));
        assert_eq!(problems, [HarnessError::InvalidLogLevel("loud".to_string())]);
        assert_eq!(config.filter.as_deref(), Some("Nested"));
        assert_eq!(config.log_level, DEFAULT_LOG_LEVEL);
        assert!(config.matches("ExampleTest_Nested"));
        assert!(!config.matches("ExampleTest_Simple"));
    }

    #[cfg(unix)]
    #[test]
    fn test_non_utf8_filter_is_accepted() {
        use std::ffi::OsString;
        use std::os::unix::ffi::OsStringExt;

        let raw = OsString::from_vec(b"\xff".to_vec());
        let (config, problems) = RunConfig::from_args([raw], None);
        assert!(problems.is_empty());
        assert_eq!(config.filter.as_deref(), Some("\u{FFFD}"));
        assert!(!config.matches("ExampleTest"));
    }

    #[test]
    fn test_header_preserves_alignment() {
        assert!(HEADER_SIZE.is_power_of_two());
        assert!(HEADER_SIZE >= core::mem::size_of::<usize>());
    }
}
