//! 测试运行器
//!
//! 每个测试经历 *Setup → Executing → Evaluating → Reported*：
//!
//! 1. 构造新的 [`UnitTestResult`]；未通过名称过滤的测试只打印跳过提示，不触碰计数器；
//! 2. 记录存活字节和累计字节快照，在事件桥中激活结果后调用测试入口；
//! 3. 按优先级判定：期望失败 > 断言/日志事件 > 存活字节变化（泄漏），否则成功；
//! 4. 打印判定结果，任一测试失败则整次运行失败。
//!
//! 全部测试和宿主 `teardown` 结束后，再与第一个测试之前的基线比较一次，不一致即 teardown 泄漏。
//!
//! 运行过程中 runner 自身不在测试窗口内分配内存：报告向量预先按测试数分配，
//! 控制台输出不经过中间字符串。

use crate::bridge::{BRIDGE, EventBridge};
use crate::config::RunConfig;
use crate::console::{ConsoleOutput, STDOUT};
use crate::console_print;
use crate::debug::{debug_break, debugger_attached};
use crate::host::Host;
use crate::logger::init_logger;
use crate::registry::{UnitTest, registered_tests};
use crate::result::{FailedExpectation, UnitTestResult};
use crate::tracker::{AllocCounters, AllocSnapshot, COUNTERS};
use std::process::ExitCode;

/// 测试失败原因
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FailureCause {
    /// 第一个失败的期望
    Expectation(FailedExpectation),
    /// 事件桥报告了断言失败或 Error 日志
    Event,
    /// 测试前后存活字节数不一致
    Leak {
        /// 测试前存活字节
        before: i64,
        /// 测试后存活字节
        after: i64,
    },
}

/// 单个测试的判定
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verdict {
    /// 成功，附带测试期间累计分配的字节数
    Success {
        /// 累计分配字节增量
        allocated: i64,
    },
    /// 失败
    Failed(FailureCause),
}

impl Verdict {
    /// 按优先级判定测试结果
    pub fn evaluate(result: &UnitTestResult, before: AllocSnapshot, after: AllocSnapshot) -> Self {
        if let Some(failure) = result.failure() {
            Verdict::Failed(FailureCause::Expectation(*failure))
        } else if result.failed_assert() || result.failed_log() {
            Verdict::Failed(FailureCause::Event)
        } else if before.live != after.live {
            Verdict::Failed(FailureCause::Leak {
                before: before.live,
                after: after.live,
            })
        } else {
            Verdict::Success {
                allocated: after.total - before.total,
            }
        }
    }

    /// 是否成功
    pub fn is_success(&self) -> bool {
        matches!(self, Verdict::Success { .. })
    }
}

/// 单个测试的结局
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// 被过滤跳过
    Skipped,
    /// 已运行
    Ran(Verdict),
}

/// 报告中的一条记录
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TestOutcome {
    /// 测试名
    pub name: &'static str,
    /// 结局
    pub outcome: Outcome,
}

/// teardown 泄漏
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TeardownLeak {
    /// 运行前的存活字节基线
    pub expected: i64,
    /// teardown 之后的存活字节
    pub actual: i64,
}

/// 一次运行的汇总
#[derive(Debug, Default)]
pub struct RunReport {
    /// 按运行顺序的结局
    pub outcomes: Vec<TestOutcome>,
    /// teardown 泄漏（若有）
    pub teardown_leak: Option<TeardownLeak>,
}

impl RunReport {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            outcomes: Vec::with_capacity(capacity),
            teardown_leak: None,
        }
    }

    /// 第一个同名测试的结局
    pub fn outcome(&self, name: &str) -> Option<Outcome> {
        self.outcomes
            .iter()
            .find(|o| o.name == name)
            .map(|o| o.outcome)
    }

    /// 实际运行的测试数
    pub fn ran(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.outcome, Outcome::Ran(_)))
            .count()
    }

    /// 成功的测试数
    pub fn passed(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.outcome, Outcome::Ran(v) if v.is_success()))
            .count()
    }

    /// 失败的测试数
    pub fn failed(&self) -> usize {
        self.ran() - self.passed()
    }

    /// 跳过的测试数
    pub fn skipped(&self) -> usize {
        self.outcomes.len() - self.ran()
    }

    /// 没有失败的测试，也没有 teardown 泄漏
    pub fn is_success(&self) -> bool {
        self.failed() == 0 && self.teardown_leak.is_none()
    }

    /// 进程退出码：成功 0，否则 1
    pub fn status(&self) -> u8 {
        if self.is_success() { 0 } else { 1 }
    }

    /// 进程退出码
    pub fn exit_code(&self) -> ExitCode {
        ExitCode::from(self.status())
    }
}

/// 测试运行器
pub struct Runner<'a> {
    config: &'a RunConfig,
    counters: &'a AllocCounters,
    bridge: &'static EventBridge,
    console: &'a dyn ConsoleOutput,
}

impl<'a> Runner<'a> {
    /// 使用进程级计数器、事件桥和标准输出
    pub fn new(config: &'a RunConfig) -> Self {
        Self {
            config,
            counters: &COUNTERS,
            bridge: &BRIDGE,
            console: &STDOUT,
        }
    }

    /// 指定泄漏检测读取的计数器
    pub fn counters(mut self, counters: &'a AllocCounters) -> Self {
        self.counters = counters;
        self
    }

    /// 指定激活测试结果的事件桥
    pub fn bridge(mut self, bridge: &'static EventBridge) -> Self {
        self.bridge = bridge;
        self
    }

    /// 指定进度输出的控制台
    pub fn console(mut self, console: &'a dyn ConsoleOutput) -> Self {
        self.console = console;
        self
    }

    /// 按顺序运行 `tests`
    pub fn run(&self, tests: &[UnitTest], host: &mut dyn Host) -> RunReport {
        let mut report = RunReport::with_capacity(tests.len());

        // 先输出一次，控制台的惰性缓冲区在基线之前建立；调试器探测结果也在此缓存
        console_print!(self.console, "\n--- Running {} tests ---\n", tests.len());
        self.console.flush();
        let _ = debugger_attached();

        let overall_before = self.counters.bytes_allocated();
        host.init(self.bridge);

        for test in tests {
            if !self.config.matches(test.name) {
                console_print!(self.console, "Skipping test {}\n", test.name);
                report.outcomes.push(TestOutcome {
                    name: test.name,
                    outcome: Outcome::Skipped,
                });
                continue;
            }

            let verdict = self.run_one(test);
            report.outcomes.push(TestOutcome {
                name: test.name,
                outcome: Outcome::Ran(verdict),
            });
        }

        host.teardown();

        let actual = self.counters.bytes_allocated();
        if actual != overall_before {
            console_print!(
                self.console,
                "FAILED!\n    {} bytes were still allocated at teardown; expected {}.\n",
                actual,
                overall_before
            );
            report.teardown_leak = Some(TeardownLeak {
                expected: overall_before,
                actual,
            });
        }

        self.print_summary(&report);

        if !report.is_success() {
            debug_break();
        }
        report
    }

    fn run_one(&self, test: &UnitTest) -> Verdict {
        log::debug!("running {} ({}:{})", test.name, test.file, test.line);

        let result = UnitTestResult::new();
        console_print!(self.console, "Running test {} ...", test.name);
        self.console.flush();

        let before = self.counters.snapshot();
        self.bridge.with_active(&result, || test.run(&result));
        let after = self.counters.snapshot();

        let verdict = Verdict::evaluate(&result, before, after);
        self.print_verdict(&verdict);
        self.console.flush();
        verdict
    }

    fn print_verdict(&self, verdict: &Verdict) {
        match verdict {
            Verdict::Failed(FailureCause::Expectation(failure)) => console_print!(
                self.console,
                " FAILED!\n    {}:{}\n    {}\n",
                failure.file,
                failure.line,
                failure.condition
            ),
            Verdict::Failed(FailureCause::Event) => console_print!(
                self.console,
                " FAILED!\n    Assert or log event in unit test.\n"
            ),
            Verdict::Failed(FailureCause::Leak { before, after }) => console_print!(
                self.console,
                " FAILED!\n    {} bytes before test, {} bytes after test. Memory leak?\n",
                before,
                after
            ),
            Verdict::Success { allocated } => {
                console_print!(self.console, " SUCCESS! (alloc: {})\n", allocated)
            }
        }
    }

    fn print_summary(&self, report: &RunReport) {
        console_print!(self.console, "\x1b[33m\n--- Test Summary ---\x1b[0m\n");
        console_print!(
            self.console,
            "\x1b[33mTotal: {}\x1b[0m, \x1b[32mPassed: {}\x1b[0m, \x1b[91mFailed: {}\x1b[0m, Skipped: {}\n",
            report.outcomes.len(),
            report.passed(),
            report.failed(),
            report.skipped()
        );
        if report.is_success() {
            console_print!(self.console, "\x1b[32mAll tests passed!\x1b[0m\n");
        } else {
            console_print!(self.console, "\x1b[91mSome tests failed!\x1b[0m\n");
        }
        self.console.flush();
    }
}

/// 常规入口：解析配置、安装事件处理和日志后端，运行所有已注册的测试
///
/// ```no_run
/// use harness::NoHost;
///
/// fn main() -> std::process::ExitCode {
///     harness::run_main(&mut NoHost)
/// }
/// ```
pub fn run_main(host: &mut dyn Host) -> ExitCode {
    let (config, problems) = RunConfig::from_env();
    for problem in &problems {
        console_print!(&STDOUT, "{}\n", problem);
    }

    BRIDGE.install_defaults();
    if let Err(err) = init_logger(config.log_level) {
        console_print!(&STDOUT, "{}\n", err);
    }

    let tests = registered_tests();
    Runner::new(&config).run(&tests, host).exit_code()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(live: i64, total: i64) -> AllocSnapshot {
        AllocSnapshot { live, total }
    }

    #[test]
    fn test_clean_result_succeeds_with_delta() {
        let result = UnitTestResult::new();
        let verdict = Verdict::evaluate(&result, snapshot(10, 100), snapshot(10, 164));
        assert_eq!(verdict, Verdict::Success { allocated: 64 });
    }

    #[test]
    fn test_leak_detected() {
        let result = UnitTestResult::new();
        let verdict = Verdict::evaluate(&result, snapshot(10, 100), snapshot(42, 132));
        assert_eq!(
            verdict,
            Verdict::Failed(FailureCause::Leak {
                before: 10,
                after: 42
            })
        );
    }

    #[test]
    fn test_event_beats_leak() {
        let result = UnitTestResult::new();
        result.mark_failed_log();
        let verdict = Verdict::evaluate(&result, snapshot(0, 0), snapshot(8, 8));
        assert_eq!(verdict, Verdict::Failed(FailureCause::Event));
    }

    #[test]
    fn test_expectation_beats_everything() {
        let result = UnitTestResult::new();
        let failure = FailedExpectation::new("x", "t.rs", 1);
        result.record_failure(failure);
        result.mark_failed_assert();
        let verdict = Verdict::evaluate(&result, snapshot(0, 0), snapshot(8, 8));
        assert_eq!(verdict, Verdict::Failed(FailureCause::Expectation(failure)));
    }

    #[test]
    fn test_report_counts_and_status() {
        let mut report = RunReport::default();
        assert!(report.is_success());
        assert_eq!(report.status(), 0);

        report.outcomes.push(TestOutcome {
            name: "a",
            outcome: Outcome::Ran(Verdict::Success { allocated: 0 }),
        });
        report.outcomes.push(TestOutcome {
            name: "b",
            outcome: Outcome::Skipped,
        });
        assert_eq!((report.ran(), report.passed(), report.skipped()), (1, 1, 1));
        assert!(report.is_success());

        report.teardown_leak = Some(TeardownLeak {
            expected: 0,
            actual: 16,
        });
        assert!(!report.is_success());
        assert_eq!(report.status(), 1);

        report.teardown_leak = None;
        report.outcomes.push(TestOutcome {
            name: "c",
            outcome: Outcome::Ran(Verdict::Failed(FailureCause::Event)),
        });
        assert_eq!(report.failed(), 1);
        assert_eq!(report.status(), 1);
        assert_eq!(
            report.outcome("c"),
            Some(Outcome::Ran(Verdict::Failed(FailureCause::Event)))
        );
    }
}
