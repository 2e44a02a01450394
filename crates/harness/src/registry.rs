//! 测试注册表
//!
//! 两种注册来源：
//!
//! 1. **静态注册**：[`unit_test!`](crate::unit_test) 为每个测试生成一个由 `inventory` 收集的静态节点，
//!    在 `main` 之前由链接器/加载器完成，调用处无需任何显式代码。
//! 2. **运行时注册**：[`register`] 追加到进程级 [`REGISTRY`]，任何时刻都可以调用
//!    （包括其它静态初始化代码中），只是向一个常量初始化的空列表追加。
//!
//! # 顺序
//!
//! 静态节点的收集顺序由平台决定，因此按声明位置 `(file, line)` 排序：同一文件内按声明顺序运行，
//! 不同文件之间的顺序是实现定义的，不应依赖。运行时注册的测试排在静态测试之后，保持追加顺序。
//! 允许重名（包括空名），重名的测试都会运行。

use crate::result::UnitTestResult;
use core::panic::Location;
use sync::SpinLock;

/// 测试入口函数
pub type UnitTestFn = fn(&UnitTestResult);

/// 测试描述符，注册后不可变
#[derive(Clone, Copy, Debug)]
pub struct UnitTest {
    /// 测试名
    pub name: &'static str,
    /// 测试入口
    pub function: UnitTestFn,
    /// 声明所在源文件
    pub file: &'static str,
    /// 声明所在行
    pub line: u32,
}

impl UnitTest {
    /// 构造描述符；`const` 以便作为静态节点提交
    pub const fn new(
        name: &'static str,
        function: UnitTestFn,
        file: &'static str,
        line: u32,
    ) -> Self {
        Self {
            name,
            function,
            file,
            line,
        }
    }

    /// 以 `result` 运行该测试
    pub fn run(&self, result: &UnitTestResult) {
        (self.function)(result);
    }
}

inventory::collect!(UnitTest);

/// 运行时注册表
#[derive(Debug)]
pub struct Registry {
    tests: SpinLock<Vec<UnitTest>>,
}

impl Registry {
    /// 空注册表
    pub const fn new() -> Self {
        Self {
            tests: SpinLock::new(Vec::new()),
        }
    }

    /// 注册测试，以调用处作为声明位置
    #[track_caller]
    pub fn register(&self, name: &'static str, function: UnitTestFn) {
        let location = Location::caller();
        self.push(UnitTest::new(
            name,
            function,
            location.file(),
            location.line(),
        ));
    }

    /// 追加描述符
    pub fn push(&self, test: UnitTest) {
        log::debug!("registered test {} ({}:{})", test.name, test.file, test.line);
        self.tests.lock().push(test);
    }

    /// 按注册顺序返回所有描述符
    pub fn tests(&self) -> Vec<UnitTest> {
        self.tests.lock().clone()
    }

    /// 已注册的测试数
    pub fn len(&self) -> usize {
        self.tests.lock().len()
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

/// 进程级运行时注册表
pub static REGISTRY: Registry = Registry::new();

/// 向进程级注册表追加一个测试
#[track_caller]
pub fn register(name: &'static str, function: UnitTestFn) {
    REGISTRY.register(name, function);
}

/// 所有静态声明的测试，按声明位置排序
pub fn static_tests() -> Vec<UnitTest> {
    let mut tests: Vec<UnitTest> = inventory::iter::<UnitTest>.into_iter().copied().collect();
    tests.sort_by(|a, b| (a.file, a.line).cmp(&(b.file, b.line)));
    tests
}

/// runner 使用的完整有序视图：静态测试在前，运行时注册的测试在后
pub fn registered_tests() -> Vec<UnitTest> {
    let mut tests = static_tests();
    tests.extend(REGISTRY.tests());
    tests
}
