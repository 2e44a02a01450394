//! 面向测试作者的宏
//!
//! - [`unit_test!`](crate::unit_test)：声明并静态注册一个测试
//! - [`expect!`](crate::expect) / [`expect_eq!`](crate::expect_eq) / [`expect_ne!`](crate::expect_ne)：
//!   记录失败但不中止测试，只保留第一次失败
//! - [`fail!`](crate::fail)：无条件失败
//! - [`ignore_asserts!`](crate::ignore_asserts) / [`ignore_log!`](crate::ignore_log)：
//!   切换事件桥抑制开关；不会自动复位，测试结束前需要手动关闭

/// 声明一个测试函数并在 `main` 之前注册
///
/// 测试名默认取函数名，也可以显式给出：
///
/// ```
/// use harness::{expect, unit_test};
///
/// unit_test!(fn addition_works(t) {
///     expect!(t, 2 + 3 == 5);
/// });
///
/// unit_test!("Addition_Named", fn addition_named(t) {
///     expect!(t, 2 + 2 == 4);
/// });
/// # fn main() {}
/// ```
#[macro_export]
macro_rules! unit_test {
    ($(#[$meta:meta])* fn $func:ident($t:ident) $body:block) => {
        $crate::unit_test!(stringify!($func), $(#[$meta])* fn $func($t) $body);
    };
    ($name:expr, $(#[$meta:meta])* fn $func:ident($t:ident) $body:block) => {
        $(#[$meta])*
        fn $func($t: &$crate::UnitTestResult) $body

        $crate::inventory::submit! {
            $crate::UnitTest::new($name, $func, file!(), line!())
        }
    };
}

/// 条件为假时记录失败（只保留测试中的第一次失败）
#[macro_export]
macro_rules! expect {
    ($t:expr, $cond:expr $(,)?) => {{
        if !$cond {
            let _ = $t.record_failure($crate::FailedExpectation::new(
                stringify!($cond),
                file!(),
                line!(),
            ));
        }
    }};
}

/// `left == right` 为假时记录失败
#[macro_export]
macro_rules! expect_eq {
    ($t:expr, $left:expr, $right:expr $(,)?) => {{
        let left = &$left;
        let right = &$right;
        if !(left == right) {
            let _ = $t.record_failure($crate::FailedExpectation::new(
                stringify!($left == $right),
                file!(),
                line!(),
            ));
        }
    }};
}

/// `left != right` 为假时记录失败
#[macro_export]
macro_rules! expect_ne {
    ($t:expr, $left:expr, $right:expr $(,)?) => {{
        let left = &$left;
        let right = &$right;
        if !(left != right) {
            let _ = $t.record_failure($crate::FailedExpectation::new(
                stringify!($left != $right),
                file!(),
                line!(),
            ));
        }
    }};
}

/// 无条件记录失败
#[macro_export]
macro_rules! fail {
    ($t:expr $(,)?) => {
        $crate::expect!($t, false)
    };
}

/// 开关断言事件抑制
#[macro_export]
macro_rules! ignore_asserts {
    ($t:expr, $on:expr $(,)?) => {
        $t.set_ignore_asserts($on)
    };
}

/// 开关日志事件抑制
#[macro_export]
macro_rules! ignore_log {
    ($t:expr, $on:expr $(,)?) => {
        $t.set_ignore_log($on)
    };
}
