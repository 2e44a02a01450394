//! 宿主应用的单元测试，运行于 harness 之下

use crate::app::mailbox::{Mailbox, Message};
use crate::host_app::{INBOX, INBOX_CAPACITY, is_ready};
use harness::{UnitTestResult, expect, expect_eq, fail, ignore_asserts, ignore_log, unit_test};

fn message(sender: u32) -> Message {
    Message {
        sender,
        payload: u64::from(sender) << 8,
    }
}

unit_test!(fn host_is_initialized(t) {
    expect!(t, is_ready());
    expect!(t, INBOX.lock().is_some());
});

unit_test!("ExampleTest_Simple", fn example_simple(t) {
    let sum: u32 = (1..=10).sum();
    if sum != 55 {
        fail!(t);
    }
    expect_eq!(t, sum % 11, 0);
});

fn check_drained(t: &UnitTestResult, mailbox: &Mailbox) {
    expect!(t, mailbox.is_empty());
    expect_eq!(t, mailbox.dropped(), 0);
}

unit_test!("ExampleTest_Nested", fn example_nested(t) {
    let mailbox = Mailbox::with_capacity(2);
    check_drained(t, &mailbox);
});

unit_test!(fn inbox_keeps_fifo_order(t) {
    let mut guard = INBOX.lock();
    let Some(inbox) = guard.as_mut() else {
        fail!(t);
        return;
    };
    for sender in 0..3 {
        expect!(t, inbox.post(message(sender)).is_ok());
    }
    expect_eq!(t, inbox.len(), 3);
    for sender in 0..3 {
        expect_eq!(t, inbox.take(), Some(message(sender)));
    }
    expect!(t, inbox.is_empty());
});

unit_test!(fn inbox_overflow_is_logged(t) {
    let mut guard = INBOX.lock();
    let Some(inbox) = guard.as_mut() else {
        fail!(t);
        return;
    };
    ignore_log!(t, true);
    for sender in 0..INBOX_CAPACITY as u32 {
        expect!(t, inbox.post(message(sender)).is_ok());
    }
    expect!(t, inbox.post(message(99)).is_err());
    ignore_log!(t, false);

    while !inbox.is_empty() {
        inbox.take();
    }
    expect!(t, inbox.is_empty());
});

unit_test!(fn empty_take_is_suppressible(t) {
    let mut mailbox = Mailbox::with_capacity(1);
    ignore_asserts!(t, true);
    expect!(t, mailbox.take().is_none());
    ignore_asserts!(t, false);
    expect!(t, !t.failed_assert());
});

unit_test!(fn scratch_buffers_are_released(t) {
    let words: Vec<String> = ["alpha", "beta", "gamma"].iter().map(|w| w.to_uppercase()).collect();
    expect_eq!(t, words.join("-"), "ALPHA-BETA-GAMMA");
});

unit_test!(fn explicit_tracker_round_trip(t) {
    let before = harness::tracker::bytes_allocated();
    let total_before = harness::tracker::total_bytes_allocated();
    let p = harness::tracker::allocate(128);
    expect!(t, !p.is_null());
    expect_eq!(t, harness::tracker::bytes_allocated() - before, 128);
    // SAFETY: p 来自 allocate 且只释放一次
    unsafe { harness::tracker::free(p) };
    expect_eq!(t, harness::tracker::bytes_allocated(), before);
    // 累计值只增不减
    expect!(t, harness::tracker::total_bytes_allocated() - total_before >= 128);
});
