//! 有界邮箱

use std::collections::VecDeque;

/// 邮箱消息，定长、不持有堆内存
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Message {
    /// 发送方
    pub sender: u32,
    /// 负载
    pub payload: u64,
}

/// 固定容量的 FIFO 邮箱
///
/// 容量在创建时一次性分配，之后的投递和取出不再分配内存。
/// 邮箱已满时丢弃新消息并记录 Error 日志；从空邮箱取消息是调用方的契约违反。
#[derive(Debug)]
pub struct Mailbox {
    queue: VecDeque<Message>,
    capacity: usize,
    dropped: usize,
}

impl Mailbox {
    /// 创建容量为 `capacity` 的邮箱
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            queue: VecDeque::with_capacity(capacity),
            capacity,
            dropped: 0,
        }
    }

    /// 投递消息；邮箱已满时返回被拒绝的消息
    pub fn post(&mut self, message: Message) -> Result<(), Message> {
        if self.queue.len() == self.capacity {
            self.dropped += 1;
            log::error!(
                "mailbox full ({} messages), dropping message from {}",
                self.capacity,
                message.sender
            );
            return Err(message);
        }
        self.queue.push_back(message);
        Ok(())
    }

    /// 取出最早的消息
    pub fn take(&mut self) -> Option<Message> {
        crate::app_assert!(!self.queue.is_empty());
        self.queue.pop_front()
    }

    /// 当前消息数
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// 因邮箱已满被丢弃的消息数
    pub fn dropped(&self) -> usize {
        self.dropped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mail(sender: u32) -> Message {
        Message {
            sender,
            payload: u64::from(sender) * 10,
        }
    }

    #[test]
    fn test_fifo_order() {
        let mut mailbox = Mailbox::with_capacity(4);
        for sender in 1..=3 {
            assert!(mailbox.post(mail(sender)).is_ok());
        }
        assert_eq!(mailbox.len(), 3);
        assert_eq!(mailbox.take(), Some(mail(1)));
        assert_eq!(mailbox.take(), Some(mail(2)));
        assert_eq!(mailbox.take(), Some(mail(3)));
        assert!(mailbox.is_empty());
    }

    #[test]
    fn test_full_mailbox_rejects() {
        let mut mailbox = Mailbox::with_capacity(1);
        assert!(mailbox.post(mail(1)).is_ok());
        assert_eq!(mailbox.post(mail(2)), Err(mail(2)));
        assert_eq!(mailbox.dropped(), 1);
        assert_eq!(mailbox.len(), 1);
    }
}
