use crate::ratchet::Message;
use log::debug;
use std::collections::{HashMap, VecDeque};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChannelError {
    #[error("Unknown party: {0}")]
    UnknownParty(String),

    #[error("No message waiting for {0}")]
    Empty(String),
}

/// 两个实体之间的消息传递抽象
///
/// 单线程、无丢失、按发送顺序交付。实现可以替换为真实的传输层。
pub trait Transport {
    /// 投递一条消息给发送方的对端
    fn post(&mut self, message: Message) -> Result<(), ChannelError>;

    /// 取出某个接收方最早的一条消息
    fn take(&mut self, recipient: &str) -> Result<Message, ChannelError>;

    /// 某个接收方尚未取出的消息数量
    fn pending(&self, recipient: &str) -> usize;
}

/// 进程内的双方通道
#[derive(Debug, Clone)]
pub struct Channel {
    /// 两个参与者的身份
    parties: [String; 2],

    /// 每个接收方的收件队列
    inboxes: HashMap<String, VecDeque<Message>>,

    /// 已投递的消息总数
    posted: u64,
}

impl Channel {
    /// 创建连接两个参与者的通道
    pub fn new(first: impl Into<String>, second: impl Into<String>) -> Self {
        let parties = [first.into(), second.into()];
        let inboxes = parties
            .iter()
            .map(|party| (party.clone(), VecDeque::new()))
            .collect();

        Self {
            parties,
            inboxes,
            posted: 0,
        }
    }

    /// 某一方的对端
    fn peer_of(&self, party: &str) -> Result<&str, ChannelError> {
        match &self.parties {
            [a, b] if a == party => Ok(b.as_str()),
            [a, b] if b == party => Ok(a.as_str()),
            _ => Err(ChannelError::UnknownParty(party.to_string())),
        }
    }

    pub fn posted(&self) -> u64 {
        self.posted
    }

    pub fn is_idle(&self) -> bool {
        self.inboxes.values().all(VecDeque::is_empty)
    }
}

impl Transport for Channel {
    fn post(&mut self, message: Message) -> Result<(), ChannelError> {
        let recipient = self.peer_of(message.sender())?.to_string();
        debug!("channel: {} -> {}: {}", message.sender(), recipient, message);

        self.inboxes
            .get_mut(&recipient)
            .ok_or_else(|| ChannelError::UnknownParty(recipient.clone()))?
            .push_back(message);
        self.posted += 1;
        Ok(())
    }

    fn take(&mut self, recipient: &str) -> Result<Message, ChannelError> {
        self.inboxes
            .get_mut(recipient)
            .ok_or_else(|| ChannelError::UnknownParty(recipient.to_string()))?
            .pop_front()
            .ok_or_else(|| ChannelError::Empty(recipient.to_string()))
    }

    fn pending(&self, recipient: &str) -> usize {
        self.inboxes.get(recipient).map_or(0, VecDeque::len)
    }
}
