use serde::{Deserialize, Serialize};
use std::fmt;

/// 会话中传递的消息信封
///
/// 构造后不可修改；发送方把它交给通道，接收方从通道取出后处理。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// 发送方身份
    sender: String,

    /// 发送方当前的棘轮纪元
    ratchet_id: u64,

    /// 当前纪元发送链中的序号
    msg_index: u32,

    /// 发送方当前的占位公钥值
    dh_public: u64,
}

impl Message {
    pub fn new(sender: impl Into<String>, ratchet_id: u64, msg_index: u32, dh_public: u64) -> Self {
        Self {
            sender: sender.into(),
            ratchet_id,
            msg_index,
            dh_public,
        }
    }

    pub fn sender(&self) -> &str {
        &self.sender
    }

    pub fn ratchet_id(&self) -> u64 {
        self.ratchet_id
    }

    pub fn msg_index(&self) -> u32 {
        self.msg_index
    }

    pub fn dh_public(&self) -> u64 {
        self.dh_public
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{sender: {}, rid: {}, mid: {}, dh: {}}}",
            self.sender, self.ratchet_id, self.msg_index, self.dh_public
        )
    }
}
