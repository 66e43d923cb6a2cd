use thiserror::Error;

/// 会话状态机的错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RatchetError {
    #[error("Protocol sequence error: {0}")]
    ProtocolSequence(#[from] SequenceFault),

    #[error("Invalid participants: {0}")]
    InvalidParticipants(String),

    #[error("{0} received its own message")]
    ReflectedMessage(String),
}

/// 导致协议序列错误的具体原因
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceFault {
    #[error("message epoch {received} is neither the current epoch {current} nor {current}+1")]
    EpochOutOfRange { current: u64, received: u64 },

    #[error("chain position {index} of epoch {epoch} is not derivable (highest derivable position is {max})")]
    UnderivedIndex { epoch: u64, index: u32, max: u32 },
}

impl RatchetError {
    /// 协议序列错误的具体原因
    pub fn fault(&self) -> Option<SequenceFault> {
        match self {
            RatchetError::ProtocolSequence(fault) => Some(*fault),
            RatchetError::InvalidParticipants(_) | RatchetError::ReflectedMessage(_) => None,
        }
    }
}
