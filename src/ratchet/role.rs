use serde::{Deserialize, Serialize};
use std::fmt;

/// 会话中的两个固定角色
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// 发起方，拥有发起方链
    Initiator,
    /// 响应方，拥有响应方链
    Responder,
}

impl Role {
    /// 根据身份确定角色：与发起方名称相同的为发起方，其余为响应方
    pub fn from_identity(identity: &str, initiator_name: &str) -> Self {
        if identity == initiator_name {
            Role::Initiator
        } else {
            Role::Responder
        }
    }

    /// 对端的角色
    pub fn peer(self) -> Self {
        match self {
            Role::Initiator => Role::Responder,
            Role::Responder => Role::Initiator,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Role::Initiator => "initiator",
            Role::Responder => "responder",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
