use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// 占位DH标量的上界（含）
pub const DH_SCALAR_MAX: u64 = 1024;

/// 占位的非对称密钥对
///
/// 两个值都只是随机整数，不提供任何安全性，仅用于模拟棘轮的非对称部分。
#[derive(Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DhPair {
    /// 类私钥值
    private: u64,

    /// 类公钥值
    public: u64,
}

impl fmt::Debug for DhPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // 私有值不进入日志
        f.debug_struct("DhPair")
            .field("public", &self.public)
            .finish()
    }
}

impl DhPair {
    /// 从给定的随机源生成新的密钥对
    pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self {
            private: rng.gen_range(0..=DH_SCALAR_MAX),
            public: rng.gen_range(0..=DH_SCALAR_MAX),
        }
    }

    pub fn from_parts(private: u64, public: u64) -> Self {
        Self { private, public }
    }

    pub fn private(&self) -> u64 {
        self.private
    }

    pub fn public(&self) -> u64 {
        self.public
    }

    /// 占位的非对称派生：自己的公钥值加上对方的公钥值
    pub fn exchange(&self, peer_public: u64) -> u64 {
        self.public.wrapping_add(peer_public)
    }
}
