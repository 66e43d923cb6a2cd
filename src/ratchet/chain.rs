use crate::ratchet::error::SequenceFault;
use crate::ratchet::Role;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 发起方链的种子值
pub const INITIATOR_SEED: u64 = 0;

/// 响应方链的种子值
pub const RESPONDER_SEED: u64 = 100;

/// 某个角色的链种子
pub fn seed_for(role: Role) -> u64 {
    match role {
        Role::Initiator => INITIATOR_SEED,
        Role::Responder => RESPONDER_SEED,
    }
}

/// 单个纪元内单方向的对称链，只追加
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chain {
    values: Vec<u64>,
}

impl Chain {
    /// 以种子作为位置0创建链
    pub fn seeded(seed: u64) -> Self {
        Self { values: vec![seed] }
    }

    pub fn get(&self, index: u32) -> Option<u64> {
        self.values.get(index as usize).copied()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[u64] {
        &self.values
    }

    /// 下一个可派生的位置
    pub fn next_index(&self) -> u32 {
        self.values.len() as u32
    }

    /// 确保位置 `index` 已派生并返回该位置的链值
    ///
    /// 已派生的位置直接读回；紧随末尾的位置由前一个值加一派生；
    /// 更远的位置会跳过中间的值，返回 `UnderivedIndex`。
    pub fn advance_to(&mut self, epoch: u64, index: u32) -> Result<u64, SequenceFault> {
        if let Some(value) = self.get(index) {
            return Ok(value);
        }

        let max = self.next_index();
        if index != max {
            return Err(SequenceFault::UnderivedIndex { epoch, index, max });
        }

        Ok(self.push_next())
    }

    /// 连续推进直到位置 `index` 存在，返回该位置的链值
    ///
    /// 只用于本方的发送链：发送序号总是逐一递增，因此最多追加一个值。
    pub fn extend_through(&mut self, index: u32) -> u64 {
        while self.values.len() <= index as usize {
            self.push_next();
        }
        self.values[index as usize]
    }

    fn push_next(&mut self) -> u64 {
        // 位置0始终是种子，链从不为空
        let value = self.values.last().copied().unwrap_or_default().wrapping_add(1);
        self.values.push(value);
        value
    }
}

/// 两个方向的链，按纪元编号索引
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainSet {
    initiator: BTreeMap<u64, Chain>,
    responder: BTreeMap<u64, Chain>,
}

impl ChainSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// 为纪元初始化两条带种子的链
    ///
    /// 已存在的纪元不会被覆盖，返回 false。
    pub fn seed_epoch(&mut self, epoch: u64) -> bool {
        if self.initiator.contains_key(&epoch) || self.responder.contains_key(&epoch) {
            return false;
        }
        self.initiator.insert(epoch, Chain::seeded(seed_for(Role::Initiator)));
        self.responder.insert(epoch, Chain::seeded(seed_for(Role::Responder)));
        true
    }

    fn side(&self, role: Role) -> &BTreeMap<u64, Chain> {
        match role {
            Role::Initiator => &self.initiator,
            Role::Responder => &self.responder,
        }
    }

    fn side_mut(&mut self, role: Role) -> &mut BTreeMap<u64, Chain> {
        match role {
            Role::Initiator => &mut self.initiator,
            Role::Responder => &mut self.responder,
        }
    }

    pub fn chain(&self, role: Role, epoch: u64) -> Option<&Chain> {
        self.side(role).get(&epoch)
    }

    pub fn get(&self, role: Role, epoch: u64, index: u32) -> Option<u64> {
        self.chain(role, epoch).and_then(|chain| chain.get(index))
    }

    /// 推进某角色在某纪元的链到 `index`
    pub fn advance(&mut self, role: Role, epoch: u64, index: u32) -> Result<u64, SequenceFault> {
        match self.side_mut(role).get_mut(&epoch) {
            Some(chain) => chain.advance_to(epoch, index),
            None => Err(SequenceFault::UnderivedIndex { epoch, index, max: 0 }),
        }
    }

    /// 某角色在某纪元的链，纪元未派生时为 None
    pub fn chain_mut(&mut self, role: Role, epoch: u64) -> Option<&mut Chain> {
        self.side_mut(role).get_mut(&epoch)
    }

    pub fn epochs(&self) -> impl Iterator<Item = &u64> {
        self.initiator.keys()
    }
}
