use crate::ratchet::chain::{Chain, ChainSet};
use crate::ratchet::error::{RatchetError, SequenceFault};
use crate::ratchet::keys::DhPair;
use crate::ratchet::{Message, Role};
use log::{debug, error, info, warn};
use rand::rngs::StdRng;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// 会话实体的棘轮状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RatchetState {
    /// 当前纪元已同步
    Stable,
    /// 下一次发送前必须执行棘轮步进
    RatchetPending,
}

/// 一次成功接收的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Delivery {
    /// 发送方的角色，决定读取哪条链
    pub sender_role: Role,

    /// 消息所属纪元
    pub epoch: u64,

    /// 消息序号
    pub index: u32,

    /// 该消息对应的链密钥
    pub chain_key: u64,

    /// 这条消息是否把本方带入了新纪元
    pub epoch_advanced: bool,
}

/// 实体状态的只读快照
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntitySnapshot {
    pub identity: String,
    pub role: Role,
    pub own_public: u64,
    pub peer_public: u64,
    pub epoch_id: u64,
    pub msg_index: u32,
    pub ratchet_pending: bool,
    pub peer_heard: bool,
    pub epoch_log: Vec<u64>,
    pub chains: ChainSet,
}

/// 一方参与者的完整棘轮状态
pub struct Entity<R = StdRng> {
    /// 参与者身份
    identity: String,

    /// 构造时确定的角色
    role: Role,

    /// 当前的占位密钥对
    own_dh: DhPair,

    /// 最近收到的对端公钥值
    peer_dh: u64,

    /// 已派生的纪元，只追加
    epoch_log: Vec<u64>,

    /// 两个方向的链
    chains: ChainSet,

    /// 当前纪元
    epoch_id: u64,

    /// 当前纪元内的下一个发送序号
    msg_index: u32,

    /// 下一次发送是否需要棘轮步进
    ratchet_pending: bool,

    /// 当前纪元内是否已收到过对端的消息
    ///
    /// 引导时设置的待定棘轮要等到对端开口之后才执行。
    peer_heard: bool,

    /// 生成密钥对的随机源
    rng: R,
}

impl<R> fmt::Debug for Entity<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entity")
            .field("identity", &self.identity)
            .field("role", &self.role)
            .field("own_dh", &self.own_dh)
            .field("peer_dh", &self.peer_dh)
            .field("epoch_id", &self.epoch_id)
            .field("msg_index", &self.msg_index)
            .field("ratchet_pending", &self.ratchet_pending)
            .field("peer_heard", &self.peer_heard)
            .field("epoch_log.len", &self.epoch_log.len())
            .finish()
    }
}

impl<R: Rng> Entity<R> {
    /// 创建新的实体
    ///
    /// 角色由身份决定：身份等于 `initiator_name` 的为发起方。
    /// 初始密钥对从 `rng` 生成，纪元0在构造时派生。
    pub fn new(identity: impl Into<String>, initiator_name: &str, mut rng: R) -> Self {
        let identity = identity.into();
        let role = Role::from_identity(&identity, initiator_name);
        let own_dh = DhPair::generate(&mut rng);

        let mut entity = Self {
            identity,
            role,
            own_dh,
            peer_dh: 0,
            epoch_log: Vec::new(),
            chains: ChainSet::new(),
            epoch_id: 0,
            msg_index: 0,
            ratchet_pending: false,
            peer_heard: false,
            rng,
        };
        entity.derive();
        entity
    }

    /// 生成下一条消息并推进本地状态
    pub fn send(&mut self) -> Message {
        if self.ratchet_pending && self.peer_heard {
            self.ratchet_step();
        }

        // 每个纪元都经过 derive，本方的发送链总是存在
        let chain_key = match self.chains.chain_mut(self.role, self.epoch_id) {
            Some(chain) => chain.extend_through(self.msg_index),
            None => {
                error!("{} \tno sending chain for epoch {}", self.identity, self.epoch_id);
                0
            }
        };

        let message = Message::new(
            self.identity.clone(),
            self.epoch_id,
            self.msg_index,
            self.own_dh.public(),
        );
        self.msg_index += 1;

        info!("{} \tsending: {}", self.identity, message);
        info!(
            "{} \tkey: {} + {} = {}",
            self.identity,
            self.own_dh.public(),
            self.peer_dh,
            self.exchange_value()
        );
        debug!("{} \tsending chain key: {}", self.identity, chain_key);

        message
    }

    /// 处理收到的消息，返回该消息的链密钥
    ///
    /// 被拒绝的消息不会改变本地状态。
    pub fn receive(&mut self, message: &Message) -> Result<Delivery, RatchetError> {
        info!("{} \treceive: {}", self.identity, message);

        if message.sender() == self.identity {
            return Err(RatchetError::ReflectedMessage(self.identity.clone()));
        }

        let sender_role = self.role.peer();
        let epoch = message.ratchet_id();
        let index = message.msg_index();

        let epoch_advanced = if epoch == self.epoch_id + 1 {
            // 新纪元的第一条消息只能位于种子位置
            if index != 0 {
                return Err(SequenceFault::UnderivedIndex { epoch, index, max: 0 }.into());
            }

            self.peer_dh = message.dh_public();
            self.epoch_id = epoch;
            self.msg_index = 0;
            self.ratchet_pending = true;
            self.derive();

            info!(
                "{} \tkey: {} + {} = {}",
                self.identity,
                self.own_dh.public(),
                self.peer_dh,
                self.exchange_value()
            );
            true
        } else if epoch == self.epoch_id {
            let already_derived = self
                .chains
                .chain(sender_role, epoch)
                .map_or(false, |chain| index > 0 && (index as usize) < chain.len());
            if already_derived {
                warn!("{} \tindex {} of epoch {} delivered again", self.identity, index, epoch);
            }
            false
        } else {
            return Err(SequenceFault::EpochOutOfRange {
                current: self.epoch_id,
                received: epoch,
            }
            .into());
        };

        let chain_key = self.chains.advance(sender_role, epoch, index)?;
        self.peer_heard = true;

        info!("{} \tchain key: {}", self.identity, chain_key);

        Ok(Delivery {
            sender_role,
            epoch,
            index,
            chain_key,
            epoch_advanced,
        })
    }

    /// 棘轮步进：新密钥对、新纪元、序号归零
    fn ratchet_step(&mut self) {
        info!("{} \tRatcheting...", self.identity);

        self.gen_dh();
        self.epoch_id += 1;
        self.msg_index = 0;
        self.derive();
        self.ratchet_pending = false;
        self.peer_heard = false;

        info!("{} \tnext own dh public: {}", self.identity, self.own_dh.public());
    }

    /// 用注入的随机源替换本方密钥对
    pub(crate) fn gen_dh(&mut self) {
        self.own_dh = DhPair::generate(&mut self.rng);
        debug!("{} \tgenerated new dh pair {:?}", self.identity, self.own_dh);
    }
}

impl<R> Entity<R> {
    /// 记录当前纪元并初始化该纪元的两条链
    pub(crate) fn derive(&mut self) {
        self.epoch_log.push(self.epoch_id);
        if !self.chains.seed_epoch(self.epoch_id) {
            warn!("{} \tchains for epoch {} already derived", self.identity, self.epoch_id);
        }
        debug!("{} \tderived epoch {}", self.identity, self.epoch_id);
    }

    pub(crate) fn set_peer_public(&mut self, peer_public: u64) {
        self.peer_dh = peer_public;
    }

    pub(crate) fn set_ratchet_pending(&mut self, pending: bool) {
        self.ratchet_pending = pending;
    }

    pub fn identity(&self) -> &str {
        &self.identity
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn own_dh(&self) -> DhPair {
        self.own_dh
    }

    pub fn own_public(&self) -> u64 {
        self.own_dh.public()
    }

    pub fn peer_public(&self) -> u64 {
        self.peer_dh
    }

    pub fn epoch_id(&self) -> u64 {
        self.epoch_id
    }

    pub fn msg_index(&self) -> u32 {
        self.msg_index
    }

    pub fn is_ratchet_pending(&self) -> bool {
        self.ratchet_pending
    }

    /// 当前纪元内是否已收到过对端的消息
    pub fn has_heard_peer(&self) -> bool {
        self.peer_heard
    }

    pub fn state(&self) -> RatchetState {
        if self.ratchet_pending {
            RatchetState::RatchetPending
        } else {
            RatchetState::Stable
        }
    }

    pub fn epoch_log(&self) -> &[u64] {
        &self.epoch_log
    }

    pub fn chains(&self) -> &ChainSet {
        &self.chains
    }

    pub fn chain(&self, role: Role, epoch: u64) -> Option<&Chain> {
        self.chains.chain(role, epoch)
    }

    /// 本地记录中某条链在某位置的值
    pub fn chain_key(&self, role: Role, epoch: u64, index: u32) -> Option<u64> {
        self.chains.get(role, epoch, index)
    }

    /// 占位的非对称派生值
    pub fn exchange_value(&self) -> u64 {
        self.own_dh.exchange(self.peer_dh)
    }

    pub fn snapshot(&self) -> EntitySnapshot {
        EntitySnapshot {
            identity: self.identity.clone(),
            role: self.role,
            own_public: self.own_dh.public(),
            peer_public: self.peer_dh,
            epoch_id: self.epoch_id,
            msg_index: self.msg_index,
            ratchet_pending: self.ratchet_pending,
            peer_heard: self.peer_heard,
            epoch_log: self.epoch_log.clone(),
            chains: self.chains.clone(),
        }
    }
}
