use crate::network::{Channel, ChannelError, Transport};
use crate::ratchet::{Entity, Message, RatchetError, RatchetState, Role};
use log::{debug, error, info};
use rand::rngs::StdRng;
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScenarioError {
    #[error("Ratchet error: {0}")]
    Ratchet(#[from] RatchetError),

    #[error("Channel error: {0}")]
    Channel(#[from] ChannelError),

    #[error("Key mismatch in epoch {epoch} index {index}: sender holds {expected}, receiver derived {actual}")]
    KeyMismatch {
        epoch: u64,
        index: u32,
        expected: u64,
        actual: u64,
    },

    #[error("{entity} is the {found} but was placed in the {expected} slot")]
    RoleMismatch {
        entity: String,
        expected: Role,
        found: Role,
    },

    #[error("{entity} has no chain key for epoch {epoch} index {index}")]
    MissingKey {
        entity: String,
        epoch: u64,
        index: u32,
    },
}

/// 脚本中的一步
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Step {
    /// 该角色发送一条消息到通道
    Send(Role),
    /// 该角色从通道取出一条消息并处理
    Receive(Role),
}

/// 固定顺序的发送/接收脚本
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    steps: Vec<Step>,
}

impl Scenario {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn send(mut self, role: Role) -> Self {
        self.steps.push(Step::Send(role));
        self
    }

    pub fn receive(mut self, role: Role) -> Self {
        self.steps.push(Step::Receive(role));
        self
    }

    /// `from` 连续发送 `count` 条消息，每条都立即被对端接收
    pub fn exchange(mut self, from: Role, count: usize) -> Self {
        for _ in 0..count {
            self.steps.push(Step::Send(from));
            self.steps.push(Step::Receive(from.peer()));
        }
        self
    }

    /// 标准演示脚本
    ///
    /// 双方先交叉发送一条开场消息，随后轮流成批发送，每轮换方都会触发一次棘轮。
    pub fn standard() -> Self {
        Self::new()
            .send(Role::Initiator)
            .send(Role::Responder)
            .receive(Role::Initiator)
            .receive(Role::Responder)
            .exchange(Role::Responder, 2)
            .exchange(Role::Initiator, 2)
            .exchange(Role::Responder, 3)
            .exchange(Role::Initiator, 3)
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

/// 运行过程中的一条可观察记录
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum TraceEvent {
    Ratcheted {
        entity: String,
        role: Role,
        epoch: u64,
        own_public: u64,
    },
    Sent {
        entity: String,
        role: Role,
        message: Message,
        chain_key: u64,
        exchange_value: u64,
    },
    Received {
        entity: String,
        role: Role,
        message: Message,
        chain_key: u64,
        epoch_advanced: bool,
        state: RatchetState,
    },
}

impl TraceEvent {
    pub fn entity(&self) -> &str {
        match self {
            TraceEvent::Ratcheted { entity, .. }
            | TraceEvent::Sent { entity, .. }
            | TraceEvent::Received { entity, .. } => entity,
        }
    }
}

/// 驱动两个实体按脚本运行，并校验每条消息的链密钥
pub struct Driver<R = StdRng, T = Channel> {
    initiator: Entity<R>,
    responder: Entity<R>,
    transport: T,
    trace: Vec<TraceEvent>,
}

impl<R: Rng> Driver<R, Channel> {
    /// 使用进程内通道连接两个实体
    pub fn with_channel(
        initiator: Entity<R>,
        responder: Entity<R>,
    ) -> Result<Self, ScenarioError> {
        let channel = Channel::new(initiator.identity(), responder.identity());
        Self::new(initiator, responder, channel)
    }
}

impl<R: Rng, T: Transport> Driver<R, T> {
    /// 两个实体必须按角色放入对应位置
    pub fn new(
        initiator: Entity<R>,
        responder: Entity<R>,
        transport: T,
    ) -> Result<Self, ScenarioError> {
        for (entity, expected) in [(&initiator, Role::Initiator), (&responder, Role::Responder)] {
            if entity.role() != expected {
                return Err(ScenarioError::RoleMismatch {
                    entity: entity.identity().to_string(),
                    expected,
                    found: entity.role(),
                });
            }
        }

        Ok(Self {
            initiator,
            responder,
            transport,
            trace: Vec::new(),
        })
    }

    /// 按顺序执行整个脚本，遇到第一个错误即中止
    pub fn run(&mut self, scenario: &Scenario) -> Result<(), ScenarioError> {
        info!("Running scenario with {} steps", scenario.len());

        for (position, step) in scenario.steps().iter().enumerate() {
            if let Err(e) = self.step(*step) {
                error!("Scenario aborted at step {} ({:?}): {}", position, step, e);
                return Err(e);
            }
        }

        debug!(
            "Scenario finished: {} at epoch {}, {} at epoch {}",
            self.initiator.identity(),
            self.initiator.epoch_id(),
            self.responder.identity(),
            self.responder.epoch_id()
        );
        Ok(())
    }

    /// 执行单步
    pub fn step(&mut self, step: Step) -> Result<(), ScenarioError> {
        match step {
            Step::Send(role) => self.send(role),
            Step::Receive(role) => self.receive(role),
        }
    }

    fn send(&mut self, role: Role) -> Result<(), ScenarioError> {
        let entity = match role {
            Role::Initiator => &mut self.initiator,
            Role::Responder => &mut self.responder,
        };
        let role = entity.role();

        let epoch_before = entity.epoch_id();
        let message = entity.send();

        if entity.epoch_id() != epoch_before {
            self.trace.push(TraceEvent::Ratcheted {
                entity: entity.identity().to_string(),
                role,
                epoch: entity.epoch_id(),
                own_public: entity.own_public(),
            });
        }

        let chain_key = entity
            .chain_key(role, message.ratchet_id(), message.msg_index())
            .ok_or_else(|| ScenarioError::MissingKey {
                entity: entity.identity().to_string(),
                epoch: message.ratchet_id(),
                index: message.msg_index(),
            })?;

        self.trace.push(TraceEvent::Sent {
            entity: entity.identity().to_string(),
            role,
            message: message.clone(),
            chain_key,
            exchange_value: entity.exchange_value(),
        });

        self.transport.post(message)?;
        Ok(())
    }

    fn receive(&mut self, role: Role) -> Result<(), ScenarioError> {
        let (receiver, sender) = match role {
            Role::Initiator => (&mut self.initiator, &self.responder),
            Role::Responder => (&mut self.responder, &self.initiator),
        };

        let role = receiver.role();

        let message = self.transport.take(receiver.identity())?;
        let delivery = receiver.receive(&message)?;

        // 接收方派生的密钥必须与发送方自己记录的一致
        let expected = sender
            .chain_key(sender.role(), delivery.epoch, delivery.index)
            .ok_or_else(|| ScenarioError::MissingKey {
                entity: sender.identity().to_string(),
                epoch: delivery.epoch,
                index: delivery.index,
            })?;
        if expected != delivery.chain_key {
            return Err(ScenarioError::KeyMismatch {
                epoch: delivery.epoch,
                index: delivery.index,
                expected,
                actual: delivery.chain_key,
            });
        }

        self.trace.push(TraceEvent::Received {
            entity: receiver.identity().to_string(),
            role,
            message,
            chain_key: delivery.chain_key,
            epoch_advanced: delivery.epoch_advanced,
            state: receiver.state(),
        });
        Ok(())
    }

    pub fn trace(&self) -> &[TraceEvent] {
        &self.trace
    }

    pub fn initiator(&self) -> &Entity<R> {
        &self.initiator
    }

    pub fn responder(&self) -> &Entity<R> {
        &self.responder
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn into_entities(self) -> (Entity<R>, Entity<R>) {
        (self.initiator, self.responder)
    }
}
