use crate::ratchet::{Entity, RatchetError};
use log::info;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// 构造一对交叉初始化的实体
///
/// 双方各自用自己的随机源生成密钥对并派生纪元0，再记录对方的公钥值。
/// 发起方带着待定棘轮开始，响应方不带。
pub fn bootstrap<R: Rng>(
    initiator: &str,
    responder: &str,
    initiator_rng: R,
    responder_rng: R,
) -> Result<(Entity<R>, Entity<R>), RatchetError> {
    if initiator.is_empty() || responder.is_empty() {
        return Err(RatchetError::InvalidParticipants(
            "participant names must not be empty".to_string(),
        ));
    }
    if initiator == responder {
        return Err(RatchetError::InvalidParticipants(format!(
            "both participants are named {}",
            initiator
        )));
    }

    info!("Initializing session between {} and {}", initiator, responder);

    // 构造时已派生纪元0
    let mut a = Entity::new(initiator, initiator, initiator_rng);
    let mut b = Entity::new(responder, initiator, responder_rng);

    b.set_ratchet_pending(false);
    a.set_ratchet_pending(true);

    a.set_peer_public(b.own_public());
    b.set_peer_public(a.own_public());

    Ok((a, b))
}

/// 从单个种子构造可复现的一对实体
pub fn bootstrap_seeded(
    initiator: &str,
    responder: &str,
    seed: u64,
) -> Result<(Entity<StdRng>, Entity<StdRng>), RatchetError> {
    let mut master = StdRng::seed_from_u64(seed);
    let initiator_rng = StdRng::seed_from_u64(master.gen());
    let responder_rng = StdRng::seed_from_u64(master.gen());
    bootstrap(initiator, responder, initiator_rng, responder_rng)
}

/// 使用系统熵源构造一对实体
pub fn bootstrap_from_entropy(
    initiator: &str,
    responder: &str,
) -> Result<(Entity<StdRng>, Entity<StdRng>), RatchetError> {
    bootstrap(
        initiator,
        responder,
        StdRng::from_entropy(),
        StdRng::from_entropy(),
    )
}
