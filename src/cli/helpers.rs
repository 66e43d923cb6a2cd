use crate::ratchet::{EntitySnapshot, Role};
use crate::scenario::TraceEvent;
use colored::*;

/// 格式化一条轨迹记录
pub fn format_event(event: &TraceEvent) -> String {
    match event {
        TraceEvent::Ratcheted { entity, role, epoch, own_public } => format!(
            "{} {} {} epoch {} (own dh public {})",
            "***".bold(),
            name_tag(entity, *role),
            "ratcheted to".magenta(),
            epoch.to_string().bold(),
            own_public
        ),
        TraceEvent::Sent {
            entity,
            role,
            message,
            chain_key,
            exchange_value,
        } => format!(
            "{} {} sent    {} key {} dh-sum {}",
            ">>>".bold(),
            name_tag(entity, *role),
            message.to_string().cyan(),
            chain_key.to_string().yellow(),
            exchange_value.to_string().dimmed()
        ),
        TraceEvent::Received {
            entity,
            role,
            message,
            chain_key,
            epoch_advanced,
            ..
        } => {
            let marker = if *epoch_advanced {
                " (new epoch, ratchet pending)".magenta().to_string()
            } else {
                String::new()
            };
            format!(
                "{} {} received {} key {}{}",
                "<<<".bold(),
                name_tag(entity, *role),
                message.to_string().green(),
                chain_key.to_string().yellow(),
                marker
            )
        }
    }
}

/// 参与者名称加角色标记
fn name_tag(entity: &str, role: Role) -> ColoredString {
    let tag = format!("{:<6}[{}]", entity, role.label());
    match role {
        Role::Initiator => tag.blue(),
        Role::Responder => tag.red(),
    }
}

/// 以表格形式列出两个实体的最终状态
pub fn format_snapshots(snapshots: &[EntitySnapshot]) -> String {
    // heard 列说明 pending 的棘轮为何尚未触发
    let headers = [
        "entity", "role", "epoch", "next index", "pending", "heard", "own dh", "peer dh", "epoch log",
    ];
    let widths = [8, 10, 5, 10, 7, 5, 6, 7, 16];

    let rows: Vec<Vec<String>> = snapshots
        .iter()
        .map(|s| {
            vec![
                s.identity.clone(),
                s.role.label().to_string(),
                s.epoch_id.to_string(),
                s.msg_index.to_string(),
                s.ratchet_pending.to_string(),
                s.peer_heard.to_string(),
                s.own_public.to_string(),
                s.peer_public.to_string(),
                format!("{:?}", s.epoch_log),
            ]
        })
        .collect();

    format_table(&headers, &rows, &widths)
}

/// 格式化一个实体在各纪元的两条链
pub fn format_chains(snapshot: &EntitySnapshot) -> String {
    let mut result = String::new();

    for epoch in snapshot.chains.epochs() {
        let render = |role: Role| {
            snapshot
                .chains
                .chain(role, *epoch)
                .map(|chain| format!("{:?}", chain.values()))
                .unwrap_or_else(|| "-".to_string())
        };
        result.push_str(&format!(
            "  epoch {}: initiator {} responder {}\n",
            epoch,
            render(Role::Initiator),
            render(Role::Responder)
        ));
    }

    result
}

/// 格式化表格
pub fn format_table(headers: &[&str], rows: &[Vec<String>], widths: &[usize]) -> String {
    let mut result = String::new();

    // 表头
    let header_row = headers.iter()
        .zip(widths.iter())
        .map(|(h, w)| format!("{:width$}", h.bold(), width = *w))
        .collect::<Vec<_>>()
        .join(" | ");

    result.push_str(&header_row);
    result.push('\n');

    // 分隔线
    let separator = widths.iter()
        .map(|w| "-".repeat(*w))
        .collect::<Vec<_>>()
        .join("-+-");

    result.push_str(&separator);
    result.push('\n');

    for row in rows {
        let data_row = row.iter()
            .zip(widths.iter())
            .map(|(cell, w)| format!("{:width$}", cell, width = *w))
            .collect::<Vec<_>>()
            .join(" | ");

        result.push_str(&data_row);
        result.push('\n');
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ratchet::{bootstrap_seeded, Message, RatchetState};

    #[test]
    fn test_format_event_mentions_fields() {
        colored::control::set_override(false);

        let sent = TraceEvent::Sent {
            entity: "Bob".to_string(),
            role: Role::Responder,
            message: Message::new("Bob", 0, 2, 88),
            chain_key: 102,
            exchange_value: 300,
        };
        let line = format_event(&sent);
        assert!(line.contains("Bob"));
        assert!(line.contains("responder"));
        assert!(line.contains("rid: 0, mid: 2"));
        assert!(line.contains("key 102"));

        let received = TraceEvent::Received {
            entity: "Alice".to_string(),
            role: Role::Initiator,
            message: Message::new("Bob", 1, 0, 88),
            chain_key: 100,
            epoch_advanced: true,
            state: RatchetState::RatchetPending,
        };
        assert!(format_event(&received).contains("new epoch"));
    }

    #[test]
    fn test_format_table_layout() {
        colored::control::set_override(false);
        let table = format_table(&["a", "b"], &[vec!["1".to_string(), "2".to_string()]], &[3, 3]);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[1], "----+----");
        assert_eq!(lines[2], "1   | 2  ");
    }

    #[test]
    fn test_format_snapshots_and_chains() {
        colored::control::set_override(false);
        let (alice, bob) = bootstrap_seeded("Alice", "Bob", 3).unwrap();
        let snapshots = [alice.snapshot(), bob.snapshot()];

        let table = format_snapshots(&snapshots);
        assert!(table.contains("Alice"));
        assert!(table.contains("responder"));

        let chains = format_chains(&snapshots[1]);
        assert_eq!(chains, "  epoch 0: initiator [0] responder [100]\n");
    }

    #[test]
    fn test_format_snapshots_shows_heard_column() {
        colored::control::set_override(false);
        let (mut alice, mut bob) = bootstrap_seeded("Alice", "Bob", 4).unwrap();

        // 刚启动时 Alice 处于 pending 但尚未收到对方消息
        let table = format_snapshots(&[alice.snapshot()]);
        let lines: Vec<&str> = table.lines().collect();
        assert!(lines[0].contains("heard"));
        let cells: Vec<&str> = lines[2].split('|').map(str::trim).collect();
        assert_eq!(cells[4], "true");
        assert_eq!(cells[5], "false");

        let m = bob.send();
        alice.receive(&m).unwrap();
        let table = format_snapshots(&[alice.snapshot()]);
        let cells: Vec<String> = table
            .lines()
            .nth(2)
            .unwrap()
            .split('|')
            .map(|c| c.trim().to_string())
            .collect();
        assert_eq!(cells[5], "true");
    }
}
