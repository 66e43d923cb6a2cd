use ratchet_sim::cli::{format_chains, format_event, format_snapshots};
use ratchet_sim::ratchet::{bootstrap_from_entropy, bootstrap_seeded};
use ratchet_sim::scenario::{Driver, Scenario};
use ratchet_sim::utils::{self, parse_log_level, setup_logger, Config};

use anyhow::{anyhow, Context, Result};
use clap::{ArgAction, Parser};
use colored::*;
use log::{error, info};
use std::path::PathBuf;

/// 命令行参数
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// 配置文件路径
    #[clap(short, long)]
    config: Option<PathBuf>,

    /// 随机种子，用于复现一次运行
    #[clap(short, long)]
    seed: Option<u64>,

    /// 日志级别
    #[clap(long)]
    log_level: Option<String>,

    /// 启用详细日志
    #[clap(short, long, action = ArgAction::SetTrue)]
    verbose: bool,

    /// 以JSON行输出轨迹
    #[clap(long, action = ArgAction::SetTrue)]
    json: bool,

    /// 关闭彩色输出
    #[clap(long, action = ArgAction::SetTrue)]
    no_color: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // 加载配置，命令行参数覆盖配置文件
    let config_path = args.config.clone().unwrap_or_else(Config::default_path);
    let mut config = Config::load(&config_path)
        .with_context(|| format!("failed to load config from {}", config_path.display()))?;
    if let Some(seed) = args.seed {
        config.seed = Some(seed);
    }
    if let Some(level) = &args.log_level {
        config.log_level = level.clone();
    }
    if args.no_color {
        config.color = false;
    }
    config.validate()?;

    // 初始化日志
    let level = if args.verbose { "debug" } else { config.log_level.as_str() };
    setup_logger(Some(parse_log_level(level).map_err(|e| anyhow!(e))?)).map_err(|e| anyhow!(e))?;

    if !config.color {
        colored::control::set_override(false);
    }

    info!("{} {}", utils::name(), utils::version());

    let (initiator, responder) = match config.seed {
        Some(seed) => {
            info!("Using seed {}", seed);
            bootstrap_seeded(&config.initiator_name, &config.responder_name, seed)?
        }
        None => bootstrap_from_entropy(&config.initiator_name, &config.responder_name)?,
    };

    let mut driver = Driver::with_channel(initiator, responder)?;
    let outcome = driver.run(&Scenario::standard());

    for event in driver.trace() {
        if args.json {
            println!("{}", serde_json::to_string(event)?);
        } else {
            println!("{}", format_event(event));
        }
    }

    if let Err(e) = outcome {
        error!("Scenario failed: {}", e);
        return Err(e.into());
    }

    let snapshots = [driver.initiator().snapshot(), driver.responder().snapshot()];
    if args.json {
        println!("{}", serde_json::to_string(&snapshots)?);
    } else {
        println!();
        println!("{}", "Final state".bold());
        print!("{}", format_snapshots(&snapshots));
        for snapshot in &snapshots {
            println!("{} chains:", snapshot.identity.bold());
            print!("{}", format_chains(snapshot));
        }
    }

    Ok(())
}
