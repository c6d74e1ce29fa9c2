use std::env;
use std::fs;
use std::process;

use anyhow::{Context, Result};
use rwlc::command::Dialect;
use rwlc::config::PollerConfig;
use rwlc::controller::Controller;
use rwlc::dispatch::poll_access_points;
use rwlc::pool::ConnectionPool;
use rwlc::session::{
    ConnectionSecurityOptions, ReplayEntry, ReplaySession, Session, SshSession, SshTarget,
};

fn print_usage() {
    eprintln!(
        "Usage: cargo run --example poll_aps -- [--replay <capture.jsonl>] [--pool-size <n>]\n\
         Live mode reads WLC_HOST, WLC_USER, WLC_PASSWORD and optionally\n\
         WLC_ENABLE_PASSWORD and WLC_DIALECT (aos6|aos8)."
    );
}

fn required_env(name: &str) -> Result<String> {
    env::var(name).with_context(|| format!("environment variable {name} is not set"))
}

async fn poll<S: Session + 'static>(pool: ConnectionPool<S>) -> Result<()> {
    let aps = {
        let mut lease = pool.acquire().await?;
        lease.ap_database().await.context("reading AP database")?
    };
    println!("controller reports {} APs", aps.len());

    let report = poll_access_points(&pool, &aps).await;
    for status in &report.statuses {
        let neighbor = status
            .neighbor
            .as_ref()
            .map(|n| format!("{} {}", n.remote_switch, n.remote_port))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<20} {:<18} {:<6} {:<16} tx={} rx={} lldp={}",
            status.ap_name,
            status.mac_addr,
            status.interface.status,
            status.interface.link_summary(),
            status.interface.tx_bytes,
            status.interface.rx_bytes,
            neighbor
        );
    }

    if env::var_os("WLC_JSON").is_some() {
        println!("{}", serde_json::to_string_pretty(&report)?);
    }

    pool.shutdown().await;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut config = PollerConfig::default();
    let mut replay = None;
    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--replay" => replay = Some(args.next().context("--replay needs a file")?),
            "--pool-size" => {
                config.pool_size = args
                    .next()
                    .context("--pool-size needs a value")?
                    .parse()
                    .context("--pool-size must be a number")?;
            }
            "--help" | "-h" => {
                print_usage();
                return Ok(());
            }
            unknown => {
                eprintln!("Unknown flag: {unknown}");
                print_usage();
                process::exit(2);
            }
        }
    }

    let dialect = match env::var("WLC_DIALECT") {
        Ok(name) => Dialect::by_name(&name)?,
        Err(_) => Dialect::default(),
    };

    if let Some(path) = replay {
        let capture = fs::read_to_string(&path).with_context(|| format!("reading {path}"))?;
        let entries = ReplayEntry::parse_jsonl(&capture)?;
        let pool = ConnectionPool::connect(&config, |i| {
            let session = ReplaySession::from_entries(&format!("replay-{i}"), &entries);
            Controller::new(session, dialect)
        })
        .await?;
        return poll(pool).await;
    }

    let mut target = SshTarget::new(
        &required_env("WLC_USER")?,
        &required_env("WLC_HOST")?,
        &required_env("WLC_PASSWORD")?,
    );
    if let Ok(enable) = env::var("WLC_ENABLE_PASSWORD") {
        target = target.with_enable_password(&enable);
    }

    let pool = ConnectionPool::connect(&config, |_| {
        let session = SshSession::new(
            target.clone(),
            ConnectionSecurityOptions::for_level(config.security),
        )
        .with_command_timeout(config.command_timeout());
        Controller::new(session, dialect)
    })
    .await?;
    poll(pool).await
}
