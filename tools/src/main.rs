//! desk-runner: headless driver for the StarBank sales desk.
//!
//! Usage:
//!   desk-runner --db desk.db
//!   desk-runner --db desk.db --seed 7 --demo-agents 8 --demo-sales 5
//!   desk-runner --db desk.db --data-dir ./data --ipc-mode

use anyhow::{Context, Result};
use rust_decimal::Decimal;
use starbank_core::{
    calculator::{colony_stage, compute_collective_progress, compute_commission, compute_rank},
    clock::DeskClock,
    command::DeskCommand,
    config::DeskConfig,
    demo::DemoRoster,
    desk::SalesDesk,
    money::{format_brl, format_percent, format_rate, format_thousands},
    store::DeskStore,
};
use std::env;
use std::io::{self, BufRead, Write};

#[derive(serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum IpcRequest {
    Submit {
        command: DeskCommand,
    },
    Operator {
        agent_id: String,
    },
    Team {
        viewer_id: String,
        #[serde(default)]
        search: Option<String>,
    },
    Activity {
        #[serde(default)]
        since: i64,
        #[serde(default = "default_activity_limit")]
        limit: usize,
    },
    Quit,
}

fn default_activity_limit() -> usize {
    100
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let ipc_mode = args.iter().any(|a| a == "--ipc-mode");
    let db = string_arg(&args, "--db").unwrap_or(":memory:");
    let data_dir = string_arg(&args, "--data-dir");
    let seed = parse_arg(&args, "--seed", 42u64);
    let demo_agents = parse_arg(&args, "--demo-agents", 0usize);
    let demo_sales = parse_arg(&args, "--demo-sales", 4usize);

    let config = match data_dir {
        Some(dir) => DeskConfig::load(dir)?,
        None => DeskConfig::default(),
    };

    if !ipc_mode {
        println!("StarBank sales desk (desk-runner)");
        println!("  db:        {db}");
        println!("  data_dir:  {}", data_dir.unwrap_or("(built-in)"));
        println!("  goal:      {}", format_brl(config.collective_goal));
        println!();
    }

    let store = DeskStore::open(db).with_context(|| format!("opening {db}"))?;
    store.migrate()?;

    let mismatches = store.audit_totals()?;
    if !mismatches.is_empty() {
        log::warn!("{} agent totals out of step with their sales", mismatches.len());
        store.repair_totals()?;
    }

    let mut desk = SalesDesk::build(config, store, DeskClock::system());

    if demo_agents > 0 {
        let roster = DemoRoster::generate(seed, demo_agents, demo_sales);
        roster.apply(&mut desk)?;
    }

    if ipc_mode {
        run_ipc_loop(&mut desk)?;
    } else {
        print_summary(&desk)?;
    }

    Ok(())
}

fn run_ipc_loop(desk: &mut SalesDesk) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut handle = stdin.lock();
    let mut buffer = String::new();

    loop {
        buffer.clear();
        let bytes_read = handle.read_line(&mut buffer)?;
        if bytes_read == 0 {
            break; // EOF
        }
        if buffer.trim().is_empty() {
            continue;
        }

        let request: IpcRequest = match serde_json::from_str(&buffer) {
            Ok(r) => r,
            Err(e) => {
                let err_json = serde_json::json!({ "error": e.to_string() });
                writeln!(stdout, "{err_json}")?;
                stdout.flush()?;
                continue;
            }
        };

        let response = match request {
            IpcRequest::Quit => break,
            IpcRequest::Submit { command } => desk
                .submit(command)
                .map(|events| serde_json::json!({ "events": events })),
            IpcRequest::Operator { agent_id } => desk
                .operator_dashboard(&agent_id)
                .map(|view| serde_json::json!({ "operator": view })),
            IpcRequest::Team { viewer_id, search } => desk
                .team_view(&viewer_id, search.as_deref())
                .map(|view| serde_json::json!({ "team": view })),
            IpcRequest::Activity { since, limit } => desk
                .activity_since(since, limit)
                .map(|entries| serde_json::json!({ "activity": entries })),
        };

        let line = match response {
            Ok(value) => value,
            Err(e) => {
                log::warn!("ipc: request failed: {e}");
                serde_json::json!({ "error": e.to_string() })
            }
        };
        writeln!(stdout, "{line}")?;
        stdout.flush()?;
    }
    Ok(())
}

fn print_summary(desk: &SalesDesk) -> Result<()> {
    let agents = desk.agents_by_total()?;
    let totals: Vec<Decimal> = agents.iter().map(|a| a.sales_total).collect();
    let team_total: Decimal = totals.iter().copied().sum();
    let collective = compute_collective_progress(&totals, desk.config.collective_goal);
    let stage = colony_stage(collective, &desk.config.colony_stages);

    println!("=== TEAM SUMMARY ===");
    println!("  agents:      {}", agents.len());
    println!("  sales:       {}", desk.store().sale_count()?);
    println!("  team total:  {}", format_brl(team_total));
    println!(
        "  mission:     {} of {} ({})",
        format_percent(collective),
        format_thousands(desk.config.collective_goal),
        stage.status_text()
    );
    println!();

    if agents.is_empty() {
        println!("  (No agents registered yet)");
        return Ok(());
    }

    println!("=== LEADERBOARD ===");
    for (i, agent) in agents.iter().enumerate() {
        let commission = compute_commission(agent.sales_total, &desk.config.commissions);
        let rank = compute_rank(agent.sales_total, &desk.config.ranks);
        let next = match &rank.next_tier {
            Some(tier) => format!("{} to {}", format_brl(rank.distance_to_next), tier.name),
            None => "top rank".to_string(),
        };
        println!(
            "  {:>2}. {:<24} {:>16} | {:<19} | rate {:>6} | comm {:>14} | {next}",
            i + 1,
            agent.name,
            format_brl(agent.sales_total),
            rank.current_tier.name,
            format_rate(commission.rate),
            format_brl(commission.commission_amount),
        );
    }

    let duels = desk.store().active_duels()?;
    if !duels.is_empty() {
        println!();
        println!("=== ACTIVE DUELS ===");
        for duel in duels {
            let standing = desk.duel_standing(&duel.challenger_id)?;
            if let Some(s) = standing {
                println!(
                    "  {} vs {} to {}: {} / {}",
                    s.duel.challenger_id,
                    s.duel.opponent_id,
                    format_thousands(s.duel.goal),
                    format_percent(s.challenger_percent),
                    format_percent(s.opponent_percent),
                );
            }
        }
    }
    Ok(())
}

fn string_arg<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}
