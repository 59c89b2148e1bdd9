use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use imena::config::{self, Config};
use imena::gateway::{ApiClient, CancelToken};
use imena::models::income::GroupBy;
use imena::models::user::{display_name, RegisterRequest};
use imena::session::{Session, SessionState};
use imena::store::FileStore;
use imena::views::stats::{format_compact, load_stats, period_label};
use imena::views::{CooperativeView, MembersView};

mod cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // IMENA_LOG_FORMAT=json switches stderr logs to one JSON object per line.
    let json_logs = std::env::var("IMENA_LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "imena=info".into()),
        ))
        .with(json_logs.then(|| tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr)))
        .with((!json_logs).then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr)))
        .init();

    let args = cli::Cli::parse();

    let result = run(args).await;
    if let Err(ref e) = result {
        eprintln!("Error: {:?}", e);
    }
    result
}

async fn run(args: cli::Cli) -> anyhow::Result<()> {
    let mut cfg = config::load()?;
    if let Some(url) = args.api_url.as_deref() {
        cfg = cfg.with_api_url(url)?;
    }
    let session = connect(&cfg)?;

    match args.command {
        cli::Commands::Login { identifier, password } => {
            let identity = session
                .login(&identifier, &password)
                .await
                .context("Login failed")?;
            let who = identity.email_or_phone().unwrap_or(&identifier);
            println!("Logged in as {} ({})", display_name(who), identity.role);
        }
        cli::Commands::Logout => {
            session.logout();
            println!("Logged out.");
        }
        cli::Commands::Whoami => {
            require_login(&session).await?;
            if let Some(me) = session.identity() {
                println!(
                    "Name:     {}\n  ID:       {}\n  Email:    {}\n  Phone:    {}\n  Role:     {}",
                    display_name(me.email_or_phone().unwrap_or_default()),
                    me.id,
                    me.email.as_deref().unwrap_or("-"),
                    me.phone_number.as_deref().unwrap_or("-"),
                    me.role
                );
            }
        }
        cli::Commands::Register {
            email,
            phone,
            full_name,
            password,
            role,
            cooperative_id,
            invite_code,
            cooperatives,
        } => {
            if email.is_none() && phone.is_none() {
                anyhow::bail!("Provide --email or --phone");
            }
            let body = RegisterRequest {
                email,
                phone_number: phone,
                confirm_password: password.clone(),
                password,
                full_name,
                role: role.into(),
                cooperative_id,
                invite_code,
                cooperatives,
            };
            let resp = session
                .client()
                .register(&body)
                .await
                .context("Registration failed")?;
            println!("{}", resp.detail.as_deref().unwrap_or("Account created. You can now log in."));
        }
        cli::Commands::Cooperatives { command } => handle_cooperative_command(&session, command).await?,
        cli::Commands::Members => {
            require_login(&session).await?;
            let view = MembersView::new(Arc::clone(session.client()));
            view.load_all().await;
            let records = view.records();
            if records.is_empty() {
                println!("No members found.");
            } else {
                println!("{:<8} {:<32} {:<10} {:<24}", "ID", "EMAIL/PHONE", "VERIFIED", "COOPERATIVE");
                for r in records {
                    println!(
                        "{:<8} {:<32} {:<10} {:<24}",
                        r.member.id, r.member.email, r.member.is_verified, r.cooperative_name
                    );
                }
            }
        }
        cli::Commands::Verify { cooperative, member } => {
            require_login(&session).await?;
            let result = session
                .client()
                .verify_member(cooperative, member)
                .await
                .context("Verify failed")?;
            println!(
                "Member {} is now {}.",
                result.id,
                if result.is_verified { "verified" } else { "unverified" }
            );
        }
        cli::Commands::Income { command } => handle_income_command(&session, command).await?,
        cli::Commands::Contribute { amount, cooperative, date } => {
            require_login(&session).await?;
            let receipt = session
                .client()
                .contribute(amount, cooperative, date)
                .await
                .context("Contribution failed")?;
            println!(
                "Contribution recorded:\n  Amount:      {} RWF\n  Date:        {}\n  Cooperative: {}\n  Status:      {}",
                receipt.amount,
                receipt.date,
                receipt.cooperative,
                receipt
                    .status
                    .map(|s| format!("{:?}", s))
                    .unwrap_or_else(|| "-".into())
            );
        }
    }
    Ok(())
}

fn connect(cfg: &Config) -> anyhow::Result<Session> {
    let store = Arc::new(FileStore::new(&cfg.credentials_file));
    let client = ApiClient::new(&cfg.api_url, store, cfg.request_timeout)?;
    tracing::debug!(api_url = %cfg.api_url, credentials = %cfg.credentials_file.display(), "client ready");
    Ok(Session::new(Arc::new(client)))
}

async fn require_login(session: &Session) -> anyhow::Result<()> {
    match session.restore().await {
        SessionState::Authenticated(_) => Ok(()),
        _ => anyhow::bail!("Not logged in. Run `imena login` first."),
    }
}

async fn handle_cooperative_command(
    session: &Session,
    cmd: cli::CooperativeCommands,
) -> anyhow::Result<()> {
    let client = session.client();
    match cmd {
        cli::CooperativeCommands::List => {
            require_login(session).await?;
            let coops = client.list_cooperatives().await.context("Failed to list cooperatives")?;
            print_cooperatives(&coops);
        }
        cli::CooperativeCommands::Choices => {
            print_cooperatives(&client.signup_choices().await);
        }
        cli::CooperativeCommands::Create { name } => {
            require_login(session).await?;
            let coop = client
                .create_cooperative(&name)
                .await
                .context("Failed to create cooperative")?;
            println!("Cooperative created:\n  Name:     {}\n  ID:       {}", coop.name, coop.id);
        }
        cli::CooperativeCommands::Show { id } => {
            require_login(session).await?;
            let view = CooperativeView::new(Arc::clone(client), id);
            let detail = view.load().await.context("Failed to load cooperative")?;
            println!(
                "{} (#{}) - {} members, {} verified",
                detail.name,
                detail.id,
                detail.members.len(),
                detail.verified_count()
            );
            println!("{:<8} {:<32} {:<10}", "ID", "EMAIL/PHONE", "VERIFIED");
            for m in &detail.members {
                println!("{:<8} {:<32} {:<10}", m.id, m.email, m.is_verified);
            }
        }
    }
    Ok(())
}

async fn handle_income_command(session: &Session, cmd: cli::IncomeCommands) -> anyhow::Result<()> {
    require_login(session).await?;
    let client = session.client();
    match cmd {
        cli::IncomeCommands::Summary => {
            let summary = client.income_summary().await.context("Failed to load income")?;
            println!("Total income: {} RWF", summary.total_income);
        }
        cli::IncomeCommands::Stats { group_by, year } => {
            let year = match group_by {
                GroupBy::Month => Some(year.unwrap_or_else(|| chrono::Datelike::year(&chrono::Local::now()))),
                GroupBy::Year => None,
            };
            let points = load_stats(client, group_by, year, &CancelToken::new()).await;
            if points.is_empty() {
                println!("No income recorded.");
            } else {
                println!("{:<10} {:>14} {:>8}", "PERIOD", "TOTAL", "");
                for p in points {
                    println!(
                        "{:<10} {:>14} {:>8}",
                        period_label(&p.period, group_by),
                        p.total,
                        format_compact(p.total)
                    );
                }
            }
        }
    }
    Ok(())
}

fn print_cooperatives(coops: &[imena::models::cooperative::Cooperative]) {
    if coops.is_empty() {
        println!("No cooperatives found.");
        return;
    }
    println!("{:<8} {:<40}", "ID", "NAME");
    for c in coops {
        println!("{:<8} {:<40}", c.id, c.name);
    }
}
