use super::Context;
use crate::utils::since_cutoff;
use colored::Colorize;
use stackflow_cloud::StackApi;

pub async fn handle_wait(
    ctx: &Context,
    name: &str,
    timeout: Option<u64>,
    settled: bool,
) -> anyhow::Result<()> {
    let timeout = ctx.timeout(timeout);
    println!(
        "{}",
        format!("Waiting for {} (timeout {}s)...", name, timeout.as_secs()).dimmed()
    );

    if settled {
        ctx.manager.wait_for_complete(name, timeout).await?;
        let status = ctx
            .manager
            .describe(name)
            .await?
            .map(|s| s.status.to_string())
            .unwrap_or_default();
        println!("{} {} {}", "✓ Stack settled:".green().bold(), name.cyan(), status);
    } else {
        ctx.manager.wait(name, timeout).await?;
        println!("{} {}", "✓ Stack ready:".green().bold(), name.cyan());
    }
    Ok(())
}

pub async fn handle_failures(ctx: &Context, name: &str, since_secs: u64) -> anyhow::Result<()> {
    let since = since_cutoff(chrono::Utc::now(), since_secs);
    let failures = ctx.manager.list_failures(name, since).await?;

    if failures.is_empty() {
        println!("{}", "No failures".dimmed());
        return Ok(());
    }
    for failure in &failures {
        println!("{} {}", "✗".red(), failure);
    }
    Ok(())
}

pub async fn handle_events(
    ctx: &Context,
    name: &str,
    limit: usize,
    json: bool,
) -> anyhow::Result<()> {
    let events = ctx.manager.api().describe_stack_events(name).await?;
    let recent = &events[events.len().saturating_sub(limit)..];

    if json {
        println!("{}", serde_json::to_string_pretty(recent)?);
        return Ok(());
    }

    for event in recent {
        let status = if event.is_failure() {
            event.resource_status.red()
        } else {
            event.resource_status.normal()
        };
        println!(
            "{}  {:<32} {:<28} {}",
            event.timestamp.format("%Y-%m-%d %H:%M:%S"),
            event.logical_resource_id,
            status,
            event.resource_status_reason.as_deref().unwrap_or_default()
        );
    }
    Ok(())
}
