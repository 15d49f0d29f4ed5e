use super::Context;
use crate::utils;
use colored::Colorize;
use stackflow_cloud::StackError;

pub async fn handle_status(ctx: &Context, name: &str, json: bool) -> anyhow::Result<()> {
    let stack = ctx
        .manager
        .describe(name)
        .await?
        .ok_or_else(|| StackError::StackNotFound(name.to_string()))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&stack)?);
        return Ok(());
    }

    println!("{}: {}", "Stack".bold(), stack.name.cyan());
    println!("  id:     {}", stack.id);
    println!("  status: {}", utils::colored_status(&stack.status));
    if let Some(reason) = &stack.status_reason {
        println!("  reason: {}", reason);
    }
    if !stack.parameters.is_empty() {
        println!("  parameters:");
        for (key, value) in stack.parameter_map() {
            println!("    {} = {}", key, value);
        }
    }
    if !stack.tags.is_empty() {
        println!("  tags:");
        for tag in &stack.tags {
            println!("    {} = {}", tag.key, tag.value);
        }
    }
    Ok(())
}

pub async fn handle_list(ctx: &Context, all: bool, json: bool) -> anyhow::Result<()> {
    if !all {
        let names = ctx.manager.list_active().await?;
        if json {
            println!("{}", serde_json::to_string_pretty(&names)?);
        } else if names.is_empty() {
            println!("{}", "No active stacks".dimmed());
        } else {
            for name in names {
                println!("{}", name);
            }
        }
        return Ok(());
    }

    let summaries = ctx.manager.list_all().await?;
    if json {
        println!("{}", serde_json::to_string_pretty(&summaries)?);
        return Ok(());
    }
    for summary in &summaries {
        println!(
            "{:<40} {:<36} {}",
            summary.name.cyan(),
            utils::colored_status(&summary.status),
            utils::format_time(summary.last_updated_time.or(summary.creation_time))
        );
    }
    Ok(())
}

pub async fn handle_exists(ctx: &Context, name: &str) -> anyhow::Result<bool> {
    let exists = ctx.manager.exists(name).await?;
    println!("{}", exists);
    Ok(exists)
}

pub async fn handle_template(ctx: &Context, name: &str) -> anyhow::Result<()> {
    let body = ctx.manager.get_template(name).await?;
    println!("{}", body);
    Ok(())
}

pub async fn handle_resources(
    ctx: &Context,
    name: &str,
    vpc: bool,
    json: bool,
) -> anyhow::Result<()> {
    if vpc {
        println!("{}", ctx.manager.stack_vpc(name).await?);
        return Ok(());
    }

    let resources = ctx.manager.list_resources(name).await?;
    if json {
        println!("{}", serde_json::to_string_pretty(&resources)?);
        return Ok(());
    }
    for resource in &resources {
        println!(
            "{:<32} {:<36} {:<24} {}",
            resource.logical_id,
            resource.resource_type.dimmed(),
            resource.status,
            resource.physical_id.as_deref().unwrap_or("-")
        );
    }
    Ok(())
}
