use super::Context;
use crate::DeployArgs;
use crate::utils;
use colored::Colorize;
use std::path::Path;

pub async fn handle_create(ctx: &Context, args: DeployArgs) -> anyhow::Result<()> {
    let template = utils::read_file(&args.template)?;
    let options = utils::build_options(
        &args.params,
        &args.tags,
        args.policy_during_update.as_deref(),
    )?;

    println!("{} {}", "Creating stack".blue(), args.name.cyan());
    let identity = ctx.manager.create(&args.name, &template, &options).await?;
    println!("  id: {}", identity.id);

    if args.wait {
        wait_for(ctx, &args.name, args.timeout).await?;
    }
    Ok(())
}

pub async fn handle_update(ctx: &Context, args: DeployArgs) -> anyhow::Result<()> {
    if !args.tags.is_empty() {
        println!(
            "{}",
            "⚠ Tags cannot change after creation; --tag is ignored".yellow()
        );
    }
    let template = utils::read_file(&args.template)?;
    let options = utils::build_options(&args.params, &[], args.policy_during_update.as_deref())?;

    println!("{} {}", "Updating stack".blue(), args.name.cyan());
    let identity = ctx.manager.update(&args.name, &template, &options).await?;
    println!("  id: {}", identity.id);

    if args.wait {
        wait_for(ctx, &args.name, args.timeout).await?;
    }
    Ok(())
}

pub async fn handle_delete(ctx: &Context, name: &str) -> anyhow::Result<()> {
    ctx.manager.delete(name).await?;
    println!("{} {}", "✓ Delete requested for".green(), name.cyan());
    Ok(())
}

pub async fn handle_policy(ctx: &Context, name: &str, file: &Path) -> anyhow::Result<()> {
    let policy = utils::read_file(file)?;
    ctx.manager.set_policy(name, &policy).await?;
    println!("{} {}", "✓ Stack policy set on".green(), name.cyan());
    Ok(())
}

async fn wait_for(ctx: &Context, name: &str, timeout: Option<u64>) -> anyhow::Result<()> {
    let timeout = ctx.timeout(timeout);
    println!(
        "{}",
        format!("Waiting for {} (timeout {}s)...", name, timeout.as_secs()).dimmed()
    );
    ctx.manager.wait(name, timeout).await?;
    println!("{} {}", "✓ Stack ready:".green().bold(), name.cyan());
    Ok(())
}
