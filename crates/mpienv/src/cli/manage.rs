//! Registry mutations: `add`, `rm`, `rename`. Each holds the registry lock.

use crate::cli::app::{AddArgs, NameArgs, RenameArgs};
use crate::context::Context;
use anyhow::Result;

pub fn add(args: AddArgs) -> Result<()> {
    let mut ctx = Context::load()?;
    let _lock = ctx.lock()?;
    let name = ctx.registry.add(&args.target, args.name.as_deref())?;
    let record = ctx.registry.get(&name)?;
    println!("{name}: {} {} ({})", record.vendor, record.version, record.prefix().display());
    Ok(())
}

pub fn remove(args: NameArgs) -> Result<()> {
    let mut ctx = Context::load()?;
    let _lock = ctx.lock()?;
    ctx.registry.remove(&args.name, &ctx.binding)?;
    Ok(())
}

pub fn rename(args: RenameArgs) -> Result<()> {
    let mut ctx = Context::load()?;
    let _lock = ctx.lock()?;
    ctx.registry.rename(&args.from, &args.to, &ctx.binding)?;
    Ok(())
}
