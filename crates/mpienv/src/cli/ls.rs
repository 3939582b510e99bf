//! Read-only views: `list`, `info`, `prefix`.

use crate::cli::app::{InfoArgs, ListArgs, OptionalNameArgs};
use crate::context::Context;
use crate::utils::table::{FormatConfig, format};
use anyhow::Result;
use mpienv_core::{InstallationRecord, Vendor};
use serde::Serialize;
use std::path::PathBuf;
use tabled::Tabled;

const BROKEN: &str = "*** broken ***";

#[derive(Tabled)]
struct ListRow {
    #[tabled(rename = "")]
    mark: &'static str,
    #[tabled(rename = "NAME")]
    name: String,
    #[tabled(rename = "TYPE")]
    vendor: String,
    #[tabled(rename = "VERSION")]
    version: String,
    #[tabled(rename = "PREFIX")]
    prefix: String,
}

impl ListRow {
    fn new(record: &InstallationRecord, active: bool) -> Self {
        let vendor = match record.vendor {
            Vendor::Broken => BROKEN.to_string(),
            v => v.label().to_string(),
        };
        Self {
            mark: if active { "*" } else { "" },
            name: record.name.clone(),
            vendor,
            version: record.version.clone(),
            prefix: record.prefix().display().to_string(),
        }
    }
}

/// Serialized form used by `--json`.
#[derive(Serialize)]
struct Described<'a> {
    #[serde(flatten)]
    record: &'a InstallationRecord,
    active: bool,
    prefix: PathBuf,
    mpicc: PathBuf,
    mpicxx: PathBuf,
}

impl<'a> Described<'a> {
    fn new(record: &'a InstallationRecord, active: bool) -> Self {
        Self {
            record,
            active,
            prefix: record.prefix(),
            mpicc: record.mpicc(),
            mpicxx: record.mpicxx(),
        }
    }
}

pub fn list(args: ListArgs) -> Result<()> {
    let ctx = Context::load()?;
    let records = ctx.registry.list();
    let current = ctx.registry.current_name().ok();
    let is_current = |r: &InstallationRecord| current.as_deref() == Some(r.name.as_str());

    if args.simple {
        for record in &records {
            println!("{}", record.name);
        }
    } else if args.json {
        let described: Vec<_> = records
            .iter()
            .map(|r| Described::new(r, is_current(r)))
            .collect();
        println!("{}", serde_json::to_string_pretty(&described)?);
    } else if records.is_empty() {
        eprintln!("no MPI installations registered; add one with `mpienv add <path>`");
    } else {
        let rows = records.iter().map(|r| ListRow::new(r, is_current(r)));
        println!("{}", format(rows, FormatConfig::default()));
    }
    Ok(())
}

#[derive(Tabled)]
struct Field {
    key: &'static str,
    value: String,
}

fn fields(record: &InstallationRecord) -> Vec<Field> {
    let field = |key, value: String| Field { key, value };
    let mut out = vec![
        field("Type", record.vendor.label().to_string()),
        field("Version", record.version.clone()),
    ];
    if let Some(base) = &record.base_version {
        let key = match record.vendor {
            Vendor::OpenMpi => "MPI API",
            _ => "MPICH base",
        };
        out.push(field(key, base.clone()));
    }
    out.push(field("Prefix", record.prefix().display().to_string()));
    out.push(field("mpiexec", record.launcher.display().to_string()));
    if record.vendor.is_usable() {
        out.push(field("mpicc", record.mpicc().display().to_string()));
        out.push(field("mpicxx", record.mpicxx().display().to_string()));
    }
    if !record.configure_options.is_empty() {
        out.push(field("Configure", record.configure_options.join(" ")));
    }
    if !record.features.is_empty() {
        out.push(field("Features", record.features.join(", ")));
    }
    out
}

pub fn info(args: InfoArgs) -> Result<()> {
    let ctx = Context::load()?;
    let name = ctx.name_or_current(args.name)?;
    let record = ctx.registry.get(&name)?;
    let active = ctx.registry.is_active(&record);

    if args.json {
        let described = Described::new(&record, active);
        println!("{}", serde_json::to_string_pretty(&described)?);
        return Ok(());
    }

    let title = if active {
        format!("{name} (active)")
    } else {
        name
    };
    let config = FormatConfig {
        header: Some(title),
        hide_columns: true,
    };
    println!("{}", format(fields(&record), config));
    Ok(())
}

pub fn prefix(args: OptionalNameArgs) -> Result<()> {
    let ctx = Context::load()?;
    let name = ctx.name_or_current(args.name)?;
    let record = ctx.registry.get(&name)?;
    println!("{}", record.prefix().display());
    Ok(())
}
