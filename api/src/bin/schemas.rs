use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use lists_api::{Item, List, ValidationErrors};
use schemars::{schema_for, JsonSchema};
use structopt::StructOpt;

/// Write the JSON schema of every wire type
#[derive(StructOpt)]
struct Opt {
    /// Directory the schema files are written to
    #[structopt(long, parse(from_os_str), default_value = "schemas")]
    out: PathBuf,
}

fn write_schema<T: JsonSchema>(out: &Path, name: &str) -> Result<()> {
    let schema = schema_for!(T);
    let output = serde_json::to_string_pretty(&schema)?;
    let path = out.join(format!("{}.json", name));
    fs::write(&path, output).with_context(|| format!("writing {}", path.display()))
}

fn main() -> Result<()> {
    let opt = Opt::from_args();
    fs::create_dir_all(&opt.out)
        .with_context(|| format!("creating {}", opt.out.display()))?;

    write_schema::<Item>(&opt.out, "item")?;
    write_schema::<List>(&opt.out, "list")?;
    write_schema::<ValidationErrors>(&opt.out, "validation_errors")?;
    Ok(())
}
