//! Config command

use anyhow::Result;

pub fn run(path: Option<&str>) -> Result<()> {
    let config = super::load_config(path)?;
    config.validate()?;
    print!("{}", config.to_toml()?);
    Ok(())
}
