use anyhow::Result;
use unidep::Config;

pub fn show() -> Result<()> {
    let config = Config::load()?;
    print!("{}", toml::to_string_pretty(&config)?);
    Ok(())
}
