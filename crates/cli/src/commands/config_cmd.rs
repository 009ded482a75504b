//! `structllm config` — Show the effective configuration.

use crate::GlobalArgs;

pub fn show(global: &GlobalArgs) -> anyhow::Result<()> {
    let config = super::load_config(global)?;

    println!("# provider: {} ({})", config.provider, config.active_model());
    if !config.has_api_key() {
        println!("# hosted credential: not set (OPENAI_API_KEY)");
    }
    println!("{}", toml::to_string_pretty(&config.redacted())?);
    Ok(())
}
