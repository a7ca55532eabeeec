//! `linkicon init`: write a commented config file.

use anyhow::{Context, Result, bail};
use std::fs;

use crate::config::LinkiconConfig;
use crate::log;

/// Write the config template to `config.config_path`.
///
/// If `dry_run` is true, only prints the template to stdout.
pub fn write_config(config: &LinkiconConfig, dry_run: bool, force: bool) -> Result<()> {
    let content = render_template();
    if dry_run {
        print!("{content}");
        return Ok(());
    }

    let path = &config.config_path;
    if path.exists() && !force {
        bail!("{} already exists (use --force to overwrite)", path.display());
    }

    fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))?;
    log!("init"; "wrote {}", path.display());
    Ok(())
}

fn render_template() -> String {
    format!(
        "# linkicon configuration file (v{})\n\n{}",
        env!("CARGO_PKG_VERSION"),
        LinkiconConfig::template()
    )
}
