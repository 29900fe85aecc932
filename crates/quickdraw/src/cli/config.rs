//! `quickdraw config` subcommand: validate a config file and print the
//! effective configuration after defaults are applied.

use std::path::PathBuf;

use clap::Parser;

use crate::config::QuickdrawConfig;

#[derive(Parser, Debug)]
pub struct Args {
    #[arg(short, long, default_value = "quickdraw.toml")]
    pub config: PathBuf,
}

pub fn execute(args: Args) -> anyhow::Result<()> {
    let config = if args.config.exists() {
        QuickdrawConfig::from_file(&args.config)?
    } else {
        eprintln!(
            "config file {} not found, showing defaults",
            args.config.display()
        );
        QuickdrawConfig::default()
    };

    config.validate()?;

    let rendered = toml::to_string_pretty(&config)
        .map_err(|e| anyhow::anyhow!("failed to render config: {}", e))?;
    println!("{}", rendered);

    Ok(())
}
