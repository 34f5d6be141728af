//! Renders the `pagerframe` manual page from the clap definition.

use std::{error::Error, fs, path::Path};

use clap::CommandFactory;
use clap_mangen::Man;

#[path = "src/cli.rs"]
#[allow(dead_code)]
mod cli;

const MAN_DIR: &str = "target/generated-man";

fn main() -> Result<(), Box<dyn Error>> {
    println!("cargo:rerun-if-changed=src/cli.rs");

    let command = cli::Cli::command();
    let page = Path::new(MAN_DIR).join(format!("{}.1", command.get_name()));
    let mut rendered = Vec::new();
    Man::new(command).render(&mut rendered)?;

    fs::create_dir_all(MAN_DIR)?;
    fs::write(page, rendered)?;
    Ok(())
}
