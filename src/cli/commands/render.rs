//! Render markdown with the site renderer

use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};

pub(crate) fn cmd_render(file: &Path) -> Result<()> {
    let content = if file.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read stdin")?;
        buf
    } else {
        std::fs::read_to_string(file)
            .with_context(|| format!("Failed to read {}", file.display()))?
    };
    print!("{}", insectelim::markdown::to_html(&content));
    Ok(())
}
