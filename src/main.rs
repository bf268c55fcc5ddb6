use anyhow::Result;
use pin_buddy::cli::cli;

fn main() -> Result<()> {
    cli()
}
