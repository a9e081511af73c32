use anyhow::Result;

fn main() -> Result<()> {
    cdt_lists_cli::run()
}
