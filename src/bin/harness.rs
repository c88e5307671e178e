use anyhow::Result;

fn main() -> Result<()> {
    toolchain_harness::cli::run()
}
