fn main() -> anyhow::Result<()> {
    cellhal_cli::run()
}
