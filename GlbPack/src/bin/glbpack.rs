fn main() -> anyhow::Result<()> {
    glbpack::cli::run_cli()
}
