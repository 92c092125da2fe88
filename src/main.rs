fn main() -> anyhow::Result<()> {
    design_tokens::cli::run()
}
