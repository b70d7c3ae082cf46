use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    briefly::cli::run().await
}
