use miette::Result;

#[tokio::main]
async fn main() -> Result<()> {
    vaultsync::cli::run().await
}
