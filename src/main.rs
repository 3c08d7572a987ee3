#[tokio::main]
async fn main() -> anyhow::Result<()> {
    identity_store::app::run().await
}
