#[tokio::main]
async fn main() -> anyhow::Result<()> {
    idlink::app::run().await
}
