#[tokio::main]
async fn main() -> anyhow::Result<()> {
    ringfocus_lib::run().await
}
