#[tokio::main]
async fn main() {
    if let Err(err) = skillswap_api::run().await {
        tracing::error!(error = %err, "skillswap-api failed");
        std::process::exit(1);
    }
}
