use hw_provider::{init_logging, serve, HwProvider};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();
    serve(HwProvider::new()).await?;
    Ok(())
}
