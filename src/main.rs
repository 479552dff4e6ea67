#[tokio::main]
async fn main() {
    if let Err(e) = rightwatch::run().await {
        eprintln!("rightwatch failed: {}", e);
        std::process::exit(1);
    }
}
