#[tokio::main]
async fn main() {
    rishui::run().await;
}
