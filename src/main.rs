#[tokio::main]
async fn main() {
    if let Err(e) = nouka_techou::run().await {
        log::error!("起動に失敗しました: {e}");
        std::process::exit(1);
    }
}
