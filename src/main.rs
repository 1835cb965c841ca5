
#[tokio::main]
async fn main() {
    if let Err(e) = review_pulse_lib::run().await {
        eprintln!("review-pulse: {e}");
        std::process::exit(1);
    }
}
