#[actix_web::main]
async fn main() {
    if let Err(e) = healthlens_lib::run().await {
        eprintln!("healthlens failed to start: {}", e);
        std::process::exit(1);
    }
}
