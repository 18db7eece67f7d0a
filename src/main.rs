#[actix_web::main]
async fn main() {
    dotenvy::dotenv().ok();

    if let Err(e) = csv_toolbox_lib::run().await {
        tracing::error!(error = %e, "csv-toolbox exited with an error");
        eprintln!("csv-toolbox: {}", e);
        std::process::exit(1);
    }
}
