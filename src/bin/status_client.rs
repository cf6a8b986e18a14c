use dotenv::dotenv;
use tokio::io::{AsyncBufReadExt, BufReader};

use hello_service::client::{ApiClient, ConnectionStatus};

#[tokio::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let client = ApiClient::from_env();
    log::info!("🔗 API base URL: {}", client.base_url());

    println!("🚀 Fullstack Template");
    println!("Rust + actix-web backend, terminal client");
    println!();
    println!("Connection status:");

    let mut status = ConnectionStatus::new();
    println!("{}", status.render());

    status.load(&client).await;
    println!("{}", status.render());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while status.can_retry() {
        let Some(line) = lines.next_line().await? else {
            break;
        };
        if line.trim().eq_ignore_ascii_case("q") {
            break;
        }

        println!("🔄 Retrying...");
        status.retry(&client).await;
        println!("{}", status.render());
    }

    Ok(())
}
