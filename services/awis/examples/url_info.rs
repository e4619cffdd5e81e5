//! Look up one site with `UrlInfo`.
//!
//! ```shell
//! AWS_ACCESS_KEY_ID=... AWS_SECRET_ACCESS_KEY=... \
//!     cargo run -p awis --example url_info -- example.com
//! ```

use anyhow::Result;
use awis::{Client, Config, Query};
use awis_core::{Context, OsEnv};
use awis_file_read_tokio::TokioFileRead;
use awis_http_send_reqwest::ReqwestHttpSend;
use http::HeaderMap;

#[tokio::main]
async fn main() -> Result<()> {
    let _ = env_logger::builder().try_init();
    let _ = dotenv::dotenv();

    let url = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "example.com".to_string());
    let response_group = std::env::args()
        .nth(2)
        .unwrap_or_else(|| "Rank,LinksInCount".to_string());

    let ctx = Context::new()
        .with_file_read(TokioFileRead)
        .with_http_send(ReqwestHttpSend::default())
        .with_env(OsEnv);
    let config = Config::default().from_env(&ctx);
    let client = Client::new(ctx, config);

    let resp = client
        .execute(&Query::url_info(&url, &response_group), HeaderMap::new())
        .await?;

    println!("RequestId: {}", resp.request_id);
    println!("StatusCode: {}", resp.status_code);
    println!("{}", serde_json::to_string_pretty(&resp.body)?);
    Ok(())
}
