//! Minimal search: query, pagination, filters, sorting.
//!
//! Prints the assembled `/select` URL; set `OSS_URL` (and optionally
//! `OSS_INDEX`) to run the search against a live engine.

use opensearchserver::{Client, SearchRequestBuilder};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let engine_url =
        std::env::var("OSS_URL").unwrap_or_else(|_| "http://localhost:8080".to_string());
    let index = std::env::var("OSS_INDEX").unwrap_or_else(|_| "articles".to_string());

    let client = Client::new(engine_url, index)?;

    let request = SearchRequestBuilder::new()
        .query("title:rust")
        .lang("en")
        .rows(10)
        .start(0)
        .add_filter("status:published")
        .add_fields(["title", "url", "date"])
        .add_sort("-date")
        .build();

    println!("{}", client.select_url(&request));

    if std::env::var("OSS_URL").is_ok() {
        let body = client.search(&request).await?;
        println!("{body}");
    }

    Ok(())
}
