//! Faceting, field collapsing, and join sub-queries.

use opensearchserver::{Client, FacetOptions, SearchRequestBuilder};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let engine_url =
        std::env::var("OSS_URL").unwrap_or_else(|_| "http://localhost:8080".to_string());
    let index = std::env::var("OSS_INDEX").unwrap_or_else(|_| "products".to_string());

    let client = Client::new(engine_url, index)?;

    let request = SearchRequestBuilder::new()
        .query("laptop")
        .rows(20)
        // Value-count buckets per brand and per tag (tags are multi-valued).
        .facet("brand", FacetOptions::default().min(1))
        .facet("tags", FacetOptions::default().multi(true))
        // Keep at most two results per shop.
        .collapse_field("shop_id")
        .collapse_mode("adjacent")
        .collapse_max(2)
        // Correlate with the reviews index through join position 0.
        .join(0, "product_id:id")
        .add_join_filter(0, "rating:[4 TO 5]")
        .build();

    println!("{}", client.select_url(&request));

    if std::env::var("OSS_URL").is_ok() {
        let body = client.search(&request).await?;
        println!("{body}");
    }

    Ok(())
}
