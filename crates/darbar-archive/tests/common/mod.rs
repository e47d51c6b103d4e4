#![allow(dead_code)]

use axum::{extract::RawQuery, http::StatusCode, response::Html, routing::get, Router};
use darbar_archive::classification::ClassificationIndex;
use darbar_archive::{ArchiveClient, ArchiveRoots};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

pub const DATASET: &str = "\
performer,day,name,url,dutyType
Bhai A,Mon,Dawn.mp3,https://host/kirtan/Dawn.mp3,Asa Di Vaar
Bhai B,Tue,Noon.mp3,https://host/kirtan/Noon.mp3,Tin Pehar
";

/// How long `/slow/` stalls before answering.
pub const SLOW_DELAY: Duration = Duration::from_millis(400);

pub fn listing_page(items: &[(&str, &str)]) -> String {
    let lis: String = items
        .iter()
        .map(|(name, href)| format!(r#"<li data-name="{name}" data-href="{href}">{name}</li>"#))
        .collect();
    format!(
        r#"<html><body><ul id="directory-listing">
        <li data-name=".." data-href="?dir=">..</li>{lis}</ul></body></html>"#
    )
}

async fn kirtan(RawQuery(query): RawQuery) -> Html<String> {
    let page = match query.as_deref() {
        None => listing_page(&[("2025", "?dir=2025"), ("2024", "?dir=2024")]),
        Some("dir=2025") => listing_page(&[
            ("January", "January"),
            ("Asa Di Vaar (04;00).mp3", "Asa Di Vaar (04;00).mp3"),
        ]),
        Some("dir=2025/January") => {
            listing_page(&[("Rehras.mp3", "Rehras.mp3"), ("Sohila.mp3", "Sohila.mp3")])
        }
        Some(_) => listing_page(&[]),
    };
    Html(page)
}

async fn slow() -> Html<String> {
    tokio::time::sleep(SLOW_DELAY).await;
    Html(listing_page(&[("Late.mp3", "Late.mp3")]))
}

async fn missing() -> StatusCode {
    StatusCode::NOT_FOUND
}

async fn broken() -> (StatusCode, Html<String>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Html(listing_page(&[("Ghost.mp3", "Ghost.mp3")])),
    )
}

/// Serve a fake origin on an ephemeral port. Returns its base URL.
pub async fn spawn_origin() -> String {
    let app = Router::new()
        .route("/kirtan/", get(kirtan))
        .route("/slow/", get(slow))
        .route("/missing/", get(missing))
        .route("/broken/", get(broken));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

pub fn client_for(origin: &str) -> ArchiveClient {
    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(5))
        .build()
        .unwrap();
    ArchiveClient::new(
        http,
        ArchiveRoots::new(
            format!("{origin}/kirtan/"),
            format!("{origin}/ragiwise/"),
            format!("{origin}/classification/"),
        ),
        Arc::new(ClassificationIndex::from_text(DATASET)),
    )
}
