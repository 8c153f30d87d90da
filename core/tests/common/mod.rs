#![allow(dead_code)]

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::Router;
use lopdf::dictionary;
use lopdf::{Document, Object, Stream};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

pub const FILLER: &str = "Electrical characteristics are specified at TA 25 C unless otherwise noted in the tables below";

/// One Helvetica text line per page.
pub fn make_pdf(pages: &[&str]) -> Vec<u8> {
    let mut doc = Document::with_version("1.4");
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let pages_id = doc.new_object_id();
    let mut kids: Vec<Object> = Vec::new();
    for text in pages {
        let content = format!("BT /F1 10 Tf 20 700 Td ({text}) Tj ET");
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.into_bytes()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            "Contents" => content_id,
            "Resources" => dictionary! { "Font" => dictionary! { "F1" => font_id } },
        });
        kids.push(page_id.into());
    }
    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! { "Type" => "Pages", "Kids" => kids, "Count" => count }),
    );
    let catalog_id = doc.add_object(dictionary! { "Type" => "Catalog", "Pages" => pages_id });
    doc.trailer.set("Root", catalog_id);

    let mut buf = Vec::new();
    doc.save_to(&mut buf).unwrap();
    buf
}

/// A datasheet whose text layer is well past the unreadable threshold.
pub fn datasheet(body: &str) -> Vec<u8> {
    make_pdf(&[FILLER, body, FILLER])
}

type Docs = Arc<HashMap<String, Vec<u8>>>;

async fn serve_doc(State(docs): State<Docs>, Path(name): Path<String>) -> Result<Vec<u8>, StatusCode> {
    docs.get(&name).cloned().ok_or(StatusCode::NOT_FOUND)
}

async fn serve_slow(State(docs): State<Docs>, Path(name): Path<String>) -> Result<Vec<u8>, StatusCode> {
    tokio::time::sleep(Duration::from_secs(5)).await;
    docs.get(&name).cloned().ok_or(StatusCode::NOT_FOUND)
}

/// Serve `docs` under `/docs/{name}` and, after a 5 s delay, `/slow/{name}`. Returns the base URL.
pub async fn spawn_server(docs: Vec<(&str, Vec<u8>)>) -> String {
    let docs: Docs = Arc::new(docs.into_iter().map(|(k, v)| (k.to_string(), v)).collect());
    let app = Router::new()
        .route("/docs/:name", get(serve_doc))
        .route("/slow/:name", get(serve_slow))
        .route("/error", get(|| async { StatusCode::INTERNAL_SERVER_ERROR }))
        .with_state(docs);
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr: SocketAddr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}
