mod common;

use common::make_pdf;
use mpn_core::extract::extract_text;

#[test]
fn extracts_pages_in_order() {
    let pdf = make_pdf(&["First page LM317T", "Second page NE555P"]);
    let text = extract_text(&pdf).unwrap();
    let first = text.find("LM317T").expect("first page text");
    let second = text.find("NE555P").expect("second page text");
    assert!(first < second);
}

#[test]
fn truncated_pdf_is_an_error_not_a_panic() {
    let pdf = make_pdf(&["Some text"]);
    let cut = &pdf[..pdf.len() / 3];
    assert!(extract_text(cut).is_err());
}

#[test]
fn blank_page_yields_short_text() {
    let text = extract_text(&make_pdf(&[""])).unwrap();
    assert!(text.trim().chars().count() < 100);
}
