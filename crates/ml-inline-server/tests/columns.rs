//! List-view cells and the tokens they carry

use ml_inline_model::FieldName;
use ml_inline_server::columns::{RenderedCell, PLACEHOLDER_HTML};
use ml_inline_server::http;
use ml_inline_test_utils::*;
use pretty_assertions::assert_eq;

#[tokio::test]
async fn editor_gets_prepopulated_controls() {
    let backend = TestBackend::new();
    let cells = backend
        .renderer()
        .render_row(id(JPEG_ID), &backend.editor)
        .await
        .unwrap();

    assert_eq!(cells.len(), 3);
    let RenderedCell::Editable(alt) = &cells[0].1 else {
        panic!("expected an editable alt cell, got {:?}", cells[0].1);
    };
    assert_eq!(cells[0].0, "ml_inline_alt");
    assert_eq!(alt.field, FieldName::AltText);
    assert_eq!(alt.value, "A barn");

    let RenderedCell::Editable(title) = &cells[1].1 else {
        panic!("expected an editable title cell");
    };
    assert_eq!(title.value, "Barn");
    assert!(cells[2].1.to_html().contains("<textarea"));
}

#[tokio::test]
async fn viewer_without_capability_sees_placeholder() {
    let backend = TestBackend::new();
    let cell = backend
        .renderer()
        .render("ml_inline_title", id(JPEG_ID), &backend.viewer)
        .await
        .unwrap();
    assert_eq!(cell, RenderedCell::Placeholder);
    assert_eq!(cell.to_html(), PLACEHOLDER_HTML);
}

#[tokio::test]
async fn non_image_and_non_attachment_rows_are_placeholders() {
    let backend = TestBackend::new();
    let renderer = backend.renderer();
    for raw in [PDF_ID, POST_ID] {
        let cell = renderer
            .render("ml_inline_desc", id(raw), &backend.editor)
            .await
            .unwrap();
        assert_eq!(cell, RenderedCell::Placeholder, "record {raw}");
    }
}

#[tokio::test]
async fn foreign_column_and_missing_record_are_skipped() {
    let backend = TestBackend::new();
    let renderer = backend.renderer();
    assert_eq!(
        renderer.render("author", id(JPEG_ID), &backend.editor).await.unwrap(),
        RenderedCell::Skip
    );
    assert_eq!(
        renderer.render("ml_inline_alt", id(999), &backend.editor).await.unwrap(),
        RenderedCell::Skip
    );
}

#[tokio::test]
async fn rendered_token_is_accepted_by_the_endpoint() {
    let backend = TestBackend::new();
    let cell = backend
        .renderer()
        .render("ml_inline_alt", id(SVG_ID), &backend.editor)
        .await
        .unwrap();
    let RenderedCell::Editable(control) = cell else {
        panic!("svg should be editable");
    };

    let response = warp::test::request()
        .method("POST")
        .path("/admin-ajax")
        .header("content-type", "application/x-www-form-urlencoded")
        .header("cookie", cookie(&backend.editor))
        .body(form_body("4", &control.token, "altText", "Vector logo"))
        .reply(&http::routes(backend.state.clone()))
        .await;
    assert_eq!(response.status().as_u16(), 200);
    assert_eq!(backend.store.snapshot(id(SVG_ID)).unwrap().alt_text, "Vector logo");
}
