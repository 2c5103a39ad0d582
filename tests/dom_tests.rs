//! Browser tests for the DOM surface.
//!
//! Run with: wasm-pack test --headless --firefox
#![cfg(target_arch = "wasm32")]
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]

use pdview::render::{DomSurface, Flag, HeadKind, Surface};
use wasm_bindgen::JsCast;
use wasm_bindgen_test::*;
use web_sys::{Element, HtmlElement};

wasm_bindgen_test_configure!(run_in_browser);

const TABLE: &str = r#"<table class="pd-table"><thead><tr>
    <th class="blank"></th>
    <th class="pd-col-head" style="--pd-df-iloc: 0"><span class="pd-col-text">a</span></th>
    <th class="pd-col-head" style="--pd-df-iloc: 1"><span class="pd-col-text">b</span></th>
    </tr></thead><tbody>
    <tr><th class="pd-row-head" style="--pd-df-iloc: 0">0</th><td>1</td><td>2</td></tr>
    <tr><th class="pd-row-head" style="--pd-df-iloc: 1">1</th><td>3</td><td>4</td></tr>
    </tbody></table>"#;

fn surface() -> DomSurface {
    let document = web_sys::window().unwrap().document().unwrap();
    let root: HtmlElement = document.create_element("div").unwrap().dyn_into().unwrap();
    document.body().unwrap().append_child(&root).unwrap();
    let mut surface = DomSurface::new(root).unwrap();
    surface.mount(TABLE).unwrap();
    surface
}

#[wasm_bindgen_test]
fn mount_indexes_headers() {
    let surface = surface();
    assert_eq!(surface.index().column_ids(), vec![0, 1]);
    assert_eq!(surface.index().heads_of(HeadKind::Row).count(), 2);
    let measurements = surface.measure();
    assert!(measurements.row_height > 0.0);
    assert!(measurements.header_height > 0.0);
}

#[wasm_bindgen_test]
fn element_path_walks_to_root() {
    let surface = surface();
    let label: Element = surface
        .view()
        .query_selector(".pd-col-text")
        .unwrap()
        .unwrap();
    let path = surface.element_path(&label);
    assert!(path[0].classes.contains(&"pd-col-text".to_string()));
    assert_eq!(path[1].head, Some(0));
    assert_eq!(path[1].width, path[1].natural_width);
    assert!(path.last().unwrap().classes.contains(&"pd-view".to_string()));
}

#[wasm_bindgen_test]
fn flags_and_classes_reach_the_dom() {
    let mut surface = surface();
    surface.set_flag(Flag::Truncated, true);
    surface.set_head_class(1, "pd-sort-", Some("pd-sort-asc"));
    let table = surface.view().query_selector(".pd-table").unwrap().unwrap();
    assert!(table.class_list().contains(Flag::Truncated.class_name()));
    let head = surface
        .view()
        .query_selector_all("th.pd-col-head")
        .unwrap()
        .item(1)
        .unwrap()
        .dyn_into::<Element>()
        .unwrap();
    assert!(head.class_list().contains("pd-sort-asc"));
}

#[wasm_bindgen_test]
fn stylesheet_ids_resolve_through_computed_style() {
    let document = web_sys::window().unwrap().document().unwrap();
    let root: HtmlElement = document.create_element("div").unwrap().dyn_into().unwrap();
    document.body().unwrap().append_child(&root).unwrap();
    let mut surface = DomSurface::new(root).unwrap();
    surface
        .mount(
            r#"<style>th.pd-col-0 { --pd-df-iloc: 4; } th.pd-col-1 { --pd-df-iloc: 2; }</style>
            <table class="pd-table"><thead><tr>
            <th class="pd-col-head pd-col-0">a</th>
            <th class="pd-col-head pd-col-1">b</th>
            </tr></thead><tbody></tbody></table>"#,
        )
        .unwrap();
    assert_eq!(surface.index().column_ids(), vec![4, 2]);
    surface.set_head_class(1, "pd-sort-", Some("pd-sort-asc"));
    let head = surface
        .view()
        .query_selector(".pd-col-1")
        .unwrap()
        .unwrap();
    assert!(head.class_list().contains("pd-sort-asc"));
}
