//! DOM surface (wasm32 only).
//!
//! Builds a `pd-view` scroll region and a `pd-footer` under the host
//! element. Headers are looked up in document order right after each mount
//! so their positions line up with the [`MarkupIndex`].

use js_sys::Reflect;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Element, HtmlElement};

use super::backend::{Flag, Surface};
use super::markup::{
    MarkupIndex, COL_HEAD_CLASS, ILOC_PROPERTY, ROW_HEAD_CLASS, TABLE_CLASS, VIEW_CLASS,
};
use crate::error::{PdviewError, Result};
use crate::layout::Measurements;
use crate::viewer::ElementInfo;

/// Attribute recording a header's width right after mount.
const NATURAL_WIDTH_ATTR: &str = "data-pd-width";

pub struct DomSurface {
    root: HtmlElement,
    view: HtmlElement,
    footer: HtmlElement,
    heads: Vec<HtmlElement>,
    index: MarkupIndex,
}

fn create_div(document: &web_sys::Document, class: &str) -> Result<HtmlElement> {
    let element = document
        .create_element("div")
        .map_err(|_| PdviewError::Surface("cannot create element".into()))?;
    element.set_class_name(class);
    element
        .dyn_into::<HtmlElement>()
        .map_err(|_| PdviewError::Surface("not an HtmlElement".into()))
}

fn f64_prop(element: &HtmlElement, name: &str) -> Option<f64> {
    Reflect::get(element.as_ref(), &JsValue::from_str(name))
        .ok()
        .and_then(|v| v.as_f64())
}

/// Logical id of a header: its inline `--pd-df-iloc`, else the value the
/// stylesheet resolves for it.
fn iloc_of(head: &HtmlElement) -> Option<u32> {
    let inline = head
        .style()
        .get_property_value(ILOC_PROPERTY)
        .ok()
        .filter(|v| !v.trim().is_empty());
    inline
        .or_else(|| {
            web_sys::window()?
                .get_computed_style(head)
                .ok()??
                .get_property_value(ILOC_PROPERTY)
                .ok()
        })
        .and_then(|v| v.trim().parse().ok())
}

impl DomSurface {
    /// Build the view structure under `root`, replacing its children.
    pub fn new(root: HtmlElement) -> Result<Self> {
        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or_else(|| PdviewError::Surface("no document".into()))?;
        root.set_inner_html("");
        let view = create_div(&document, VIEW_CLASS)?;
        let footer = create_div(&document, "pd-footer")?;
        root.append_child(&view)
            .map_err(|_| PdviewError::Surface("cannot attach view".into()))?;
        root.append_child(&footer)
            .map_err(|_| PdviewError::Surface("cannot attach footer".into()))?;
        Ok(Self {
            root,
            view,
            footer,
            heads: Vec::new(),
            index: MarkupIndex::default(),
        })
    }

    pub fn root(&self) -> &HtmlElement {
        &self.root
    }

    /// The scroll region.
    pub fn view(&self) -> &HtmlElement {
        &self.view
    }

    pub fn scroll_top(&self) -> f64 {
        f64_prop(&self.view, "scrollTop").unwrap_or_else(|| f64::from(self.view.scroll_top()))
    }

    pub fn scroll_left(&self) -> f64 {
        f64_prop(&self.view, "scrollLeft").unwrap_or_else(|| f64::from(self.view.scroll_left()))
    }

    /// Describe the ancestors of `target` up to the root, innermost first.
    pub fn element_path(&self, target: &Element) -> Vec<ElementInfo> {
        let mut path = Vec::new();
        let mut current = Some(target.clone());
        while let Some(element) = current {
            if element.is_same_node(Some(self.root.as_ref())) {
                break;
            }
            let head = self
                .heads
                .iter()
                .position(|h| element.is_same_node(Some(h.as_ref())));
            let html = element.dyn_ref::<HtmlElement>();
            let width = html.map(|h| f64::from(h.offset_width()));
            let natural_width = element
                .get_attribute(NATURAL_WIDTH_ATTR)
                .and_then(|v| v.parse().ok());
            path.push(ElementInfo {
                classes: element
                    .class_name()
                    .split_whitespace()
                    .map(str::to_string)
                    .collect(),
                head,
                width: head.and(width),
                natural_width: head.and(natural_width),
            });
            current = element.parent_element();
        }
        path
    }

    fn table(&self) -> Option<Element> {
        self.view
            .query_selector(&format!(".{TABLE_CLASS}"))
            .ok()
            .flatten()
    }

    fn outer_height(&self, selector: &str) -> f64 {
        self.view
            .query_selector(selector)
            .ok()
            .flatten()
            .and_then(|e| e.dyn_into::<HtmlElement>().ok())
            .map(|e| f64::from(e.offset_height()))
            .unwrap_or(0.0)
    }
}

impl Surface for DomSurface {
    fn mount(&mut self, markup: &str) -> Result<()> {
        self.index = MarkupIndex::parse(markup)?;
        self.view.set_inner_html(markup);

        let selector = format!("th.{COL_HEAD_CLASS}, th.{ROW_HEAD_CLASS}");
        let nodes = self
            .view
            .query_selector_all(&selector)
            .map_err(|_| PdviewError::Surface("header query failed".into()))?;
        self.heads = (0..nodes.length())
            .filter_map(|i| nodes.item(i))
            .filter_map(|n| n.dyn_into::<HtmlElement>().ok())
            .filter(|e| iloc_of(e).is_some())
            .collect();
        if self.heads.len() != self.index.heads().len() {
            tracing::warn!(
                dom = self.heads.len(),
                indexed = self.index.heads().len(),
                "header count mismatch after mount"
            );
        }
        for head in &self.heads {
            let _ = head.set_attribute(NATURAL_WIDTH_ATTR, &head.offset_width().to_string());
        }
        Ok(())
    }

    fn index(&self) -> &MarkupIndex {
        &self.index
    }

    fn measure(&self) -> Measurements {
        let row_height = self.outer_height("tbody > tr");
        let header_height = self.outer_height("thead");
        #[allow(clippy::cast_precision_loss)]
        let body_rows = self.index.body_rows() as f64;
        let screen_height = web_sys::window()
            .and_then(|w| w.screen().ok())
            .and_then(|s| s.height().ok())
            .map(f64::from)
            .unwrap_or(0.0);
        Measurements {
            row_height,
            header_height,
            table_outer_height: header_height + body_rows * row_height,
            scrollbar_height: f64::from(self.view.offset_height() - self.view.client_height())
                .max(0.0),
            view_height: self.view.get_bounding_client_rect().height(),
            screen_height,
        }
    }

    fn set_head_class(&mut self, position: usize, family: &str, class: Option<&str>) {
        let Some(head) = self.heads.get(position) else {
            return;
        };
        let list = head.class_list();
        let stale: Vec<String> = (0..list.length())
            .filter_map(|i| list.item(i))
            .filter(|c| c.starts_with(family))
            .collect();
        for c in stale {
            let _ = list.remove_1(&c);
        }
        if let Some(class) = class {
            let _ = list.add_1(class);
        }
    }

    fn toggle_head_class(&mut self, position: usize, class: &str) -> bool {
        self.heads
            .get(position)
            .and_then(|h| h.class_list().toggle(class).ok())
            .unwrap_or(false)
    }

    fn set_head_width(&mut self, position: usize, width: Option<u32>) {
        let Some(head) = self.heads.get(position) else {
            return;
        };
        let style = head.style();
        match width {
            Some(w) => {
                let _ = style.set_property("width", &format!("{w}px"));
                let _ = style.set_property("min-width", &format!("{w}px"));
            }
            None => {
                let _ = style.remove_property("width");
                let _ = style.remove_property("min-width");
            }
        }
    }

    fn set_flag(&mut self, flag: Flag, on: bool) {
        let target = if flag.on_table() {
            self.table()
        } else {
            Some(self.root.clone().into())
        };
        if let Some(target) = target {
            let _ = target
                .class_list()
                .toggle_with_force(flag.class_name(), on);
        }
    }

    fn set_style_var(&mut self, name: &str, value: &str) {
        let _ = self.view.style().set_property(name, value);
    }

    fn set_scroll(&mut self, top: f64, left: f64) {
        let _ = Reflect::set(self.view.as_ref(), &"scrollTop".into(), &top.into());
        let _ = Reflect::set(self.view.as_ref(), &"scrollLeft".into(), &left.into());
    }

    fn set_view_height(&mut self, height: f64) {
        let _ = self.view.style().set_property("height", &format!("{height}px"));
    }

    fn set_footer(&mut self, text: &str) {
        self.footer.set_text_content(Some(text));
    }
}
