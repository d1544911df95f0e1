use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, Element, HtmlElement};

use crate::scene::DomOp;

/// `"body"` addresses the document body; anything else is an element id.
fn lookup(document: &Document, id: &str) -> Option<Element> {
    if id == "body" {
        document.body().map(Into::into)
    } else {
        document.get_element_by_id(id)
    }
}

/// Apply one scene-requested change. Pages may leave out any readout, so a
/// missing element is skipped rather than treated as an error.
pub fn apply(document: &Document, op: &DomOp) -> Result<(), JsValue> {
    match op {
        DomOp::SetText { id, text } => {
            if let Some(el) = lookup(document, id) {
                el.set_text_content(Some(text));
            }
        }
        DomOp::SetStyle { id, property, value } => {
            if let Some(el) = lookup(document, id).and_then(|el| el.dyn_into::<HtmlElement>().ok()) {
                el.style().set_property(property, value)?;
            }
        }
        DomOp::SetClass { id, class, on } => {
            if let Some(el) = lookup(document, id) {
                el.class_list().toggle_with_force(class, *on)?;
            }
        }
        DomOp::Exclusive { selector, class, id } => {
            let nodes = document.query_selector_all(selector)?;
            for i in 0..nodes.length() {
                if let Some(el) = nodes.item(i).and_then(|n| n.dyn_into::<Element>().ok()) {
                    el.class_list().remove_1(class)?;
                }
            }
            if let Some(el) = lookup(document, id) {
                el.class_list().add_1(class)?;
            }
        }
        DomOp::Spawn { id, class, text } => {
            let body = document.body().ok_or("no body")?;
            let el = document.create_element("div")?;
            el.set_id(id);
            el.set_class_name(class);
            el.set_text_content(Some(text));
            body.append_child(&el)?;
        }
        DomOp::Remove { id } => {
            if let Some(el) = lookup(document, id) {
                el.remove();
            }
        }
    }
    Ok(())
}
