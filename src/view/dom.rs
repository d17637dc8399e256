//! Mount a rendered tree into the live DOM (WASM only)

use wasm_bindgen::prelude::*;
use web_sys::{Document, Element as DomElement, HtmlElement};

use super::node::{Element, Node};

/// Replace all children of `container` with `nodes`
pub fn mount(document: &Document, container: &DomElement, nodes: &[Node]) -> Result<(), JsValue> {
    container.set_inner_html("");
    for node in nodes {
        let child = build(document, node)?;
        container.append_child(&child)?;
    }
    Ok(())
}

fn build(document: &Document, node: &Node) -> Result<web_sys::Node, JsValue> {
    match node {
        Node::Text(text) => Ok(document.create_text_node(text).into()),
        Node::Element(el) => Ok(build_element(document, el)?.into()),
    }
}

fn build_element(document: &Document, el: &Element) -> Result<DomElement, JsValue> {
    let dom = document.create_element(el.tag)?;
    for class in &el.classes {
        dom.class_list().add_1(class)?;
    }
    for (name, value) in &el.attrs {
        dom.set_attribute(name, value)?;
    }
    for child in &el.children {
        dom.append_child(&build(document, child)?)?;
    }
    Ok(dom)
}

/// Focus the first element under `container` matching `selector`, if any
pub fn focus(container: &DomElement, selector: &str) {
    let target = container
        .query_selector(selector)
        .ok()
        .flatten()
        .and_then(|el| el.dyn_into::<HtmlElement>().ok());
    if let Some(el) = target {
        let _ = el.focus();
    }
}
