#![cfg(target_arch = "wasm32")]

use wasm_bindgen::JsCast;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

fn document() -> web_sys::Document {
    web_sys::window().unwrap().document().unwrap()
}

#[wasm_bindgen_test]
fn webgl2_context_available() {
    let document = document();
    let canvas = document
        .create_element("canvas")
        .unwrap()
        .dyn_into::<web_sys::HtmlCanvasElement>()
        .unwrap();
    document.body().unwrap().append_child(&canvas).unwrap();

    let gl = canvas.get_context("webgl2").unwrap();
    assert!(gl.is_some(), "WebGL2 not supported");
}

#[wasm_bindgen_test]
fn scene_names_come_from_body_attribute() {
    let body = document().body().unwrap();
    body.set_attribute("data-scene", "stellar").unwrap();
    let kind: stellar_viz::SceneKind = body.get_attribute("data-scene").unwrap().parse().unwrap();
    assert_eq!(kind, stellar_viz::SceneKind::Stellar);
}
