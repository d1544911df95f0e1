#![cfg_attr(target_arch = "wasm32", allow(dead_code))]

//! Frame-driven state for a set of browser 3D demo scenes, and (on wasm32)
//! the glue that wires them to a canvas and the page.

pub mod config;
pub mod error;
pub mod input;
pub mod math;
pub mod nav;
pub mod particles;
pub mod scene;
pub mod scenes;
pub mod timeline;

pub use config::VizConfig;
pub use error::{Result, VizError};
pub use input::InputEvent;
pub use scene::{init, DomOp, Scene, SceneKind};

// Only compile wasm-specific code when targeting wasm32.

#[cfg(target_arch = "wasm32")]
mod wasm {
    use std::cell::RefCell;
    use std::rc::Rc;

    use wasm_bindgen::prelude::*;
    use wasm_bindgen::JsCast;

    use crate::{InputEvent, SceneKind, VizConfig, VizError};

    mod dom;
    mod events;
    mod render;

    #[wasm_bindgen(start)]
    pub fn main() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).ok();

        let window = web_sys::window().ok_or("no window")?;
        let document = window.document().ok_or("no document")?;
        let canvas = document
            .get_element_by_id("c")
            .ok_or_else(|| VizError::MissingElement("#c".into()))?
            .dyn_into::<web_sys::HtmlCanvasElement>()?;

        let kind: SceneKind = document
            .body()
            .and_then(|b| b.get_attribute("data-scene"))
            .unwrap_or_default()
            .parse()?;
        let config = match document.get_element_by_id("scene-config") {
            Some(el) => VizConfig::from_json(&el.text_content().unwrap_or_default())?,
            None => VizConfig::default(),
        };

        let viewport = render::viewport_size(&window);
        let seed = (js_sys::Math::random() * f64::from(u32::MAX)) as u64;
        let scene = Rc::new(RefCell::new(crate::scene::init(kind, &config, seed, viewport)));

        let queue = events::attach(&window, &document, &canvas)?;
        queue.borrow_mut().push(InputEvent::WallClock {
            epoch_ms: js_sys::Date::now(),
        });

        render::start(canvas, scene, queue)?;
        log::info!("{kind:?} scene running");
        Ok(())
    }
}
