//! DOM listeners that translate browser events into [`InputEvent`]s.
//!
//! Events are queued and handed to the scene at the start of the next frame,
//! so scene state is only ever touched from the frame callback.

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::{closure::Closure, JsCast, JsValue};
use web_sys::{
    Document, Element, Event, EventTarget, HtmlCanvasElement, KeyboardEvent, MouseEvent, TouchEvent, Window,
};

use crate::input::{InputEvent, Point};

pub type EventQueue = Rc<RefCell<Vec<InputEvent>>>;

/// Elements that act as page controls rather than scene clicks.
const CONTROL_SELECTOR: &str = "button, .nav-item, [data-section], [data-panel]";

fn listen<E, F>(target: &EventTarget, name: &str, mut handler: F) -> Result<(), JsValue>
where
    E: JsCast + 'static,
    F: FnMut(E) + 'static,
{
    let closure = Closure::wrap(Box::new(move |event: Event| {
        if let Ok(event) = event.dyn_into::<E>() {
            handler(event);
        }
    }) as Box<dyn FnMut(Event)>);
    target.add_event_listener_with_callback(name, closure.as_ref().unchecked_ref())?;
    closure.forget();
    Ok(())
}

fn mouse_point(e: &MouseEvent) -> Point {
    Point::new(e.client_x() as f32, e.client_y() as f32)
}

fn touch_point(e: &TouchEvent) -> Option<Point> {
    e.touches()
        .get(0)
        .map(|t| Point::new(t.client_x() as f32, t.client_y() as f32))
}

/// The control under a click, as an input event.
fn control_event(target: Option<EventTarget>) -> Option<InputEvent> {
    let el = target?.dyn_into::<Element>().ok()?.closest(CONTROL_SELECTOR).ok()??;
    if let Some(section) = el
        .get_attribute("data-section")
        .or_else(|| el.get_attribute("data-panel"))
    {
        return Some(InputEvent::Navigate(section));
    }
    let id = el.id();
    (!id.is_empty()).then_some(InputEvent::Button(id))
}

pub fn attach(window: &Window, document: &Document, canvas: &HtmlCanvasElement) -> Result<EventQueue, JsValue> {
    let queue: EventQueue = Rc::new(RefCell::new(Vec::new()));

    let q = queue.clone();
    listen(document, "mousemove", move |e: MouseEvent| {
        q.borrow_mut().push(InputEvent::PointerMove(mouse_point(&e)));
    })?;
    let q = queue.clone();
    listen(document, "mousedown", move |e: MouseEvent| {
        q.borrow_mut().push(InputEvent::PointerDown(mouse_point(&e)));
    })?;
    let q = queue.clone();
    listen(document, "mouseup", move |_: MouseEvent| {
        q.borrow_mut().push(InputEvent::PointerUp);
    })?;
    let q = queue.clone();
    listen(document, "click", move |e: MouseEvent| {
        let event = control_event(e.target()).unwrap_or_else(|| InputEvent::Click(mouse_point(&e)));
        q.borrow_mut().push(event);
    })?;
    // Forms are handled by their submit button's click.
    listen(document, "submit", |e: Event| e.prevent_default())?;

    let q = queue.clone();
    listen(document, "keydown", move |e: KeyboardEvent| {
        if e.code() == "Space" {
            e.prevent_default();
        }
        q.borrow_mut().push(InputEvent::KeyDown(e.code()));
    })?;
    let q = queue.clone();
    listen(document, "keyup", move |e: KeyboardEvent| {
        q.borrow_mut().push(InputEvent::KeyUp(e.code()));
    })?;

    let q = queue.clone();
    listen(canvas, "touchstart", move |e: TouchEvent| {
        e.prevent_default();
        if let Some(p) = touch_point(&e) {
            q.borrow_mut().push(InputEvent::TouchStart(p));
        }
    })?;
    let q = queue.clone();
    listen(canvas, "touchmove", move |e: TouchEvent| {
        e.prevent_default();
        if let Some(p) = touch_point(&e) {
            q.borrow_mut().push(InputEvent::TouchMove(p));
        }
    })?;
    let q = queue.clone();
    listen(canvas, "touchend", move |_: TouchEvent| {
        q.borrow_mut().push(InputEvent::TouchEnd);
    })?;

    let q = queue.clone();
    listen(canvas, "webglcontextlost", move |e: Event| {
        e.prevent_default();
        q.borrow_mut().push(InputEvent::ContextLost);
    })?;
    let q = queue.clone();
    listen(canvas, "webglcontextrestored", move |_: Event| {
        q.borrow_mut().push(InputEvent::ContextRestored);
    })?;

    let q = queue.clone();
    let doc = document.clone();
    listen(document, "visibilitychange", move |_: Event| {
        q.borrow_mut().push(InputEvent::Visibility { hidden: doc.hidden() });
    })?;

    let q = queue.clone();
    let canvas_for_resize = canvas.clone();
    listen(window, "resize", move |_: Event| {
        if let Some(window) = web_sys::window() {
            let (width, height) = super::render::viewport_size(&window);
            canvas_for_resize.set_width(width as u32);
            canvas_for_resize.set_height(height as u32);
            q.borrow_mut().push(InputEvent::Resize { width, height });
        }
    })?;

    Ok(queue)
}
