use std::cell::RefCell;
use std::rc::Rc;

use glam::Mat4;
use js_sys::Float32Array;
use wasm_bindgen::{closure::Closure, JsCast, JsValue};
use web_sys::{
    Document, HtmlCanvasElement, WebGl2RenderingContext as GL, WebGlBuffer, WebGlProgram, WebGlShader,
    WebGlUniformLocation, WebGlVertexArrayObject, Window,
};

use super::dom;
use super::events::EventQueue;
use crate::error::VizError;
use crate::input::InputEvent;
use crate::particles::ParticleSystem;
use crate::scene::{DomOp, RenderView, Scene};

/// Longest step handed to the scene, so a backgrounded tab does not jump.
const MAX_FRAME_SECONDS: f32 = 0.1;
const CLOUD_OPACITY: f32 = 0.8;
const MINIMAP_CANVAS: &str = "minimap-canvas";

const VERTEX_SHADER: &str = r#"#version 300 es
layout(location = 0) in vec3 a_position;
layout(location = 1) in vec3 a_color;
layout(location = 2) in float a_size;

uniform mat4 u_model;
uniform mat4 u_view;
uniform mat4 u_projection;
uniform float u_size;
uniform float u_point_scale;
uniform float u_attenuate;
uniform float u_opacity;

out vec4 v_color;

void main() {
    vec4 eye = u_view * u_model * vec4(a_position, 1.0);
    gl_Position = u_projection * eye;
    float size = a_size * u_size;
    gl_PointSize = u_attenuate > 0.5
        ? clamp(size * u_point_scale / max(-eye.z, 0.001), 1.0, 64.0)
        : clamp(size, 1.0, 64.0);
    v_color = vec4(a_color, u_opacity);
}
"#;

const FRAGMENT_SHADER: &str = r#"#version 300 es
precision mediump float;
in vec4 v_color;
out vec4 frag;

void main() {
    vec2 d = gl_PointCoord - vec2(0.5);
    if (dot(d, d) > 0.25) discard;
    frag = v_color;
}
"#;

pub fn viewport_size(window: &Window) -> (f32, f32) {
    let dim = |v: Result<JsValue, JsValue>| v.ok().and_then(|v| v.as_f64()).unwrap_or(1.0) as f32;
    (dim(window.inner_width()), dim(window.inner_height()))
}

fn compile(gl: &GL, kind: u32, source: &str) -> Result<WebGlShader, VizError> {
    let shader = gl
        .create_shader(kind)
        .ok_or_else(|| VizError::Shader("unable to create shader".into()))?;
    gl.shader_source(&shader, source);
    gl.compile_shader(&shader);
    if gl
        .get_shader_parameter(&shader, GL::COMPILE_STATUS)
        .as_bool()
        .unwrap_or(false)
    {
        Ok(shader)
    } else {
        Err(VizError::Shader(gl.get_shader_info_log(&shader).unwrap_or_default()))
    }
}

fn link(gl: &GL) -> Result<WebGlProgram, VizError> {
    let vs = compile(gl, GL::VERTEX_SHADER, VERTEX_SHADER)?;
    let fs = compile(gl, GL::FRAGMENT_SHADER, FRAGMENT_SHADER)?;
    let program = gl
        .create_program()
        .ok_or_else(|| VizError::Shader("unable to create program".into()))?;
    gl.attach_shader(&program, &vs);
    gl.attach_shader(&program, &fs);
    gl.link_program(&program);
    if gl
        .get_program_parameter(&program, GL::LINK_STATUS)
        .as_bool()
        .unwrap_or(false)
    {
        Ok(program)
    } else {
        Err(VizError::Shader(gl.get_program_info_log(&program).unwrap_or_default()))
    }
}

struct Uniforms {
    model: Option<WebGlUniformLocation>,
    view: Option<WebGlUniformLocation>,
    projection: Option<WebGlUniformLocation>,
    size: Option<WebGlUniformLocation>,
    point_scale: Option<WebGlUniformLocation>,
    attenuate: Option<WebGlUniformLocation>,
    opacity: Option<WebGlUniformLocation>,
}

/// Draws particle clouds and markers as round, additively blended points.
pub struct PointRenderer {
    gl: GL,
    program: WebGlProgram,
    vao: WebGlVertexArrayObject,
    buffers: [WebGlBuffer; 3],
    uniforms: Uniforms,
}

impl PointRenderer {
    pub fn new(gl: GL) -> Result<Self, VizError> {
        let program = link(&gl)?;
        let vao = gl
            .create_vertex_array()
            .ok_or_else(|| VizError::Shader("unable to create vertex array".into()))?;
        gl.bind_vertex_array(Some(&vao));

        let mut buffers = Vec::with_capacity(3);
        for (location, components) in [(0u32, 3), (1, 3), (2, 1)] {
            let buffer = gl
                .create_buffer()
                .ok_or_else(|| VizError::Shader("unable to create buffer".into()))?;
            gl.bind_buffer(GL::ARRAY_BUFFER, Some(&buffer));
            gl.enable_vertex_attrib_array(location);
            gl.vertex_attrib_pointer_with_i32(location, components, GL::FLOAT, false, 0, 0);
            buffers.push(buffer);
        }
        let buffers: [WebGlBuffer; 3] = buffers
            .try_into()
            .map_err(|_| VizError::Shader("vertex buffers".into()))?;

        let uniform = |name: &str| gl.get_uniform_location(&program, name);
        let uniforms = Uniforms {
            model: uniform("u_model"),
            view: uniform("u_view"),
            projection: uniform("u_projection"),
            size: uniform("u_size"),
            point_scale: uniform("u_point_scale"),
            attenuate: uniform("u_attenuate"),
            opacity: uniform("u_opacity"),
        };

        gl.enable(GL::BLEND);
        gl.blend_func(GL::SRC_ALPHA, GL::ONE);
        gl.disable(GL::DEPTH_TEST);

        Ok(Self {
            gl,
            program,
            vao,
            buffers,
            uniforms,
        })
    }

    fn upload(&self, index: usize, data: &[f32]) {
        self.gl.bind_buffer(GL::ARRAY_BUFFER, Some(&self.buffers[index]));
        self.gl
            .buffer_data_with_array_buffer_view(GL::ARRAY_BUFFER, &Float32Array::from(data), GL::DYNAMIC_DRAW);
    }

    fn draw_cloud(&self, cloud: &ParticleSystem) {
        if !cloud.visible || cloud.is_empty() {
            return;
        }
        let gl = &self.gl;
        self.upload(0, cloud.positions());
        self.upload(1, cloud.colors());
        self.upload(2, cloud.sizes());
        gl.uniform_matrix4fv_with_f32_array(self.uniforms.model.as_ref(), false, &cloud.model_matrix().to_cols_array());
        gl.uniform1f(self.uniforms.size.as_ref(), cloud.point_size);
        gl.uniform1f(self.uniforms.opacity.as_ref(), CLOUD_OPACITY);
        gl.draw_arrays(GL::POINTS, 0, cloud.len() as i32);
    }

    /// Draw `frame` with the given camera. `perspective` selects distance
    /// attenuation of point sizes.
    pub fn draw(&self, frame: &RenderView<'_>, view: Mat4, projection: Mat4, perspective: bool) {
        let gl = &self.gl;
        let (w, h) = (gl.drawing_buffer_width(), gl.drawing_buffer_height());
        gl.viewport(0, 0, w, h);
        let [r, g, b, a] = frame.clear_color;
        gl.clear_color(r, g, b, a);
        gl.clear(GL::COLOR_BUFFER_BIT | GL::DEPTH_BUFFER_BIT);

        gl.use_program(Some(&self.program));
        gl.bind_vertex_array(Some(&self.vao));
        gl.uniform_matrix4fv_with_f32_array(self.uniforms.view.as_ref(), false, &view.to_cols_array());
        gl.uniform_matrix4fv_with_f32_array(self.uniforms.projection.as_ref(), false, &projection.to_cols_array());
        // Pixels per world unit at unit depth.
        gl.uniform1f(self.uniforms.point_scale.as_ref(), h as f32 * projection.y_axis.y * 0.5);
        gl.uniform1f(self.uniforms.attenuate.as_ref(), if perspective { 1.0 } else { 0.0 });

        for cloud in &frame.clouds {
            self.draw_cloud(cloud);
        }

        gl.uniform_matrix4fv_with_f32_array(self.uniforms.model.as_ref(), false, &Mat4::IDENTITY.to_cols_array());
        gl.uniform1f(self.uniforms.size.as_ref(), 1.0);
        for marker in &frame.markers {
            self.upload(0, &marker.position.to_array());
            self.upload(1, &marker.color);
            self.upload(2, &[marker.size]);
            gl.uniform1f(self.uniforms.opacity.as_ref(), marker.opacity);
            gl.draw_arrays(GL::POINTS, 0, 1);
        }
    }
}

fn context(canvas: &HtmlCanvasElement) -> Result<GL, JsValue> {
    Ok(canvas
        .get_context("webgl2")?
        .ok_or_else(|| VizError::Unsupported("WebGL2".into()))?
        .dyn_into()?)
}

fn minimap_context(document: &Document) -> Option<GL> {
    let canvas = document
        .get_element_by_id(MINIMAP_CANVAS)?
        .dyn_into::<HtmlCanvasElement>()
        .ok()?;
    context(&canvas).ok()
}

fn report(document: &Document, err: &VizError) {
    log::error!("{err}");
    for op in [
        DomOp::text("error-text", format!("Rendering error: {err}")),
        DomOp::class("error-message", "hidden", false),
    ] {
        dom::apply(document, &op).ok();
    }
}

/// Per-frame driver: feeds queued input to the scene, steps it, draws it and
/// applies the DOM changes it asks for.
struct FrameLoop {
    document: Document,
    scene: Rc<RefCell<Box<dyn Scene>>>,
    queue: EventQueue,
    gl: GL,
    main: Option<PointRenderer>,
    minimap: Option<PointRenderer>,
    last: f64,
}

impl FrameLoop {
    fn rebuild(&mut self) {
        match PointRenderer::new(self.gl.clone()) {
            Ok(renderer) => self.main = Some(renderer),
            Err(err) => {
                self.main = None;
                report(&self.document, &err);
            }
        }
        self.minimap = minimap_context(&self.document).and_then(|gl| PointRenderer::new(gl).ok());
    }

    fn tick(&mut self, now: f64) {
        let dt = (((now - self.last) / 1000.0) as f32).clamp(0.0, MAX_FRAME_SECONDS);
        self.last = now;

        let events: Vec<InputEvent> = self.queue.borrow_mut().drain(..).collect();
        let restored = events.contains(&InputEvent::ContextRestored);
        let ops = {
            let Ok(mut scene) = self.scene.try_borrow_mut() else {
                return;
            };
            for event in &events {
                scene.handle(event);
            }
            if scene.is_running() {
                scene.update(dt);
            }
            scene.drain_dom()
        };
        if restored {
            self.rebuild();
        }

        let scene = self.scene.borrow();
        if scene.is_running() {
            let frame = scene.render_view();
            if let Some(renderer) = &self.main {
                renderer.draw(&frame, frame.view, frame.projection, true);
            }
            if let (Some(renderer), Some((view, projection))) = (&self.minimap, scene.inset_view()) {
                renderer.draw(&frame, view, projection, false);
            }
        }

        for op in &ops {
            if let Err(err) = dom::apply(&self.document, op) {
                log::warn!("DOM update {op:?} failed: {err:?}");
            }
        }
    }
}

/// Size the canvas and run the scene on `request_animation_frame` until the
/// page unloads.
pub fn start(canvas: HtmlCanvasElement, scene: Rc<RefCell<Box<dyn Scene>>>, queue: EventQueue) -> Result<(), JsValue> {
    let window = web_sys::window().ok_or("no window")?;
    let document = window.document().ok_or("no document")?;
    let (w, h) = viewport_size(&window);
    canvas.set_width(w as u32);
    canvas.set_height(h as u32);

    let gl = context(&canvas)?;
    let main = match PointRenderer::new(gl.clone()) {
        Ok(renderer) => Some(renderer),
        Err(err) => {
            report(&document, &err);
            None
        }
    };
    let minimap = minimap_context(&document).and_then(|gl| PointRenderer::new(gl).ok());
    let last = window.performance().map(|p| p.now()).unwrap_or_default();

    let teardown = {
        let scene = scene.clone();
        Closure::wrap(Box::new(move || {
            if let Ok(mut scene) = scene.try_borrow_mut() {
                scene.teardown();
            }
        }) as Box<dyn FnMut()>)
    };
    window.add_event_listener_with_callback("beforeunload", teardown.as_ref().unchecked_ref())?;
    teardown.forget();

    let mut frame_loop = FrameLoop {
        document,
        scene,
        queue,
        gl,
        main,
        minimap,
        last,
    };

    // `f` holds the animation-frame closure so it can re-request itself.
    let f: Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>> = Rc::new(RefCell::new(None));
    let g = f.clone();
    *g.borrow_mut() = Some(Closure::wrap(Box::new(move |now: f64| {
        frame_loop.tick(now);

        if let (Some(window), Some(next)) = (web_sys::window(), f.borrow().as_ref()) {
            if let Err(err) = window.request_animation_frame(next.as_ref().unchecked_ref()) {
                log::error!("request_animation_frame failed: {err:?}");
            }
        }
    }) as Box<dyn FnMut(f64)>));

    if let Some(first) = g.borrow().as_ref() {
        window.request_animation_frame(first.as_ref().unchecked_ref())?;
    }
    Ok(())
}
