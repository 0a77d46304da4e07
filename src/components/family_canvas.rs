use std::cell::{Cell, RefCell};
use std::rc::Rc;

use rand::SeedableRng;
use rand::rngs::SmallRng;
use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use web_sys::{
    CanvasRenderingContext2d, Event, EventTarget, HtmlCanvasElement, KeyboardEvent, MouseEvent,
    WheelEvent, Window,
};
use yew::prelude::*;

use crate::config::SceneConfig;
use crate::error::MountError;
use crate::model::{DATASET, Palette, Point, Theme};
use crate::render::{self, Frame};
use crate::scene::{Scene, Viewport, update_hover};
use crate::state::Camera;
use crate::timer::RepeatingTimeout;
use crate::util::{now_ms, set_body_class};

#[derive(Properties, PartialEq, Clone)]
pub struct FamilyCanvasProps {
    pub theme: Theme,
}

#[function_component(FamilyCanvas)]
pub fn family_canvas(props: &FamilyCanvasProps) -> Html {
    let canvas_ref = use_node_ref();
    let camera = use_mut_ref(Camera::default);
    let hovered = use_mut_ref(|| None::<usize>);
    let pointer = use_mut_ref(|| None::<Point>);
    let palette = use_mut_ref(|| props.theme.palette());

    // Effect: theme → palette read by the frame loop
    {
        let palette = palette.clone();
        let theme = props.theme;
        use_effect_with(theme, move |_| {
            *palette.borrow_mut() = theme.palette();
            || ()
        });
    }
    // Mount effect (scene, frame loop, particle timers, listeners)
    {
        let canvas_ref = canvas_ref.clone();
        let shared = Shared {
            camera: camera.clone(),
            hovered: hovered.clone(),
            pointer: pointer.clone(),
            palette: palette.clone(),
        };
        use_effect_with((), move |_| {
            let mounted = match mount(&canvas_ref, shared) {
                Ok(m) => Some(m),
                Err(e) => {
                    log::error!("family canvas not mounted: {e}");
                    None
                }
            };
            move || {
                if let Some(m) = mounted {
                    m.teardown();
                }
            }
        });
    }

    html! { <canvas ref={canvas_ref} class="family-canvas"></canvas> }
}

/// View state handed to every callback; the camera is the only writer of its transforms.
#[derive(Clone)]
struct Shared {
    camera: Rc<RefCell<Camera>>,
    hovered: Rc<RefCell<Option<usize>>>,
    /// Last pointer position over the page, in CSS pixels.
    pointer: Rc<RefCell<Option<Point>>>,
    palette: Rc<RefCell<Palette>>,
}

struct Listener {
    target: EventTarget,
    event: &'static str,
    closure: Closure<dyn FnMut(Event)>,
}

type FrameCell = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;

/// Everything registered at mount; `teardown` releases all of it.
struct Mounted {
    window: Window,
    scene: Rc<RefCell<Scene>>,
    listeners: Vec<Listener>,
    timers: Vec<RepeatingTimeout>,
    raf_id: Rc<Cell<Option<i32>>>,
    frame: FrameCell,
}

impl Mounted {
    fn listen(
        &mut self,
        target: &EventTarget,
        event: &'static str,
        f: impl FnMut(Event) + 'static,
    ) -> Result<(), MountError> {
        let closure = Closure::wrap(Box::new(f) as Box<dyn FnMut(Event)>);
        target
            .add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())
            .map_err(|_| MountError::Listener(event))?;
        self.listeners.push(Listener {
            target: target.clone(),
            event,
            closure,
        });
        Ok(())
    }

    fn teardown(self) {
        for l in &self.listeners {
            let _ = l
                .target
                .remove_event_listener_with_callback(l.event, l.closure.as_ref().unchecked_ref());
        }
        if let Some(id) = self.raf_id.take() {
            let _ = self.window.cancel_animation_frame(id);
        }
        self.frame.borrow_mut().take();
        for t in &self.timers {
            t.cancel(&self.window);
        }
        self.scene.borrow_mut().stop_particles();
        set_body_class("dragging", false);
        log::info!(
            "family canvas torn down ({} listeners, {} particle timers)",
            self.listeners.len(),
            self.timers.len()
        );
    }
}

fn mount(canvas_ref: &NodeRef, shared: Shared) -> Result<Mounted, MountError> {
    let window = web_sys::window().ok_or(MountError::NoWindow)?;
    window.document().ok_or(MountError::NoDocument)?;
    let canvas: HtmlCanvasElement = canvas_ref.cast().ok_or(MountError::NoCanvas)?;
    let ctx = canvas
        .get_context("2d")
        .ok()
        .flatten()
        .and_then(|c| c.dyn_into::<CanvasRenderingContext2d>().ok())
        .ok_or(MountError::NoContext)?;

    let cfg = SceneConfig::default();
    let width = window
        .inner_width()
        .ok()
        .and_then(|v| v.as_f64())
        .unwrap_or(0.0);
    let height = window
        .inner_height()
        .ok()
        .and_then(|v| v.as_f64())
        .unwrap_or(0.0);
    let viewport = Viewport::sanitized(width, height, &cfg);
    let ratio = render::pixel_ratio(window.device_pixel_ratio());
    canvas.set_width((viewport.width * ratio).round() as u32);
    canvas.set_height((viewport.height * ratio).round() as u32);
    let _ = canvas.set_attribute(
        "style",
        &format!("width:{}px;height:{}px", viewport.width, viewport.height),
    );

    let seed = (js_sys::Math::random() * u64::MAX as f64) as u64;
    let scene = Scene::build(
        &DATASET,
        viewport,
        &cfg,
        &mut SmallRng::seed_from_u64(seed),
    );
    log::info!(
        "scene built: {} trees, {} elements in {}x{} (seed {seed})",
        scene.groups.len(),
        scene
            .groups
            .iter()
            .map(|g| g.element_ids().count())
            .sum::<usize>(),
        viewport.width,
        viewport.height
    );

    let mut mounted = Mounted {
        window: window.clone(),
        scene: Rc::new(RefCell::new(scene)),
        listeners: Vec::new(),
        timers: Vec::new(),
        raf_id: Rc::new(Cell::new(None)),
        frame: Rc::new(RefCell::new(None)),
    };
    if let Err(e) = wire(&mut mounted, &canvas, ctx, ratio, shared) {
        mounted.teardown();
        return Err(e);
    }
    Ok(mounted)
}

fn wire(
    m: &mut Mounted,
    canvas: &HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    ratio: f64,
    shared: Shared,
) -> Result<(), MountError> {
    let window = m.window.clone();
    let viewport = m.scene.borrow().viewport;
    start_frame_loop(m, ctx, viewport, ratio, &shared)?;
    start_particle_timers(m)?;

    let canvas_target: &EventTarget = canvas.as_ref();
    let window_target: &EventTarget = window.as_ref();

    {
        let camera = shared.camera.clone();
        m.listen(canvas_target, "mousedown", move |e| {
            let Some(e) = e.dyn_ref::<MouseEvent>() else {
                return;
            };
            let at = Point::new(e.client_x() as f64, e.client_y() as f64);
            if camera.borrow_mut().pointer_down(e.button(), at, e.time_stamp()) {
                set_body_class("dragging", true);
            }
        })?;
    }
    {
        let camera = shared.camera.clone();
        let pointer = shared.pointer.clone();
        m.listen(window_target, "mousemove", move |e| {
            let Some(e) = e.dyn_ref::<MouseEvent>() else {
                return;
            };
            let at = Point::new(e.client_x() as f64, e.client_y() as f64);
            *pointer.borrow_mut() = Some(at);
            let mut cam = camera.borrow_mut();
            if cam.is_dragging() {
                cam.pointer_move(at, e.time_stamp());
            }
        })?;
    }
    {
        let camera = shared.camera.clone();
        m.listen(window_target, "mouseup", move |e| {
            let Some(e) = e.dyn_ref::<MouseEvent>() else {
                return;
            };
            if e.button() == 0 {
                camera.borrow_mut().pointer_up(e.time_stamp());
                set_body_class("dragging", false);
            }
        })?;
    }
    {
        let hovered = shared.hovered.clone();
        let pointer = shared.pointer.clone();
        m.listen(canvas_target, "mouseleave", move |_e| {
            pointer.borrow_mut().take();
            update_hover(&mut hovered.borrow_mut(), None);
        })?;
    }
    {
        let camera = shared.camera.clone();
        m.listen(canvas_target, "wheel", move |e| {
            e.prevent_default();
            let Some(e) = e.dyn_ref::<WheelEvent>() else {
                return;
            };
            let cursor = Point::new(e.offset_x() as f64, e.offset_y() as f64);
            camera.borrow_mut().wheel(e.delta_y(), cursor);
        })?;
    }
    m.listen(canvas_target, "contextmenu", |e| e.prevent_default())?;
    {
        let camera = shared.camera.clone();
        let center = Point::new(viewport.width * 0.5, viewport.height * 0.5);
        m.listen(window_target, "keydown", move |e| {
            let Some(e) = e.dyn_ref::<KeyboardEvent>() else {
                return;
            };
            let mut cam = camera.borrow_mut();
            if cam.is_dragging() {
                return;
            }
            match e.key().as_str() {
                "+" | "=" => {
                    let step = cam.config().zoom_in_step;
                    cam.zoom_about(step, center);
                }
                "-" | "_" => {
                    let step = cam.config().zoom_out_step;
                    cam.zoom_about(step, center);
                }
                "0" => cam.recenter(),
                _ => {}
            }
        })?;
    }
    log::info!("family canvas mounted ({} listeners)", m.listeners.len());
    Ok(())
}

/// One camera step, hover refresh and draw per animation frame, until teardown.
/// Hover follows the camera, so a glide or zoom under a still pointer updates it.
fn start_frame_loop(
    m: &mut Mounted,
    ctx: CanvasRenderingContext2d,
    viewport: Viewport,
    ratio: f64,
    shared: &Shared,
) -> Result<(), MountError> {
    let window = m.window.clone();
    let raf_id = m.raf_id.clone();
    let frame_self = m.frame.clone();
    let scene = m.scene.clone();
    let shared = shared.clone();
    *m.frame.borrow_mut() = Some(Closure::wrap(Box::new(move |now: f64| {
        let transform = shared.camera.borrow_mut().step();
        {
            let scene = scene.borrow();
            let under = scene.hover_at(transform, *shared.pointer.borrow());
            update_hover(&mut shared.hovered.borrow_mut(), under);
            render::draw(
                &ctx,
                &Frame {
                    scene: &scene,
                    transform,
                    hovered: *shared.hovered.borrow(),
                    palette: *shared.palette.borrow(),
                    now,
                    width: viewport.width,
                    height: viewport.height,
                    pixel_ratio: ratio,
                },
            );
        }
        if let Some(cb) = frame_self.borrow().as_ref() {
            if let Ok(id) = window.request_animation_frame(cb.as_ref().unchecked_ref()) {
                raf_id.set(Some(id));
            }
        }
    }) as Box<dyn FnMut(f64)>));
    let id = {
        let frame = m.frame.borrow();
        let cb = frame.as_ref().ok_or(MountError::Listener("animation frame"))?;
        m.window
            .request_animation_frame(cb.as_ref().unchecked_ref())
            .map_err(|_| MountError::Listener("animation frame"))?
    };
    m.raf_id.set(Some(id));
    Ok(())
}

/// One self-rescheduling timeout per particle, staggered by slot.
fn start_particle_timers(m: &mut Mounted) -> Result<(), MountError> {
    let (keys, period) = {
        let scene = m.scene.borrow();
        (scene.particle_keys(), scene.particles.period_ms())
    };
    for key in keys {
        let delay = m
            .scene
            .borrow()
            .particle(key)
            .map(|p| p.delay_ms)
            .unwrap_or_default();
        let scene = m.scene.clone();
        let timer = RepeatingTimeout::start(
            &m.window,
            delay.round() as i32,
            period.round() as i32,
            move || {
                if let Some(p) = scene.borrow_mut().particle_mut(key) {
                    p.restart(now_ms());
                }
            },
        )?;
        m.timers.push(timer);
    }
    log::debug!("{} particle timers scheduled", m.timers.len());
    Ok(())
}
