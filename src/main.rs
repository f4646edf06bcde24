//! Ball Pit entry point
//!
//! Handles platform-specific initialization: a fixed-period physics timer
//! plus an animation-frame render loop in the browser, a headless run natively.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_demo {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;

    use ball_pit::config::SimConfig;
    use ball_pit::consts::*;
    use ball_pit::platform::FrameStats;
    use ball_pit::renderer;
    use ball_pit::sim::{Simulation, tick};

    // Hand instance data to the page's WebGL code, if it registered a drawer
    #[wasm_bindgen(inline_js = "
        export function draw_balls(data, count) {
            if (typeof window.drawBalls === 'function') {
                window.drawBalls(data, count);
            }
        }
    ")]
    extern "C" {
        fn draw_balls(data: &js_sys::Float32Array, count: u32);
    }

    /// Demo instance holding all state
    struct Demo {
        sim: Simulation,
        frame_stats: FrameStats,
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Ball Pit starting...");

        let mut config = SimConfig::load();
        config.seed = js_sys::Date::now() as u64;

        let sim = match Simulation::configure(config) {
            Ok(sim) => sim,
            Err(e) => {
                log::error!("Invalid configuration: {}", e);
                return;
            }
        };
        log::info!("Scene ready with {} balls", sim.body_count());

        let demo = Rc::new(RefCell::new(Demo {
            sim,
            frame_stats: FrameStats::new(),
        }));

        // Physics and rendering run on separate callbacks; the event loop
        // never runs them at the same time.
        start_physics_timer(demo.clone());
        request_animation_frame(demo);

        log::info!("Ball Pit running!");
    }

    fn start_physics_timer(demo: Rc<RefCell<Demo>>) {
        let Some(window) = web_sys::window() else {
            log::error!("No window; physics timer not started");
            return;
        };
        let closure = Closure::<dyn FnMut()>::new(move || {
            tick(&mut demo.borrow_mut().sim);
        });
        if let Err(e) = window.set_interval_with_callback_and_timeout_and_arguments_0(
            closure.as_ref().unchecked_ref(),
            TICK_INTERVAL_MS,
        ) {
            log::error!("Failed to start physics timer: {:?}", e);
        }
        closure.forget();
    }

    fn request_animation_frame(demo: Rc<RefCell<Demo>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |time: f64| {
            frame(demo, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn frame(demo: Rc<RefCell<Demo>>, time: f64) {
        {
            let mut d = demo.borrow_mut();
            d.frame_stats.record(time);

            let instances = renderer::instances(&d.sim);
            let data = js_sys::Float32Array::from(renderer::instance_floats(&instances));
            draw_balls(&data, instances.len() as u32);

            update_fps(d.frame_stats.average_fps());
        }

        request_animation_frame(demo);
    }

    /// Update the FPS readout, if the page has one
    fn update_fps(fps: f64) {
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            return;
        };
        if let Some(el) = document.get_element_by_id("fps") {
            el.set_text_content(Some(&format!("FPS: {:.0}", fps)));
        }
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_demo::run();
}

#[cfg(not(target_arch = "wasm32"))]
const HEADLESS_TICKS: u64 = 1_000;

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use ball_pit::config::SimConfig;
    use ball_pit::sim::{Simulation, tick};

    env_logger::init();
    log::info!("Ball Pit (native) starting...");
    log::info!("Native mode runs headless - run with `trunk serve` for the web version");

    let mut sim = match Simulation::configure(SimConfig::load()) {
        Ok(sim) => sim,
        Err(e) => {
            log::error!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    let start_energy = sim.kinetic_energy();
    for _ in 0..HEADLESS_TICKS {
        tick(&mut sim);
    }

    let stats = sim.grid_stats();
    log::info!(
        "{} ticks: energy {:.4} -> {:.4}, momentum {:?}",
        sim.tick_count(),
        start_energy,
        sim.kinetic_energy(),
        sim.momentum()
    );
    log::info!(
        "Grid: {} occupied cells, {} entries, busiest cell holds {}",
        stats.occupied_cells,
        stats.total_entries,
        stats.max_cell_load
    );
    println!("✓ Simulated {} balls for {} ticks", sim.body_count(), sim.tick_count());
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
