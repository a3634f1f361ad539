use std::{sync::Arc, time::Instant};

use anyhow::Context;
use glam::Vec2;
use imgui::{FontConfig, FontSource};
use imgui_winit_support::WinitPlatform;
use winit::{
    application::ApplicationHandler,
    dpi::LogicalSize,
    event::{ElementState, Event, KeyEvent, MouseScrollDelta, WindowEvent},
    event_loop::{ActiveEventLoop, EventLoop},
    keyboard::PhysicalKey,
    window::{CursorIcon, Window},
};

use crate::{
    catalog::ProductCatalog,
    config::ShowroomConfig,
    engine,
    environment::EnvironmentTextures,
    navigation::BrowserNavigator,
    rendering::renderer::Renderer,
    showroom::Showroom,
};

/// Pixels of trackpad scrolling that count as one wheel notch.
const PIXELS_PER_SCROLL_STEP: f32 = 50.0;

struct ImguiState {
    context: imgui::Context,
    platform: WinitPlatform,
}

/// Everything that only exists once a window does.
struct Running {
    renderer: Renderer,
    showroom: Showroom,
    catalog: Option<ProductCatalog>,
    imgui: ImguiState,
    hovering: bool,
}

struct App {
    config: ShowroomConfig,
    runtime: tokio::runtime::Runtime,
    environment_textures: Option<EnvironmentTextures>,
    navigator: BrowserNavigator,
    running: Option<Running>,
    last_frame: Instant,
}

impl App {
    fn new(config: ShowroomConfig, runtime: tokio::runtime::Runtime) -> Self {
        let environment_textures = EnvironmentTextures::load(&config);

        Self {
            config,
            runtime,
            environment_textures: Some(environment_textures),
            navigator: BrowserNavigator,
            running: None,
            last_frame: Instant::now(),
        }
    }

    fn setup_imgui(window: &Window) -> ImguiState {
        let mut context = imgui::Context::create();
        let mut platform = WinitPlatform::new(&mut context);
        platform.attach_window(
            context.io_mut(),
            window,
            imgui_winit_support::HiDpiMode::Default,
        );

        let font_size = 14.0;
        context.fonts().add_font(&[FontSource::DefaultFontData {
            config: Some(FontConfig {
                oversample_h: 1,
                pixel_snap_h: true,
                size_pixels: font_size,
                ..Default::default()
            }),
        }]);

        // Disable INI support because it's broken in the published version of imgui
        context.set_ini_filename(None);

        ImguiState { context, platform }
    }

    fn start(&mut self, event_loop: &ActiveEventLoop) -> anyhow::Result<Running> {
        let window_attributes = Window::default_attributes()
            .with_title(self.config.window.title.clone())
            .with_inner_size(LogicalSize::new(
                self.config.window.width,
                self.config.window.height,
            ));
        let window = Arc::new(
            event_loop
                .create_window(window_attributes)
                .context("Failed to create window")?,
        );

        let mut imgui = Self::setup_imgui(&window);

        let size = window.inner_size();
        let mut showroom = Showroom::new(
            self.config.clone(),
            self.runtime.handle().clone(),
            self.environment_textures.take().unwrap_or_default(),
            Vec2::new(size.width as f32, size.height as f32),
        );
        showroom.load_models();

        let renderer = pollster::block_on(Renderer::new(
            window.clone(),
            &showroom,
            &mut imgui.context,
        ))?;

        let catalog = match &self.config.catalog {
            Some(catalog_config) => Some(ProductCatalog::mount(
                catalog_config,
                self.runtime.handle().clone(),
            )),
            None => {
                log::error!("No product catalog mount configured");
                None
            }
        };

        window.request_redraw();

        Ok(Running {
            renderer,
            showroom,
            catalog,
            imgui,
            hovering: false,
        })
    }
}

impl Running {
    fn redraw(&mut self, event_loop: &ActiveEventLoop, delta_time: std::time::Duration) {
        let Running {
            renderer,
            showroom,
            catalog,
            imgui,
            ..
        } = self;

        imgui.context.io_mut().update_delta_time(delta_time);
        renderer.window.request_redraw();

        if let Err(e) = imgui
            .platform
            .prepare_frame(imgui.context.io_mut(), &renderer.window)
        {
            log::error!("Failed to prepare imgui frame: {e}");
            return;
        }

        let ui = imgui.context.new_frame();
        engine::update(showroom, catalog.as_mut(), renderer, ui);

        match renderer.render(showroom) {
            Ok(frame) => {
                renderer.finish_frame(frame, &mut imgui.context);
            }
            Err(error) => {
                // The UI frame still has to be ended before the next one starts.
                imgui.context.render();

                match error {
                    wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated => {
                        renderer.resize(renderer.size);
                    }
                    wgpu::SurfaceError::OutOfMemory => {
                        log::error!("Out of memory");
                        event_loop.exit();
                    }
                    wgpu::SurfaceError::Timeout => {
                        log::warn!("Timeout");
                    }
                    other => {
                        log::error!("Unexpected error: {:?}", other);
                    }
                }
            }
        }

        self.update_cursor();
    }

    fn update_cursor(&mut self) {
        let hovering = self.showroom.is_hovering();
        if hovering == self.hovering {
            return;
        }

        self.hovering = hovering;
        self.renderer.window.set_cursor(if hovering {
            CursorIcon::Pointer
        } else {
            CursorIcon::Default
        });
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.running.is_some() {
            return;
        }

        match self.start(event_loop) {
            Ok(running) => self.running = Some(running),
            Err(e) => {
                log::error!("Failed to start showroom: {e:#}");
                event_loop.exit();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        let Some(running) = self.running.as_mut() else {
            return;
        };

        let ui_wants_mouse = running.imgui.context.io().want_capture_mouse;
        let ui_wants_keyboard = running.imgui.context.io().want_capture_keyboard;

        match &event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                running.renderer.resize(*new_size);
                running
                    .showroom
                    .resize(Vec2::new(new_size.width as f32, new_size.height as f32));
            }
            WindowEvent::RedrawRequested => {
                let now = Instant::now();
                let delta_time = now - self.last_frame;
                self.last_frame = now;

                running.redraw(event_loop, delta_time);
            }
            WindowEvent::CursorMoved { position, .. } => {
                running
                    .showroom
                    .pointer_moved(Vec2::new(position.x as f32, position.y as f32));
            }
            WindowEvent::CursorLeft { .. } => {
                running.showroom.pointer_left();
            }
            WindowEvent::MouseInput { state, button, .. } => {
                let pressed = *state == ElementState::Pressed;
                // Releases always reach the showroom so drags started in the room end.
                if !pressed || !ui_wants_mouse {
                    running
                        .showroom
                        .mouse_button(*button, pressed, &mut self.navigator);
                }
            }
            WindowEvent::MouseWheel { delta, .. } => {
                if !ui_wants_mouse {
                    let steps = match delta {
                        MouseScrollDelta::LineDelta(_, y) => *y,
                        MouseScrollDelta::PixelDelta(position) => {
                            position.y as f32 / PIXELS_PER_SCROLL_STEP
                        }
                    };
                    running.showroom.scroll(steps);
                }
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(code),
                        state,
                        ..
                    },
                ..
            } => {
                let pressed = *state == ElementState::Pressed;
                if !pressed || !ui_wants_keyboard {
                    running.showroom.key(*code, pressed);
                }
            }
            WindowEvent::Focused(false) => {
                running.showroom.focus_lost();
            }
            _ => (),
        }

        let window = running.renderer.window.clone();
        running.imgui.platform.handle_event::<()>(
            running.imgui.context.io_mut(),
            &window,
            &Event::WindowEvent { window_id, event },
        );
    }
}

pub async fn run(config: ShowroomConfig) -> anyhow::Result<()> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to create async runtime")?;

    let event_loop = EventLoop::new().context("Failed to create event loop")?;
    let mut app = App::new(config, runtime);
    event_loop.run_app(&mut app)?;

    Ok(())
}
