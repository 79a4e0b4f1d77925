mod app_settings;
mod driver;
mod links;
mod physics;
mod rendering;
mod shaders;

use std::sync::Arc;
use std::time::{Duration, Instant};

use winit::{
    event::{ElementState, Event, KeyEvent, Touch, TouchPhase, WindowEvent},
    event_loop::EventLoop,
    keyboard::{KeyCode, PhysicalKey},
    window::WindowBuilder,
};

use app_settings::AppSettings;
use driver::FrameDriver;
use rendering::{MeshRenderer, Theme};

struct State<'window> {
    window: Arc<winit::window::Window>,
    surface: wgpu::Surface<'window>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    size: winit::dpi::PhysicalSize<u32>,
    theme: Theme,
    driver: FrameDriver,
    renderer: MeshRenderer,
    // First active touch maps to the pointer; others are ignored.
    active_touch: Option<u64>,
    frame_count: u32,
    last_fps_update: Instant,
}

impl<'window> State<'window> {
    async fn new(window: Arc<winit::window::Window>, settings: AppSettings) -> Self {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            dx12_shader_compiler: Default::default(),
            flags: wgpu::InstanceFlags::default(),
            gles_minor_version: wgpu::Gles3MinorVersion::Automatic,
        });

        let surface = instance.create_surface(window.clone()).unwrap();

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .unwrap();

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    label: None,
                },
                None,
            )
            .await
            .unwrap();

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .unwrap_or(surface_caps.formats[0]);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width,
            height: size.height,
            present_mode: surface_caps.present_modes[0],
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let theme = Theme::from_name(&settings.theme);
        let renderer = MeshRenderer::new(&device, surface_format);

        let mut driver = FrameDriver::new(settings.field, size.width as f32, size.height as f32);
        driver.start();

        Self {
            window,
            surface,
            device,
            queue,
            config,
            size,
            theme,
            driver,
            renderer,
            active_touch: None,
            frame_count: 0,
            last_fps_update: Instant::now(),
        }
    }

    fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.size = new_size;
            self.config.width = new_size.width;
            self.config.height = new_size.height;
            self.surface.configure(&self.device, &self.config);
            self.driver
                .resize(new_size.width as f32, new_size.height as f32);
        }
    }

    fn input(&mut self, event: &WindowEvent) -> bool {
        match event {
            WindowEvent::CursorMoved { position, .. } => {
                self.driver.set_pointer(position.x as f32, position.y as f32);
                true
            }
            WindowEvent::CursorLeft { .. } => {
                self.driver.clear_pointer();
                true
            }
            WindowEvent::Touch(Touch {
                phase, location, id, ..
            }) => {
                match phase {
                    TouchPhase::Started => {
                        if self.active_touch.is_none() {
                            self.active_touch = Some(*id);
                        }
                        if self.active_touch == Some(*id) {
                            self.driver.set_pointer(location.x as f32, location.y as f32);
                        }
                    }
                    TouchPhase::Moved => {
                        if self.active_touch == Some(*id) {
                            self.driver.set_pointer(location.x as f32, location.y as f32);
                        }
                    }
                    TouchPhase::Ended | TouchPhase::Cancelled => {
                        if self.active_touch == Some(*id) {
                            self.active_touch = None;
                            self.driver.clear_pointer();
                        }
                    }
                }
                true
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        state: ElementState::Pressed,
                        physical_key: PhysicalKey::Code(KeyCode::KeyT),
                        ..
                    },
                ..
            } => {
                self.theme = self.theme.toggle();
                true
            }
            _ => false,
        }
    }

    fn update(&mut self) {
        if let Some(frame) = self.driver.render_frame() {
            self.renderer
                .prepare(&self.device, &self.queue, &frame, self.theme);
        }

        self.frame_count += 1;
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_fps_update);
        if elapsed >= Duration::from_millis(500) {
            let fps = self.frame_count as f64 / elapsed.as_secs_f64();
            self.window
                .set_title(&format!("Particle Mesh - FPS: {:.1}", fps));
            self.frame_count = 0;
            self.last_fps_update = now;
        }
    }

    fn render(&mut self) -> Result<(), wgpu::SurfaceError> {
        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.theme.clear_color()),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            self.renderer.render(&mut render_pass);
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }
}

fn main() {
    env_logger::init();

    let settings = AppSettings::load().unwrap_or_else(|err| {
        log::warn!("failed to load settings.toml, using defaults: {err}");
        AppSettings::default()
    });

    let event_loop = EventLoop::new().unwrap();
    let window = Arc::new(
        WindowBuilder::new()
            .with_title("Particle Mesh")
            .with_inner_size(winit::dpi::LogicalSize::new(1280, 800))
            .build(&event_loop)
            .unwrap(),
    );

    let mut state = pollster::block_on(State::new(window.clone(), settings));

    event_loop
        .run(move |event, target| {
            match event {
                Event::WindowEvent {
                    ref event,
                    window_id,
                } if window_id == state.window.id() => {
                    if !state.input(event) {
                        match event {
                            WindowEvent::CloseRequested
                            | WindowEvent::KeyboardInput {
                                event:
                                    KeyEvent {
                                        state: ElementState::Pressed,
                                        physical_key: PhysicalKey::Code(KeyCode::Escape),
                                        ..
                                    },
                                ..
                            } => target.exit(),
                            WindowEvent::Resized(physical_size) => {
                                state.resize(*physical_size);
                            }
                            WindowEvent::ScaleFactorChanged { .. } => {
                                let new_size = state.window.inner_size();
                                state.resize(new_size);
                            }
                            _ => {}
                        }
                    }
                }
                Event::AboutToWait => {
                    state.update();
                    match state.render() {
                        Ok(_) => {}
                        Err(wgpu::SurfaceError::Lost) => state.resize(state.size),
                        Err(wgpu::SurfaceError::OutOfMemory) => target.exit(),
                        Err(e) => log::error!("surface error: {e:?}"),
                    }
                    state.window.request_redraw();
                }
                _ => {}
            }
        })
        .unwrap();
}
