use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use id_arena::Arena;
use wgpu::CommandEncoderDescriptor;
use winit::{dpi::PhysicalSize, window::Window};

use crate::{
    asset_pipeline::texture_image::TextureImage,
    catalog::images::TextureUploader,
    rendering::{
        global_uniform::GlobalUniformState,
        imgui_renderer::{create_imgui_renderer, ImguiRendererState},
        instance::gather_instances,
        passes::scene_pass::{ScenePass, SceneTextureViews},
        render_common::RenderCommon,
        render_material_manager::RenderMaterialManager,
        render_model::{render_model_instances, RenderModel, RenderModelId},
        shader_loader::{PipelineCache, PipelineCacheBuilder},
        texture::DepthTexture,
    },
    scene_graph::scene_model::SceneModelId,
    showroom::Showroom,
};

/// A frame whose scene pass has been recorded. Handed back to [`Renderer::finish_frame`]
/// once the UI has been built, so imgui draws on top before presenting.
pub struct FrameResult {
    output: wgpu::SurfaceTexture,
    view: wgpu::TextureView,
    encoder: wgpu::CommandEncoder,
}

pub struct Renderer {
    pub window: Arc<Window>,
    pub size: PhysicalSize<u32>,

    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,

    common: Arc<RenderCommon>,
    depth_texture: DepthTexture,
    pipeline_cache: PipelineCache,
    scene_pass: ScenePass,

    render_models: Arena<RenderModel>,
    model_map: HashMap<SceneModelId, RenderModelId>,
    material_manager: RenderMaterialManager,

    imgui_renderer: ImguiRendererState,
    start_time: Instant,
}

impl Renderer {
    pub async fn new(
        window: Arc<Window>,
        showroom: &Showroom,
        imgui_context: &mut imgui::Context,
    ) -> anyhow::Result<Renderer> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());
        let surface = instance
            .create_surface(window.clone())
            .context("Failed to create surface")?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("No suitable graphics adapter")?;

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                label: None,
                memory_hints: Default::default(),
                trace: wgpu::Trace::Off,
            })
            .await
            .context("Failed to create device")?;

        let common = RenderCommon::new(
            &device,
            &adapter,
            &surface,
            size,
            &showroom.camera,
            &showroom.environment.lighting,
        )?;
        let common = Arc::new(common);

        let depth_texture = {
            let config = common
                .output_surface_config
                .read()
                .map_err(|_| anyhow::anyhow!("Surface configuration lock poisoned"))?;
            DepthTexture::new(&device, &config, "Depth texture")
        };

        let material_manager = RenderMaterialManager::new(&device, &queue);

        let mut cache_builder = PipelineCacheBuilder::new();
        let scene_pass =
            ScenePass::create(&device, common.clone(), &mut cache_builder, &material_manager)?;
        let pipeline_cache = cache_builder.build(&device)?;

        let imgui_renderer =
            create_imgui_renderer(&device, &queue, common.surface_format(), imgui_context);

        Ok(Self {
            window,
            size,
            surface,
            device,
            queue,
            common,
            depth_texture,
            pipeline_cache,
            scene_pass,
            render_models: Arena::new(),
            model_map: HashMap::new(),
            material_manager,
            imgui_renderer,
            start_time: Instant::now(),
        })
    }

    pub fn resize(&mut self, new_size: PhysicalSize<u32>) {
        if new_size.width == 0 || new_size.height == 0 {
            return;
        }

        let mut config = match self.common.output_surface_config.write() {
            Ok(config) => config,
            Err(poisoned) => poisoned.into_inner(),
        };

        self.size = new_size;
        config.width = new_size.width;
        config.height = new_size.height;
        self.surface.configure(&self.device, &config);
        self.depth_texture.resize(&self.device, &config);
    }

    /// Uploads scene models and materials added since the last frame.
    pub fn sync_scene(&mut self, showroom: &Showroom) {
        self.material_manager.sync(&showroom.materials);

        for (scene_model_id, scene_model) in showroom.scene.models.iter() {
            if self.model_map.contains_key(&scene_model_id) {
                continue;
            }

            let render_model = RenderModel::from_model(&self.device, &scene_model.model);
            let render_model_id = self.render_models.alloc(render_model);
            self.model_map.insert(scene_model_id, render_model_id);

            log::debug!(
                "Uploaded model {} with {} primitives",
                scene_model.model.name,
                scene_model.model.primitives.len()
            );
        }
    }

    /// Records the scene pass. The frame is presented by [`finish_frame`](Self::finish_frame).
    pub fn render(&mut self, showroom: &Showroom) -> Result<FrameResult, wgpu::SurfaceError> {
        self.sync_scene(showroom);

        self.common.global_uniform.update(
            &self.queue,
            GlobalUniformState::new(self.size, self.start_time.elapsed().as_secs_f32()),
            &showroom.camera,
            &showroom.environment.lighting,
        );

        showroom.scene.update_transforms();
        gather_instances(&showroom.scene, &mut self.render_models, &self.model_map);

        for (_id, render_model) in self.render_models.iter_mut() {
            if render_model.instances.should_render() {
                render_model
                    .instance_buffer
                    .write(&self.device, &self.queue, &render_model.instances);
            }
        }

        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&CommandEncoderDescriptor {
                label: Some("Render encoder"),
            });

        self.scene_pass.render(
            &SceneTextureViews {
                color: view.clone(),
                depth: self.depth_texture.view().clone(),
            },
            &mut encoder,
            &self.pipeline_cache,
            showroom.environment.clear_color,
            |render_pass| {
                for (_id, render_model) in self.render_models.iter() {
                    if !render_model.instances.should_render() {
                        continue;
                    }

                    render_model_instances(render_pass, render_model, &self.material_manager);
                }
            },
        );

        Ok(FrameResult {
            output,
            view,
            encoder,
        })
    }

    /// Draws the UI over the recorded frame, submits and presents it.
    pub fn finish_frame(&mut self, frame: FrameResult, imgui_context: &mut imgui::Context) {
        let FrameResult {
            output,
            view,
            mut encoder,
        } = frame;

        self.imgui_renderer
            .render(&view, imgui_context, &self.device, &self.queue, &mut encoder);

        self.queue.submit([encoder.finish()]);
        self.window.pre_present_notify();
        output.present();
    }
}

impl TextureUploader for Renderer {
    fn upload(&mut self, image: &TextureImage) -> imgui::TextureId {
        self.imgui_renderer
            .upload_texture(&self.device, &self.queue, image, "Product image")
    }
}
