use anyhow::Context;
use id_arena::{Arena, Id};
use pollster::block_on;
use wgpu::{PollType, RenderPipeline};

type PipelineFactory =
    Box<dyn Fn(&wgpu::Device, &ShaderDefinition) -> anyhow::Result<wgpu::RenderPipeline>>;

/// A WGSL shader compiled into the binary.
#[derive(Debug, Clone)]
pub(crate) struct ShaderDefinition {
    pub name: &'static str,
    pub source: &'static str,
}

impl ShaderDefinition {
    pub fn create_module(&self, device: &wgpu::Device) -> wgpu::ShaderModule {
        device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(self.name),
            source: wgpu::ShaderSource::Wgsl(self.source.into()),
        })
    }
}

struct ShaderEntry {
    def: ShaderDefinition,
    factory: PipelineFactory,
}

pub type PipelineId = Id<PipelineCacheEntry>;

#[derive(Default)]
pub struct PipelineCacheEntry(Option<wgpu::RenderPipeline>);

/// Collects pipeline factories while passes are created. [`build`](Self::build) compiles
/// them all.
pub struct PipelineCacheBuilder {
    shaders: Vec<(PipelineId, ShaderEntry)>,
    pipelines: Arena<PipelineCacheEntry>,
}

impl PipelineCacheBuilder {
    pub fn new() -> Self {
        Self {
            shaders: Vec::new(),
            pipelines: Arena::new(),
        }
    }

    pub(crate) fn add_shader(
        &mut self,
        shader_def: ShaderDefinition,
        factory: PipelineFactory,
    ) -> PipelineId {
        let pipeline_id = self.pipelines.alloc(PipelineCacheEntry::default());
        self.shaders.push((
            pipeline_id,
            ShaderEntry {
                def: shader_def,
                factory,
            },
        ));
        pipeline_id
    }

    pub fn build(mut self, device: &wgpu::Device) -> anyhow::Result<PipelineCache> {
        for (pipeline_id, shader) in &self.shaders {
            let pipeline = compile(device, &shader.def, &shader.factory)
                .with_context(|| format!("Failed to compile shader: {}", shader.def.name))?;

            if let Some(entry) = self.pipelines.get_mut(*pipeline_id) {
                entry.0 = Some(pipeline);
            }

            log::debug!("Compiled {}", shader.def.name);
        }

        Ok(PipelineCache {
            pipelines: self.pipelines,
        })
    }
}

pub struct PipelineCache {
    pipelines: Arena<PipelineCacheEntry>,
}

impl PipelineCache {
    pub fn get(&self, id: PipelineId) -> Option<&RenderPipeline> {
        self.pipelines.get(id).and_then(|entry| entry.0.as_ref())
    }
}

fn compile(
    device: &wgpu::Device,
    shader_def: &ShaderDefinition,
    factory: &PipelineFactory,
) -> anyhow::Result<wgpu::RenderPipeline> {
    device.push_error_scope(wgpu::ErrorFilter::Validation);

    let pipeline = factory(device, shader_def);

    device
        .poll(PollType::Wait)
        .context("Failed to poll device after shader compilation.")?;

    if let Some(error) = block_on(device.pop_error_scope()) {
        return Err(anyhow::anyhow!(
            "Shader compilation failed for {}: {}",
            shader_def.name,
            error
        ));
    }

    pipeline
}
