use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;
use winit::dpi::PhysicalSize;

use crate::camera::{Camera, CameraUniform};
use crate::lighting::{LightUniform, Lighting};

#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct GlobalUniformState {
    pub resolution: [f32; 2],
    pub now: f32,
    _padding: f32,
}

impl GlobalUniformState {
    pub fn new(resolution: PhysicalSize<u32>, now: f32) -> Self {
        Self {
            resolution: [resolution.width as f32, resolution.height as f32],
            now,
            _padding: 0.0,
        }
    }
}

/// Per-frame uniforms shared by every draw: camera, globals and lights. Bound as group 0.
pub struct GlobalUniform {
    camera_buffer: wgpu::Buffer,
    globals_buffer: wgpu::Buffer,
    lights_buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
    pub bind_group_layout: wgpu::BindGroupLayout,
}

impl GlobalUniform {
    pub fn new(
        device: &wgpu::Device,
        initial_state: GlobalUniformState,
        camera: &Camera,
        lighting: &Lighting,
    ) -> Self {
        let mut camera_uniform = CameraUniform::default();
        camera_uniform.update(camera);
        let camera_buffer = camera_uniform.create_buffer(device);

        let globals_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Global uniform buffer"),
            contents: bytemuck::cast_slice(&[initial_state]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let lights_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Light uniform buffer"),
            contents: bytemuck::cast_slice(&[LightUniform::new(lighting)]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let uniform_entry = |binding: u32| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        };

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Global uniform bind group layout"),
            entries: &[uniform_entry(0), uniform_entry(1), uniform_entry(2)],
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Global uniform bind group"),
            layout: &bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: camera_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: globals_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: lights_buffer.as_entire_binding(),
                },
            ],
        });

        Self {
            camera_buffer,
            globals_buffer,
            lights_buffer,
            bind_group,
            bind_group_layout,
        }
    }

    pub fn update(
        &self,
        queue: &wgpu::Queue,
        state: GlobalUniformState,
        camera: &Camera,
        lighting: &Lighting,
    ) {
        let mut camera_uniform = CameraUniform::default();
        camera_uniform.update(camera);
        camera_uniform.update_buffer(queue, &self.camera_buffer);

        queue.write_buffer(&self.globals_buffer, 0, bytemuck::cast_slice(&[state]));
        queue.write_buffer(
            &self.lights_buffer,
            0,
            bytemuck::cast_slice(&[LightUniform::new(lighting)]),
        );
    }
}
