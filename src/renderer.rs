use crate::constants::{
    BACKGROUND_COLOR, HUD_BACKDROP_COLOR, HUD_MARGIN_PX, HUD_SCALE_PX, HUD_TEXT_COLOR,
};
use crate::error::{LifeError, Result};
use crate::grid::Grid;
use crate::hud::{text_height, text_pixels, text_width};
use bytemuck::{Pod, Zeroable};
use glam::{Vec2, Vec4};
use std::sync::Arc;
use wgpu::util::DeviceExt;
use winit::{dpi::PhysicalSize, window::Window};

// --- GPU Data Structures ---

#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
struct Vertex {
    position: [f32; 2],
}

impl Vertex {
    fn desc<'a>() -> wgpu::VertexBufferLayout<'a> {
        use std::mem;
        wgpu::VertexBufferLayout {
            array_stride: mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &wgpu::vertex_attr_array![0 => Float32x2],
        }
    }
}

// Unit square; the shader scales it by the instance size and places it at (col, row)
const QUAD_VERTICES: &[Vertex] = &[
    Vertex {
        position: [0.0, 0.0],
    },
    Vertex {
        position: [1.0, 0.0],
    },
    Vertex {
        position: [1.0, 1.0],
    },
    Vertex {
        position: [0.0, 1.0],
    },
];
const QUAD_INDICES: &[u16] = &[0, 1, 2, 0, 2, 3];

// One per live cell or overlay square, in grid units. Must match `CellInstance` in shader.wgsl.
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
struct CellInstance {
    cell: [f32; 2],
    size: [f32; 2],
    color: [f32; 4],
}

impl CellInstance {
    const ATTRIBUTES: [wgpu::VertexAttribute; 3] =
        wgpu::vertex_attr_array![1 => Float32x2, 2 => Float32x2, 3 => Float32x4];

    fn desc<'a>() -> wgpu::VertexBufferLayout<'a> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<CellInstance>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

/// Refill `out` with one instance per live cell of `grid`.
fn collect_instances(grid: &Grid, color: [f32; 4], out: &mut Vec<CellInstance>) {
    out.clear();
    out.extend(grid.live_cells().map(|(row, col)| CellInstance {
        cell: [col as f32, row as f32],
        size: [1.0, 1.0],
        color,
    }));
}

/// Append the status text: a backdrop, then one square per lit font pixel.
/// Laid out in window pixels and converted to grid units for the cell pipeline.
fn collect_overlay(text: &str, grid_size: Vec2, surface: Vec2, out: &mut Vec<CellInstance>) {
    if text.is_empty() || surface.x <= 0.0 || surface.y <= 0.0 {
        return;
    }
    let to_grid = grid_size / surface;
    let origin = Vec2::splat(HUD_MARGIN_PX);
    let padding = Vec2::splat(HUD_SCALE_PX * 2.0);
    let extent = Vec2::new(
        text_width(text, HUD_SCALE_PX),
        text_height(text, HUD_SCALE_PX),
    );

    out.push(CellInstance {
        cell: ((origin - padding) * to_grid).to_array(),
        size: ((extent + padding * 2.0) * to_grid).to_array(),
        color: HUD_BACKDROP_COLOR,
    });
    let pixel_size = (Vec2::splat(HUD_SCALE_PX) * to_grid).to_array();
    out.extend(
        text_pixels(text, origin, HUD_SCALE_PX)
            .into_iter()
            .map(|pixel| CellInstance {
                cell: (pixel * to_grid).to_array(),
                size: pixel_size,
                color: HUD_TEXT_COLOR,
            }),
    );
}

/// New instance capacity when `needed` no longer fits in `capacity`.
fn grown_capacity(capacity: usize, needed: usize) -> Option<usize> {
    (needed > capacity).then(|| needed.next_power_of_two())
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
struct GridUniforms {
    // (cols, rows)
    grid_size: [f32; 2],
    _padding: [f32; 2],
}

// --- Renderer ---
pub struct Renderer<'a> {
    surface: wgpu::Surface<'a>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    pub size: PhysicalSize<u32>,
    render_pipeline: wgpu::RenderPipeline,
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    instance_buffer: wgpu::Buffer,
    instance_data: Vec<CellInstance>,
    max_instances: usize,
    uniform_bind_group: wgpu::BindGroup,
    // (cols, rows), the units instances are placed in
    grid_size: Vec2,
}

impl<'a> Renderer<'a> {
    pub async fn new(window: Arc<Window>, grid_rows: usize, grid_cols: usize) -> Result<Self> {
        let size = window.inner_size();
        let size = PhysicalSize::new(size.width.max(1), size.height.max(1));

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        let surface = instance.create_surface(window.clone())?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or(LifeError::NoAdapter)?;
        log::info!("GPU adapter: {:?}", adapter.get_info().name);

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("Device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    memory_hints: wgpu::MemoryHints::default(),
                },
                None,
            )
            .await?;

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
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Cell Shader Module"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shader.wgsl").into()),
        });

        let (uniform_bind_group_layout, uniform_bind_group) =
            create_grid_bind_group(&device, grid_rows, grid_cols);
        let render_pipeline =
            create_cell_pipeline(&device, &shader, config.format, &uniform_bind_group_layout);

        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Vertex Buffer"),
            contents: bytemuck::cast_slice(QUAD_VERTICES),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Index Buffer"),
            contents: bytemuck::cast_slice(QUAD_INDICES),
            usage: wgpu::BufferUsages::INDEX,
        });

        // Start with room for a quarter of the grid alive; grows on demand.
        let max_instances = (grid_rows * grid_cols / 4).max(64).next_power_of_two();
        let instance_buffer = Self::create_instance_buffer(&device, max_instances, "Instance Buffer");

        Ok(Self {
            surface,
            device,
            queue,
            config,
            size,
            render_pipeline,
            vertex_buffer,
            index_buffer,
            instance_buffer,
            instance_data: Vec::with_capacity(max_instances),
            max_instances,
            uniform_bind_group,
            grid_size: Vec2::new(grid_cols as f32, grid_rows as f32),
        })
    }

    fn create_instance_buffer(device: &wgpu::Device, capacity: usize, label: &str) -> wgpu::Buffer {
        device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size: (capacity * std::mem::size_of::<CellInstance>()) as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        })
    }

    pub fn resize(&mut self, new_size: PhysicalSize<u32>) {
        let new_size = PhysicalSize::new(new_size.width.max(1), new_size.height.max(1));
        if new_size != self.size {
            self.size = new_size;
            self.config.width = new_size.width;
            self.config.height = new_size.height;
            self.surface.configure(&self.device, &self.config);
            log::debug!("Renderer resized to {}x{}", new_size.width, new_size.height);
        }
    }

    // Reapply the current configuration, e.g. after the surface was lost.
    pub fn reconfigure(&mut self) {
        self.surface.configure(&self.device, &self.config);
    }

    /// Surface size as a float vector, for mapping cursor positions to cells.
    pub fn surface_size(&self) -> Vec2 {
        Vec2::new(self.size.width as f32, self.size.height as f32)
    }

    /// Rebuild the instance list from `grid` and the overlay text and copy it
    /// to the GPU, growing the buffer first if it is too small. Returns the
    /// instance count.
    fn upload_instances(&mut self, grid: &Grid, cell_color: Vec4, overlay: &str) -> u32 {
        collect_instances(grid, cell_color.to_array(), &mut self.instance_data);
        collect_overlay(
            overlay,
            self.grid_size,
            self.surface_size(),
            &mut self.instance_data,
        );
        let count = self.instance_data.len();
        if let Some(capacity) = grown_capacity(self.max_instances, count) {
            log::debug!(
                "Growing instance buffer from {} to {} cells",
                self.max_instances,
                capacity
            );
            self.instance_buffer =
                Self::create_instance_buffer(&self.device, capacity, "Cell Instance Buffer");
            self.max_instances = capacity;
        }
        if count > 0 {
            self.queue.write_buffer(
                &self.instance_buffer,
                0,
                bytemuck::cast_slice(&self.instance_data),
            );
        }
        count as u32
    }

    fn draw_cells(&self, encoder: &mut wgpu::CommandEncoder, view: &wgpu::TextureView, count: u32) {
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Cell Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(BACKGROUND_COLOR),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });
        if count == 0 {
            return;
        }
        let used = count as wgpu::BufferAddress
            * std::mem::size_of::<CellInstance>() as wgpu::BufferAddress;
        pass.set_pipeline(&self.render_pipeline);
        pass.set_bind_group(0, &self.uniform_bind_group, &[]);
        pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        pass.set_vertex_buffer(1, self.instance_buffer.slice(..used));
        pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint16);
        pass.draw_indexed(0..QUAD_INDICES.len() as u32, 0, 0..count);
    }

    /// Draw one quad per live cell over the background, with `overlay` as
    /// status text in the top-left corner.
    pub fn render(
        &mut self,
        grid: &Grid,
        cell_color: Vec4,
        overlay: &str,
    ) -> std::result::Result<(), wgpu::SurfaceError> {
        let frame = self.surface.get_current_texture()?;
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let count = self.upload_instances(grid, cell_color, overlay);

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Cell Encoder"),
            });
        self.draw_cells(&mut encoder, &view, count);
        self.queue.submit(std::iter::once(encoder.finish()));
        frame.present();
        Ok(())
    }
}

// Uniform holding the grid dimensions, read by the vertex stage.
fn create_grid_bind_group(
    device: &wgpu::Device,
    rows: usize,
    cols: usize,
) -> (wgpu::BindGroupLayout, wgpu::BindGroup) {
    let uniforms = GridUniforms {
        grid_size: Vec2::new(cols as f32, rows as f32).to_array(),
        _padding: [0.0; 2],
    };
    let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("Grid Uniform Buffer"),
        contents: bytemuck::bytes_of(&uniforms),
        usage: wgpu::BufferUsages::UNIFORM,
    });
    let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("Grid Bind Group Layout"),
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::VERTEX,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: wgpu::BufferSize::new(std::mem::size_of::<GridUniforms>() as _),
            },
            count: None,
        }],
    });
    let group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("Grid Bind Group"),
        layout: &layout,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: buffer.as_entire_binding(),
        }],
    });
    (layout, group)
}

fn create_cell_pipeline(
    device: &wgpu::Device,
    shader: &wgpu::ShaderModule,
    format: wgpu::TextureFormat,
    grid_layout: &wgpu::BindGroupLayout,
) -> wgpu::RenderPipeline {
    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("Cell Pipeline Layout"),
        bind_group_layouts: &[grid_layout],
        push_constant_ranges: &[],
    });
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("Cell Pipeline"),
        layout: Some(&layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some("vs_main"),
            compilation_options: Default::default(),
            buffers: &[Vertex::desc(), CellInstance::desc()],
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some("fs_main"),
            compilation_options: Default::default(),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                write_mask: wgpu::ColorWrites::ALL,
            })],
        }),
        // Quads are never back-facing, so no culling.
        primitive: wgpu::PrimitiveState {
            cull_mode: None,
            ..Default::default()
        },
        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
        cache: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn instances_follow_live_cells_as_col_row() {
        let grid = Grid::from_rows(&["#..", "..#"]);
        let mut out = vec![CellInstance::zeroed(); 5];
        collect_instances(&grid, [1.0, 0.5, 0.0, 1.0], &mut out);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].cell, [0.0, 0.0]);
        assert_eq!(out[1].cell, [2.0, 1.0]);
        assert!(out.iter().all(|i| i.size == [1.0, 1.0]));
        assert!(out.iter().all(|i| i.color == [1.0, 0.5, 0.0, 1.0]));
    }

    #[test]
    fn overlay_is_converted_to_grid_units_after_the_cells() {
        let grid = Grid::from_rows(&["#."]);
        let mut out = Vec::new();
        collect_instances(&grid, [1.0; 4], &mut out);
        // 10px cells: one window pixel is a tenth of a cell
        let grid_size = Vec2::new(100.0, 50.0);
        let surface = Vec2::new(1000.0, 500.0);
        collect_overlay("1", grid_size, surface, &mut out);

        let lit = text_pixels("1", Vec2::ZERO, HUD_SCALE_PX).len();
        assert_eq!(out.len(), 1 + 1 + lit);
        let backdrop = out[1];
        assert_eq!(backdrop.color, HUD_BACKDROP_COLOR);
        assert!(backdrop.cell[0] < HUD_MARGIN_PX / 10.0);
        let text = &out[2..];
        assert!(text.iter().all(|i| i.color == HUD_TEXT_COLOR));
        assert!(text.iter().all(|i| i.size == [HUD_SCALE_PX / 10.0; 2]));
        assert!(text.iter().all(|i| i.cell[0] >= HUD_MARGIN_PX / 10.0 - 1e-6));
    }

    #[test]
    fn empty_overlay_or_surface_adds_nothing() {
        let mut out = Vec::new();
        collect_overlay("", Vec2::new(10.0, 10.0), Vec2::new(100.0, 100.0), &mut out);
        collect_overlay("1", Vec2::new(10.0, 10.0), Vec2::ZERO, &mut out);
        assert!(out.is_empty());
    }

    #[test]
    fn instance_capacity_grows_to_next_power_of_two() {
        assert_eq!(grown_capacity(64, 0), None);
        assert_eq!(grown_capacity(64, 64), None);
        assert_eq!(grown_capacity(64, 65), Some(128));
        assert_eq!(grown_capacity(1024, 3000), Some(4096));
    }

    #[test]
    fn instance_layout_matches_shader_locations() {
        let layout = CellInstance::desc();
        assert_eq!(layout.array_stride, 32);
        assert_eq!(layout.attributes[0].shader_location, 1);
        assert_eq!(layout.attributes[1].offset, 8);
        assert_eq!(layout.attributes[2].shader_location, 3);
        assert_eq!(layout.attributes[2].offset, 16);
    }
}
