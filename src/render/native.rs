use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use bytemuck::bytes_of;
use log::{error, info, warn};
use wgpu::util::DeviceExt;
use winit::dpi::PhysicalSize;
use winit::window::{Window, WindowId};

use super::common::{
    clear_color, gizmo_view_proj, gizmo_viewport, light_markers, GlobalUniform, LineUniform,
    ObjectUniform, SlotTextures,
};
use super::shader::{marker_shader, phong_shader, LINE_SHADER};
use crate::app::FrameData;
use crate::mesh::{axis_gizmo_lines, grid_lines, LineVertex, MeshData, Vertex};
use crate::obj::load_obj;
use crate::scene::{MeshSource, Scene};
use crate::texture::TextureData;
use crate::ui::GuiFrame;

const GRID_HALF_EXTENT: u32 = 20;
const GRID_SPACING: f32 = 1.0;
const MARKER_SHININESS: f32 = 1.0;

const VERTEX_ATTRIBUTES: [wgpu::VertexAttribute; 3] =
    wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3, 2 => Float32x2];
const LINE_ATTRIBUTES: [wgpu::VertexAttribute; 2] =
    wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3];

/// GPU renderer backed by wgpu that draws the lit scene, debug lines and
/// the egui overlay.
pub struct Renderer {
    window: Arc<Window>,
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    size: PhysicalSize<u32>,
    depth: DepthBuffer,
    pipelines: Pipelines,
    global_buffer: wgpu::Buffer,
    global_bind_group: wgpu::BindGroup,
    object_layout: wgpu::BindGroupLayout,
    grid: LineBatch,
    gizmo: LineBatch,
    sampler: wgpu::Sampler,
    mesh_cache: HashMap<String, MeshBuffers>,
    missing_meshes: HashSet<String>,
    texture_cache: HashMap<PathBuf, GpuTexture>,
    object_slots: Vec<ObjectSlot>,
    marker_slots: Vec<ObjectSlot>,
    default_mesh: MeshBuffers,
    white_texture: GpuTexture,
    specular_texture: GpuTexture,
    wireframe_warned: bool,
    egui: egui_wgpu::Renderer,
}

impl Renderer {
    /// Initializes the GPU renderer for the provided window.
    pub async fn new(window: Arc<Window>, vsync: bool) -> Result<Self> {
        let size = window.inner_size();
        if size.width == 0 || size.height == 0 {
            return Err(anyhow!("window has zero area"));
        }

        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });
        let surface = instance
            .create_surface(Arc::clone(&window))
            .context("failed to create surface")?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("failed to acquire GPU adapter")?;
        info!("Using adapter {}", adapter.get_info().name);

        let wireframe_supported = adapter
            .features()
            .contains(wgpu::Features::POLYGON_MODE_LINE);
        let required_features = if wireframe_supported {
            wgpu::Features::POLYGON_MODE_LINE
        } else {
            wgpu::Features::empty()
        };
        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("renderer-device"),
                    required_features,
                    required_limits: wgpu::Limits::default(),
                },
                None,
            )
            .await
            .context("failed to create GPU device")?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|format| format.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .context("surface reports no supported formats")?;
        let present_mode = if vsync {
            wgpu::PresentMode::Fifo
        } else {
            surface_caps
                .present_modes
                .iter()
                .copied()
                .find(|mode| {
                    matches!(
                        mode,
                        wgpu::PresentMode::Mailbox | wgpu::PresentMode::Immediate
                    )
                })
                .unwrap_or(wgpu::PresentMode::Fifo)
        };
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width,
            height: size.height,
            present_mode,
            desired_maximum_frame_latency: 2,
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
        };
        surface.configure(&device, &config);

        let depth = DepthBuffer::create(&device, config.width, config.height);

        let global_layout = uniform_layout::<GlobalUniform>(&device, "global-bind-layout");
        let line_layout = uniform_layout::<LineUniform>(&device, "line-bind-layout");
        let object_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("object-bind-layout"),
            entries: &[
                uniform_entry::<ObjectUniform>(0),
                texture_entry(1),
                texture_entry(2),
                wgpu::BindGroupLayoutEntry {
                    binding: 3,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let global_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("global-uniform"),
            size: std::mem::size_of::<GlobalUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let global_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("global-bind-group"),
            layout: &global_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: global_buffer.as_entire_binding(),
            }],
        });

        let pipelines = Pipelines::create(
            &device,
            surface_format,
            &global_layout,
            &object_layout,
            &line_layout,
            wireframe_supported,
        );

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("material-sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            address_mode_w: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        let grid = LineBatch::new(
            &device,
            &line_layout,
            &grid_lines(GRID_HALF_EXTENT, GRID_SPACING),
            "grid",
        );
        let gizmo = LineBatch::new(&device, &line_layout, &axis_gizmo_lines(), "gizmo");
        let default_mesh = MeshBuffers::from_mesh(&device, &MeshData::cube(), "cube");
        let white_texture = GpuTexture::upload(
            &device,
            &queue,
            &TextureData::solid("white", [255, 255, 255, 255], true),
        );
        let specular_texture = GpuTexture::upload(
            &device,
            &queue,
            &TextureData::solid("specular", [128, 128, 128, 255], false),
        );
        let egui = egui_wgpu::Renderer::new(&device, surface_format, None, 1);

        Ok(Self {
            window,
            surface,
            device,
            queue,
            config,
            size,
            depth,
            pipelines,
            global_buffer,
            global_bind_group,
            object_layout,
            grid,
            gizmo,
            sampler,
            mesh_cache: HashMap::new(),
            missing_meshes: HashSet::new(),
            texture_cache: HashMap::new(),
            object_slots: Vec::new(),
            marker_slots: Vec::new(),
            default_mesh,
            white_texture,
            specular_texture,
            wireframe_warned: false,
            egui,
        })
    }

    pub fn window_id(&self) -> WindowId {
        self.window.id()
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    pub fn aspect(&self) -> f32 {
        if self.size.height == 0 {
            1.0
        } else {
            self.size.width as f32 / self.size.height as f32
        }
    }

    pub fn supports_wireframe(&self) -> bool {
        self.pipelines.wireframe.is_some()
    }

    /// Resizes the swap chain to match the new dimensions.
    pub fn resize(&mut self, new_size: PhysicalSize<u32>) {
        if new_size.width == 0 || new_size.height == 0 {
            return;
        }
        self.size = new_size;
        self.config.width = new_size.width;
        self.config.height = new_size.height;
        self.surface.configure(&self.device, &self.config);
        self.depth = DepthBuffer::create(&self.device, new_size.width, new_size.height);
    }

    /// Draws one frame: lit objects, light markers and grid with depth, then
    /// the axis gizmo and the UI on top.
    pub fn render(
        &mut self,
        frame: &FrameData,
        scene: &Scene,
        gui: Option<&GuiFrame>,
    ) -> Result<(), wgpu::SurfaceError> {
        let settings = frame.settings;
        self.queue.write_buffer(
            &self.global_buffer,
            0,
            bytes_of(&GlobalUniform::from_frame(frame)),
        );
        self.queue.write_buffer(
            &self.grid.uniform,
            0,
            bytes_of(&LineUniform::new(frame.view_proj())),
        );
        self.queue.write_buffer(
            &self.gizmo.uniform,
            0,
            bytes_of(&LineUniform::new(gizmo_view_proj(frame.view))),
        );

        for object in &scene.objects {
            self.ensure_mesh_loaded(scene, &object.mesh);
            for (texture, srgb) in [(&object.diffuse, true), (&object.specular, false)] {
                if let Some(texture) = texture {
                    self.ensure_texture_loaded(scene.resolve(texture), srgb);
                }
            }
        }

        let mut object_slots = std::mem::take(&mut self.object_slots);
        object_slots.truncate(scene.objects.len());
        for (index, object) in scene.objects.iter().enumerate() {
            let textures = SlotTextures::for_object(scene, object);
            let uniform = ObjectUniform::new(object.model_matrix(), object.tint, object.shininess);
            self.update_slot(&mut object_slots, index, &uniform, textures);
        }
        self.object_slots = object_slots;

        let markers = if settings.show_light_markers {
            light_markers(&frame.lights)
        } else {
            Vec::new()
        };
        let mut marker_slots = std::mem::take(&mut self.marker_slots);
        marker_slots.truncate(markers.len());
        for (index, (model, color)) in markers.into_iter().enumerate() {
            let uniform = ObjectUniform::new(model, color, MARKER_SHININESS);
            self.update_slot(&mut marker_slots, index, &uniform, SlotTextures::default());
        }
        self.marker_slots = marker_slots;

        let lit_pipeline = match (&self.pipelines.wireframe, settings.wireframe) {
            (Some(wireframe), true) => wireframe,
            (None, true) => {
                if !self.wireframe_warned {
                    warn!("Adapter does not support line polygon mode; wireframe unavailable");
                    self.wireframe_warned = true;
                }
                &self.pipelines.lit
            }
            _ => &self.pipelines.lit,
        };

        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("renderer-encoder"),
            });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("scene-pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(clear_color(settings.clear_color)),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            pass.set_pipeline(lit_pipeline);
            pass.set_bind_group(0, &self.global_bind_group, &[]);
            for (object, slot) in scene.objects.iter().zip(&self.object_slots) {
                let mesh = self
                    .mesh_cache
                    .get(object.mesh.key())
                    .unwrap_or(&self.default_mesh);
                mesh.draw(&mut pass, &slot.bind_group);
            }

            if !self.marker_slots.is_empty() {
                pass.set_pipeline(&self.pipelines.marker);
                pass.set_bind_group(0, &self.global_bind_group, &[]);
                for slot in &self.marker_slots {
                    self.default_mesh.draw(&mut pass, &slot.bind_group);
                }
            }

            if settings.show_grid {
                pass.set_pipeline(&self.pipelines.grid);
                self.grid.draw(&mut pass);
            }
        }

        let screen = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [self.config.width, self.config.height],
            pixels_per_point: gui.map(|gui| gui.pixels_per_point).unwrap_or(1.0),
        };
        let mut gui_commands = Vec::new();
        if let Some(gui) = gui {
            for (id, delta) in &gui.textures_delta.set {
                self.egui
                    .update_texture(&self.device, &self.queue, *id, delta);
            }
            gui_commands = self.egui.update_buffers(
                &self.device,
                &self.queue,
                &mut encoder,
                &gui.paint_jobs,
                &screen,
            );
        }

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("overlay-pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            let gizmo_area = settings
                .show_gizmo
                .then(|| gizmo_viewport(self.config.width, self.config.height))
                .flatten();
            if let Some((x, y, size)) = gizmo_area {
                pass.set_viewport(x, y, size, size, 0.0, 1.0);
                pass.set_pipeline(&self.pipelines.overlay);
                self.gizmo.draw(&mut pass);
                pass.set_viewport(
                    0.0,
                    0.0,
                    self.config.width as f32,
                    self.config.height as f32,
                    0.0,
                    1.0,
                );
            }

            if let Some(gui) = gui {
                self.egui.render(&mut pass, &gui.paint_jobs, &screen);
            }
        }

        if let Some(gui) = gui {
            for id in &gui.textures_delta.free {
                self.egui.free_texture(id);
            }
        }

        self.queue.submit(
            gui_commands
                .into_iter()
                .chain(std::iter::once(encoder.finish())),
        );
        output.present();
        Ok(())
    }

    fn ensure_mesh_loaded(&mut self, scene: &Scene, source: &MeshSource) {
        let key = source.key();
        if self.mesh_cache.contains_key(key) || self.missing_meshes.contains(key) {
            return;
        }
        let mesh = match source {
            MeshSource::Cube => Ok(MeshData::cube()),
            MeshSource::Quad => Ok(MeshData::quad()),
            MeshSource::Obj(path) => load_obj(&scene.resolve(path)),
        };
        match mesh {
            Ok(mesh) => {
                info!(
                    "Loaded mesh {key} ({} triangles)",
                    mesh.triangle_count()
                );
                self.mesh_cache
                    .insert(key.to_string(), MeshBuffers::from_mesh(&self.device, &mesh, key));
            }
            Err(err) => {
                error!("failed to load mesh {key}: {err:?}");
                self.missing_meshes.insert(key.to_string());
            }
        }
    }

    // Failed decodes are cached as the fallback checkerboard, so each file
    // is only attempted once.
    fn ensure_texture_loaded(&mut self, path: PathBuf, srgb: bool) {
        if self.texture_cache.contains_key(&path) {
            return;
        }
        let data = TextureData::load_or_fallback(&path, srgb);
        let texture = GpuTexture::upload(&self.device, &self.queue, &data);
        self.texture_cache.insert(path, texture);
    }

    /// Rewrites the uniform of slot `index`, rebuilding its bind group only
    /// when the slot is new or its textures changed.
    fn update_slot(
        &self,
        slots: &mut Vec<ObjectSlot>,
        index: usize,
        uniform: &ObjectUniform,
        textures: SlotTextures,
    ) {
        if let Some(slot) = slots.get(index).filter(|slot| slot.textures == textures) {
            self.queue.write_buffer(&slot.buffer, 0, bytes_of(uniform));
            return;
        }
        let slot = self.create_slot(uniform, textures);
        if index < slots.len() {
            slots[index] = slot;
        } else {
            slots.push(slot);
        }
    }

    fn create_slot(&self, uniform: &ObjectUniform, textures: SlotTextures) -> ObjectSlot {
        let diffuse = textures
            .diffuse
            .as_ref()
            .and_then(|path| self.texture_cache.get(path))
            .unwrap_or(&self.white_texture);
        let specular = textures
            .specular
            .as_ref()
            .and_then(|path| self.texture_cache.get(path))
            .unwrap_or(&self.specular_texture);
        let buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("object-uniform"),
                contents: bytes_of(uniform),
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            });
        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("object-bind-group"),
            layout: &self.object_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&diffuse.view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::TextureView(&specular.view),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
            ],
        });
        ObjectSlot {
            buffer,
            bind_group,
            textures,
        }
    }
}

/// Persistent uniform buffer and bind group for one drawn object or marker.
struct ObjectSlot {
    buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    textures: SlotTextures,
}

struct Pipelines {
    lit: wgpu::RenderPipeline,
    wireframe: Option<wgpu::RenderPipeline>,
    marker: wgpu::RenderPipeline,
    grid: wgpu::RenderPipeline,
    overlay: wgpu::RenderPipeline,
}

impl Pipelines {
    fn create(
        device: &wgpu::Device,
        format: wgpu::TextureFormat,
        global_layout: &wgpu::BindGroupLayout,
        object_layout: &wgpu::BindGroupLayout,
        line_layout: &wgpu::BindGroupLayout,
        wireframe_supported: bool,
    ) -> Self {
        let phong = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("phong-shader"),
            source: wgpu::ShaderSource::Wgsl(phong_shader().into()),
        });
        let marker = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("marker-shader"),
            source: wgpu::ShaderSource::Wgsl(marker_shader().into()),
        });
        let lines = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("line-shader"),
            source: wgpu::ShaderSource::Wgsl(LINE_SHADER.into()),
        });

        let mesh_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("mesh-pipeline-layout"),
            bind_group_layouts: &[global_layout, object_layout],
            push_constant_ranges: &[],
        });
        let line_pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("line-pipeline-layout"),
            bind_group_layouts: &[line_layout],
            push_constant_ranges: &[],
        });

        let mesh_buffers = [wgpu::VertexBufferLayout {
            array_stride: Vertex::STRIDE,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &VERTEX_ATTRIBUTES,
        }];
        let line_buffers = [wgpu::VertexBufferLayout {
            array_stride: LineVertex::STRIDE,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &LINE_ATTRIBUTES,
        }];

        let build = |label: &str,
                     layout: &wgpu::PipelineLayout,
                     module: &wgpu::ShaderModule,
                     buffers: &[wgpu::VertexBufferLayout<'_>],
                     topology: wgpu::PrimitiveTopology,
                     polygon_mode: wgpu::PolygonMode,
                     depth: bool| {
            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(label),
                layout: Some(layout),
                vertex: wgpu::VertexState {
                    module,
                    entry_point: "vs_main",
                    buffers,
                },
                primitive: wgpu::PrimitiveState {
                    topology,
                    front_face: wgpu::FrontFace::Ccw,
                    cull_mode: None,
                    polygon_mode,
                    ..Default::default()
                },
                depth_stencil: depth.then(|| wgpu::DepthStencilState {
                    format: DepthBuffer::FORMAT,
                    depth_write_enabled: true,
                    depth_compare: wgpu::CompareFunction::Less,
                    stencil: Default::default(),
                    bias: Default::default(),
                }),
                multisample: wgpu::MultisampleState::default(),
                fragment: Some(wgpu::FragmentState {
                    module,
                    entry_point: "fs_main",
                    targets: &[Some(wgpu::ColorTargetState {
                        format,
                        blend: Some(wgpu::BlendState::REPLACE),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                }),
                multiview: None,
            })
        };

        let triangles = wgpu::PrimitiveTopology::TriangleList;
        let line_list = wgpu::PrimitiveTopology::LineList;
        let fill = wgpu::PolygonMode::Fill;
        Self {
            lit: build("lit-pipeline", &mesh_layout, &phong, &mesh_buffers, triangles, fill, true),
            wireframe: wireframe_supported.then(|| {
                build(
                    "wireframe-pipeline",
                    &mesh_layout,
                    &phong,
                    &mesh_buffers,
                    triangles,
                    wgpu::PolygonMode::Line,
                    true,
                )
            }),
            marker: build("marker-pipeline", &mesh_layout, &marker, &mesh_buffers, triangles, fill, true),
            grid: build("grid-pipeline", &line_pipeline_layout, &lines, &line_buffers, line_list, fill, true),
            overlay: build(
                "overlay-pipeline",
                &line_pipeline_layout,
                &lines,
                &line_buffers,
                line_list,
                fill,
                false,
            ),
        }
    }
}

fn uniform_entry<T>(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: wgpu::BufferSize::new(std::mem::size_of::<T>() as u64),
        },
        count: None,
    }
}

fn texture_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Texture {
            sample_type: wgpu::TextureSampleType::Float { filterable: true },
            view_dimension: wgpu::TextureViewDimension::D2,
            multisampled: false,
        },
        count: None,
    }
}

fn uniform_layout<T>(device: &wgpu::Device, label: &str) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some(label),
        entries: &[uniform_entry::<T>(0)],
    })
}

struct MeshBuffers {
    vertex: wgpu::Buffer,
    index: wgpu::Buffer,
    index_count: u32,
}

impl MeshBuffers {
    fn from_mesh(device: &wgpu::Device, mesh: &MeshData, label: &str) -> Self {
        let vertex = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label}-vertices")),
            contents: bytemuck::cast_slice(&mesh.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label}-indices")),
            contents: bytemuck::cast_slice(&mesh.indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        Self {
            vertex,
            index,
            index_count: mesh.indices.len() as u32,
        }
    }

    fn draw<'a>(&'a self, pass: &mut wgpu::RenderPass<'a>, bind_group: &'a wgpu::BindGroup) {
        pass.set_vertex_buffer(0, self.vertex.slice(..));
        pass.set_index_buffer(self.index.slice(..), wgpu::IndexFormat::Uint32);
        pass.set_bind_group(1, bind_group, &[]);
        pass.draw_indexed(0..self.index_count, 0, 0..1);
    }
}

/// Static line list with its own view-projection uniform.
struct LineBatch {
    vertex: wgpu::Buffer,
    vertex_count: u32,
    uniform: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

impl LineBatch {
    fn new(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        lines: &[LineVertex],
        label: &str,
    ) -> Self {
        let vertex = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label}-vertices")),
            contents: bytemuck::cast_slice(lines),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let uniform = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(&format!("{label}-uniform")),
            size: std::mem::size_of::<LineUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(&format!("{label}-bind-group")),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform.as_entire_binding(),
            }],
        });
        Self {
            vertex,
            vertex_count: lines.len() as u32,
            uniform,
            bind_group,
        }
    }

    fn draw<'a>(&'a self, pass: &mut wgpu::RenderPass<'a>) {
        pass.set_bind_group(0, &self.bind_group, &[]);
        pass.set_vertex_buffer(0, self.vertex.slice(..));
        pass.draw(0..self.vertex_count, 0..1);
    }
}

struct GpuTexture {
    _texture: wgpu::Texture,
    view: wgpu::TextureView,
}

impl GpuTexture {
    fn upload(device: &wgpu::Device, queue: &wgpu::Queue, data: &TextureData) -> Self {
        let size = wgpu::Extent3d {
            width: data.width,
            height: data.height,
            depth_or_array_layers: 1,
        };
        let format = if data.srgb {
            wgpu::TextureFormat::Rgba8UnormSrgb
        } else {
            wgpu::TextureFormat::Rgba8Unorm
        };
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(&data.label),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        queue.write_texture(
            wgpu::ImageCopyTexture {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            &data.pixels,
            wgpu::ImageDataLayout {
                offset: 0,
                bytes_per_row: Some(data.bytes_per_row()),
                rows_per_image: Some(data.height),
            },
            size,
        );
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self {
            _texture: texture,
            view,
        }
    }
}

struct DepthBuffer {
    _texture: wgpu::Texture,
    view: wgpu::TextureView,
}

impl DepthBuffer {
    const FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth24Plus;

    fn create(device: &wgpu::Device, width: u32, height: u32) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("depth-texture"),
            size: wgpu::Extent3d {
                width: width.max(1),
                height: height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: Self::FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self {
            _texture: texture,
            view,
        }
    }
}
