//! Spinning, indexed triangle drawn through the [`Graphic`] interface.
//!
//! Press escape or close the window to quit. Set `RUST_LOG=debug` to see what the backend does.

use renik::{
  Color, Diagnostic, DrawMode, Feature, Graphic, GraphicError, Material, Mesh, RectI, UniformValue,
  VertexChannel,
};
use renik_glutin::glutin::event::{ElementState, Event, KeyboardInput, VirtualKeyCode, WindowEvent};
use renik_glutin::glutin::event_loop::ControlFlow;
use renik_windowing::{Surface, WindowDim, WindowOpt};
use std::error::Error;
use std::time::Instant;
use structopt::StructOpt;

const VS: &str = "
in vec2 position;
in vec3 color;

out vec3 v_color;

uniform float time;

void main() {
  float c = cos(time);
  float s = sin(time);

  gl_Position = vec4(mat2(c, s, -s, c) * position, 0., 1.);
  v_color = color;
}";

const FS: &str = "
in vec3 v_color;

out vec4 frag;

void main() {
  frag = vec4(v_color, 1.);
}";

#[derive(Debug, StructOpt)]
pub struct CLIOpts {
  #[structopt(long, default_value = "960")]
  /// Width of the window.
  width: u32,

  #[structopt(long, default_value = "540")]
  /// Height of the window.
  height: u32,

  #[structopt(short, long, default_value = "renik")]
  /// Title of the window.
  title: String,

  #[structopt(short, long)]
  /// Number of MSAA samples.
  samples: Option<u32>,

  #[structopt(long)]
  /// Don’t wait for vertical sync when presenting frames.
  no_vsync: bool,
}

fn main() {
  env_logger::init();

  if let Err(e) = run(CLIOpts::from_args()) {
    log::error!("{}", e);
    std::process::exit(1);
  }
}

fn triangle() -> Mesh {
  Mesh::new(true)
    .with_channel(VertexChannel::new(
      "position",
      2,
      vec![-0.5, -0.5, 0.5, -0.5, 0., 0.5],
    ))
    .with_channel(VertexChannel::new(
      "color",
      3,
      vec![1., 0., 0., 0., 1., 0., 0., 0., 1.],
    ))
    .with_indices(vec![0, 1, 2])
}

fn run(opts: CLIOpts) -> Result<(), Box<dyn Error>> {
  let win_opt = WindowOpt::default()
    .set_dim(WindowDim::Windowed {
      width: opts.width,
      height: opts.height,
    })
    .set_num_samples(opts.samples)
    .set_vsync(!opts.no_vsync);

  let (mut gl, event_loop) = renik_glutin::gl33(&opts.title, win_opt)?;

  gl.set_diagnostic_callback(Some(Box::new(|diagnostic: &Diagnostic| {
    log::warn!("diagnostic: {}", diagnostic)
  })));
  gl.init()?;

  log::info!("blending enabled: {}", gl.check_feature(Feature::Blend)?);

  let shader = gl.create_shader(VS, FS, "spinning-triangle")?;
  let mut material = Material::new();
  gl.attach_shader_to_material(shader, &mut material)?;

  let mut mesh = triangle();
  mesh.set_material(material);
  gl.bind_mesh(&mesh, false)?;

  gl.clear_color(Color::rgb(0.1, 0.1, 0.1))?;

  let start_t = Instant::now();

  event_loop.run(move |event, _, control_flow| {
    *control_flow = ControlFlow::Poll;

    match event {
      Event::WindowEvent { event, .. } => match event {
        WindowEvent::CloseRequested
        | WindowEvent::KeyboardInput {
          input:
            KeyboardInput {
              state: ElementState::Released,
              virtual_keycode: Some(VirtualKeyCode::Escape),
              ..
            },
          ..
        } => *control_flow = ControlFlow::Exit,

        WindowEvent::Resized(size) => {
          log::debug!("resized to {}×{}", size.width, size.height);
          gl.surface_mut().resize(size.width, size.height);
        }

        _ => (),
      },

      Event::MainEventsCleared => {
        let size = gl.surface().size();
        let t = start_t.elapsed().as_secs_f32();

        if let Err(e) = render_frame(&mut gl, size, &mut mesh, t) {
          log::error!("cannot render the frame: {}", e);
          *control_flow = ControlFlow::Exit;
        }
      }

      Event::LoopDestroyed => {
        if let Err(e) = gl.release() {
          log::error!("cannot release the backend: {}", e);
        }
      }

      _ => (),
    }
  })
}

fn render_frame<G>(
  gl: &mut G,
  [width, height]: [u32; 2],
  mesh: &mut Mesh,
  t: f32,
) -> Result<(), GraphicError>
where
  G: Graphic,
{
  if let Some(material) = mesh.material_mut() {
    material.set_uniform("time", UniformValue::Float(t));
  }

  gl.draw_viewport(RectI::new(0, 0, width as i32, height as i32))?;
  gl.begin_render()?;
  gl.draw_mesh(mesh, DrawMode::Triangles)?;
  gl.end_render()
}
