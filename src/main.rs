use sdl2::keyboard::{Keycode, Scancode};

use softpipe::prelude::*;

const WINDOW_WIDTH: u32 = 1280;
const WINDOW_HEIGHT: u32 = 768;
const BACKGROUND: Rgba8 = Rgba8::new(50, 50, 50);
const MOVE_SPEED: f32 = 2.0;

/// An 8x8-squares checkerboard so the textured mode has something to show
/// without shipping image assets.
fn checkerboard() -> Texture {
    const SIZE: u32 = 64;
    const SQUARE: u32 = 8;
    let mut pixels = Vec::with_capacity((SIZE * SIZE) as usize);
    for y in 0..SIZE {
        for x in 0..SIZE {
            let dark = ((x / SQUARE) + (y / SQUARE)) % 2 == 0;
            pixels.push(if dark { 0xFA50_3020 } else { 0xFAE0_D0B0 });
        }
    }
    Texture::from_pixels(SIZE, SIZE, pixels).expect("checkerboard dimensions are fixed")
}

fn main() -> Result<(), String> {
    env_logger::init();

    let mut surface = Surface::new("softpipe", WINDOW_WIDTH, WINDOW_HEIGHT)?;
    let mut pipeline =
        RenderPipeline::new(WINDOW_WIDTH, WINDOW_HEIGHT).map_err(|e| e.to_string())?;
    pipeline.set_projection(Projection::from_degrees(
        70.0,
        WINDOW_HEIGHT as f32 / WINDOW_WIDTH as f32,
        0.5,
        100.0,
    ));

    let mut light = PointLight::new();
    light.set_position(0.0, 2.0, 0.0);
    light.set_direction(0.0, -0.65, -1.0);
    light.set_power(300.0);
    pipeline.set_light(light);

    let mut cube = Mesh::cube();
    cube.bind_texture(std::sync::Arc::new(checkerboard()));

    let has_glyphs = match GlyphSheet::from_files(
        "assets/glyphs/lowercase.txt",
        "assets/glyphs/uppercase.txt",
        "assets/glyphs/digits.txt",
    ) {
        Ok(glyphs) => {
            pipeline.bind_glyphs(glyphs);
            true
        }
        Err(e) => {
            log::info!("running without text overlay: {e}");
            false
        }
    };

    let mut camera_pos = Vec3::ZERO;
    let mut fill = FillMode::Textured;
    let mut gouraud = false;
    let mut z_theta = 3.14f32;
    let mut x_theta = 0.0f32;
    let mut previous_ticks = surface.timer().ticks64();

    'running: loop {
        match surface.poll_events() {
            SurfaceEvent::Quit => break 'running,
            SurfaceEvent::KeyDown(key) => match key {
                Keycode::Num1 => fill = FillMode::Wireframe,
                Keycode::Num2 => fill = FillMode::Solid,
                Keycode::Num3 => fill = FillMode::Textured,
                Keycode::G => {
                    gouraud = !gouraud;
                    pipeline.set_gouraud(gouraud);
                }
                _ => {}
            },
            SurfaceEvent::None => {}
        }

        let ticks = surface.timer().ticks64();
        let dt = (ticks - previous_ticks) as f32 / 1000.0;
        previous_ticks = ticks;

        let step = MOVE_SPEED * dt;
        if surface.held(Scancode::W) {
            camera_pos.z += step;
        }
        if surface.held(Scancode::S) {
            camera_pos.z -= step;
        }
        if surface.held(Scancode::A) {
            camera_pos.x -= step;
        }
        if surface.held(Scancode::D) {
            camera_pos.x += step;
        }
        if surface.held(Scancode::Up) {
            camera_pos.y += step;
        }
        if surface.held(Scancode::Down) {
            camera_pos.y -= step;
        }

        z_theta += 0.8 * dt;
        x_theta += 0.5 * dt;

        let camera = Mat4::point_at(camera_pos, camera_pos + Vec3::FORWARD, Vec3::UP);
        pipeline.set_camera(camera_pos, camera.rigid_inverse());

        let model = (Mat4::rotation_z(z_theta) * Mat4::rotation_y(z_theta * 0.5))
            * Mat4::rotation_x(x_theta)
            * Mat4::translation(0.0, 0.2, 3.5);

        pipeline.clear(BACKGROUND);
        pipeline.draw_mesh(&cube, fill, model).map_err(|e| e.to_string())?;
        if has_glyphs {
            pipeline.draw_text("softpipe demo", 10, 10, Rgba8::WHITE);
        }

        surface.present(pipeline.frame())?;
    }

    Ok(())
}
