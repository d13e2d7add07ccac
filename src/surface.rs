//! SDL2 window presentation for the frame buffer.

use sdl2::event::Event;
use sdl2::keyboard::{Keycode, Scancode};
use sdl2::pixels::PixelFormatEnum;
use sdl2::rect::Rect;

use crate::render::framebuffer::FrameBuffer;

/// Events the demo loop cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceEvent {
    None,
    Quit,
    /// A key was pressed this frame (edge-triggered; see [`Surface::held`]
    /// for level-triggered movement keys).
    KeyDown(Keycode),
}

/// An SDL2 window with a streaming texture matching the frame buffer's
/// pixel format, plus event polling.
pub struct Surface {
    canvas: sdl2::render::Canvas<sdl2::video::Window>,
    texture_creator: Box<sdl2::render::TextureCreator<sdl2::video::WindowContext>>,
    texture: sdl2::render::Texture<'static>,
    event_pump: sdl2::EventPump,
    timer_subsystem: sdl2::TimerSubsystem,
    width: u32,
    height: u32,
}

impl Surface {
    pub fn new(title: &str, width: u32, height: u32) -> Result<Self, String> {
        let sdl_context = sdl2::init()?;
        let video_subsystem = sdl_context.video()?;
        let timer_subsystem = sdl_context.timer()?;

        let window = video_subsystem
            .window(title, width, height)
            .position_centered()
            .build()
            .map_err(|e| e.to_string())?;

        let canvas = window.into_canvas().build().map_err(|e| e.to_string())?;
        let texture_creator = Box::new(canvas.texture_creator());
        let event_pump = sdl_context.event_pump()?;

        // SAFETY: texture_creator is heap-allocated and lives as long as
        // Surface. Struct field order drops the texture before the creator.
        let texture_creator_ref: &'static sdl2::render::TextureCreator<sdl2::video::WindowContext> =
            unsafe { &*(texture_creator.as_ref() as *const _) };
        let texture = texture_creator_ref
            .create_texture_streaming(PixelFormatEnum::ARGB8888, width, height)
            .map_err(|e| e.to_string())?;

        Ok(Self {
            canvas,
            texture_creator,
            texture,
            event_pump,
            timer_subsystem,
            width,
            height,
        })
    }

    /// Drain pending events and report the first interesting one.
    pub fn poll_events(&mut self) -> SurfaceEvent {
        for event in self.event_pump.poll_iter() {
            match event {
                Event::Quit { .. }
                | Event::KeyDown {
                    keycode: Some(Keycode::Escape),
                    ..
                } => return SurfaceEvent::Quit,
                Event::KeyDown {
                    keycode: Some(key), ..
                } => return SurfaceEvent::KeyDown(key),
                _ => {}
            }
        }
        SurfaceEvent::None
    }

    /// Whether a key is currently held down. Used for continuous camera
    /// movement, where per-event key repeat would stutter.
    pub fn held(&self, scancode: Scancode) -> bool {
        self.event_pump
            .keyboard_state()
            .is_scancode_pressed(scancode)
    }

    /// Upload the frame buffer's colors to the streaming texture and
    /// present it.
    pub fn present(&mut self, frame: &FrameBuffer) -> Result<(), String> {
        let bytes = frame.color_bytes();
        self.texture
            .update(None, &bytes, (self.width * 4) as usize)
            .map_err(|e| e.to_string())?;

        self.canvas.clear();
        self.canvas.copy(
            &self.texture,
            None,
            Some(Rect::new(0, 0, self.width, self.height)),
        )?;
        self.canvas.present();
        Ok(())
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn timer(&self) -> &sdl2::TimerSubsystem {
        &self.timer_subsystem
    }
}
