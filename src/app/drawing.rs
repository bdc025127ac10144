use sdl2::pixels::Color;
use sdl2::rect::Rect;
use sdl2::render::Canvas;
use sdl2::video::Window;

use crate::constants;

const PALETTE: [Color; 4] = constants::PALETTE;

/// Draws the Game Boy screen, scaling each shade-index pixel up to a
/// `GB_SCALE_FACTOR`-sized block of solid colour.
pub fn draw_gb_screen(canvas: &mut Canvas<Window>, frame_buffer: &[u8], target_x: i32, target_y: i32) {
    let expected_len = (constants::GB_WIDTH * constants::GB_HEIGHT) as usize;
    if frame_buffer.len() != expected_len {
        log::error!(
            "frame buffer size mismatch: expected {}, got {}",
            expected_len,
            frame_buffer.len()
        );
        return;
    }
    for y in 0..constants::GB_HEIGHT {
        for x in 0..constants::GB_WIDTH {
            let index = y * constants::GB_WIDTH + x;
            let shade_index = frame_buffer[index] & 0x03;
            let color = PALETTE[shade_index as usize];

            canvas.set_draw_color(color);
            let rect = Rect::new(
                target_x + (x as u32 * constants::GB_SCALE_FACTOR) as i32,
                target_y + (y as u32 * constants::GB_SCALE_FACTOR) as i32,
                constants::GB_SCALE_FACTOR,
                constants::GB_SCALE_FACTOR,
            );
            canvas
                .fill_rect(rect)
                .unwrap_or_else(|e| log::error!("failed to draw GB pixel: {}", e));
        }
    }
}
