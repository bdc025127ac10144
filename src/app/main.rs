use std::{env, path::Path, thread, time::Instant};

mod constants;
mod drawing;
mod emulator;
mod input;
mod sdl_setup;

use emulator::Emulator;
use input::InputState;

fn main() -> Result<(), String> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: {} <rom_path>", args[0]);
        std::process::exit(1);
    }
    let rom_path = Path::new(&args[1]);
    let rom_filename = rom_path.file_name().unwrap_or_default().to_string_lossy();
    let window_title = format!("boba - {}", rom_filename);

    let mut sdl_context = sdl_setup::init_sdl(&window_title)?;
    let mut emulator = Emulator::new(rom_path, true)?;
    let mut input_state = InputState::new();

    log::info!("Starting main loop...");
    'main_loop: loop {
        let frame_start_time = Instant::now();

        if input::handle_input(
            &mut sdl_context.event_pump,
            &mut input_state,
            &mut emulator.gameboy.memory_bus,
        ) {
            break 'main_loop;
        }

        if let Err(e) = emulator.run_frame() {
            eprintln!("Emulator error: {}", e);
            break 'main_loop;
        }

        sdl_context.canvas.set_draw_color(sdl2::pixels::Color::RGB(0, 0, 0));
        sdl_context.canvas.clear();

        drawing::draw_gb_screen(&mut sdl_context.canvas, emulator.gameboy.ppu.get_frame_buffer(), 0, 0);

        sdl_context.canvas.present();

        let elapsed = frame_start_time.elapsed();
        if elapsed < constants::TARGET_FRAME_DURATION {
            thread::sleep(constants::TARGET_FRAME_DURATION - elapsed);
        }
    }

    log::info!("Emulator stopped.");
    Ok(())
}
