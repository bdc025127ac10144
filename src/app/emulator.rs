use boba::gameboy::GameBoy;
use std::fs;
use std::path::Path;

/// Thin host-side wrapper around the core machine: owns ROM loading from
/// disk and translates core errors into display strings for the frontend.
pub struct Emulator {
    pub gameboy: GameBoy,
}

impl Emulator {
    pub fn new(rom_path: &Path, skip_boot_rom: bool) -> Result<Self, String> {
        log::info!("Initializing memory bus and CPU (skip_boot_rom={})...", skip_boot_rom);
        let mut gameboy = GameBoy::new(skip_boot_rom);

        log::info!("Loading ROM: {}", rom_path.display());
        let rom_data = fs::read(rom_path)
            .map_err(|e| format!("Failed to read ROM '{}': {}", rom_path.display(), e))?;
        let rom_size = rom_data.len();
        gameboy
            .load_rom(&rom_data)
            .map_err(|e| format!("Failed to load ROM: {}", e))?;
        log::info!("ROM loaded successfully ({} bytes)", rom_size);

        Ok(Emulator { gameboy })
    }

    /// Runs the emulator for approximately one frame's worth of CPU cycles.
    pub fn run_frame(&mut self) -> Result<(), String> {
        self.gameboy.step_frame().map_err(|e| e.to_string())
    }
}
