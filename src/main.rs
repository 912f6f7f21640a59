// Copyright 2020 TwoCookingMice

use lumivol::core::accelerator::Accelerator;
use lumivol::core::film::FrameBuffer;
use lumivol::core::scene_loader::load_scene;
use lumivol::io::image_utils::write_image;
use lumivol::renderers::simple::{Renderer, SingleScatteringRenderer};

use std::env;

fn main() {
    env::set_var("RUST_LOG", "info");
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 3 {
        eprintln!("Usage: {} <scene.xml> <output.exr|png> [--frames N] [--seed N] [--device-memory MB] [--host]", args[0]);
        std::process::exit(1);
    }

    let input_path = &args[1];
    let output_path = &args[2];
    let mut frames_override: Option<u32> = None;
    let mut seed_override: Option<u64> = None;
    let mut device_memory_mb: usize = 1024;
    let mut use_host = false;

    let mut i = 3;
    while i < args.len() {
        match args[i].as_str() {
            "--frames" => {
                i += 1;
                frames_override = args.get(i).and_then(|v| v.parse::<u32>().ok());
            }
            "--seed" => {
                i += 1;
                seed_override = args.get(i).and_then(|v| v.parse::<u64>().ok());
            }
            "--device-memory" => {
                i += 1;
                device_memory_mb = args.get(i).and_then(|v| v.parse::<usize>().ok()).unwrap_or(device_memory_mb);
            }
            "--host" => {
                use_host = true;
            }
            other => {
                log::warn!("Ignoring unknown argument: {}", other);
            }
        }
        i += 1;
    }

    let device = if use_host {
        None
    } else {
        Some(Accelerator::new("accelerator0", device_memory_mb.saturating_mul(1024 * 1024)))
    };

    let load_result = match load_scene(input_path, device.as_ref()) {
        Ok(result) => result,
        Err(e) => {
            eprintln!("Failed to load scene {}: {}", input_path, e);
            std::process::exit(1);
        }
    };

    let mut scene = load_result.scene;
    let frames = frames_override.or(load_result.settings.frames).unwrap_or(1).max(1);
    let seed = seed_override.or(load_result.settings.seed).unwrap_or(0);

    let mut frame = FrameBuffer::new(seed);
    let renderer = SingleScatteringRenderer::new(true);
    if let Err(e) = renderer.render(&mut scene, &mut frame, frames) {
        eprintln!("Render failed: {}", e);
        std::process::exit(1);
    }

    if let Some(device) = &device {
        log::info!("Accelerator {} holds {} bytes.", device.name(), device.allocated_bytes());
    }

    if let Err(e) = write_image(frame.running_estimate(), frame.width(), frame.height(), output_path) {
        eprintln!("Failed to write {}: {}", output_path, e);
        std::process::exit(1);
    }
}
