use lumivol::core::interaction::ScatterType;
use lumivol::core::rng::LcgRng;
use lumivol::core::scene_loader::load_scene;
use lumivol::integrators::single_scattering::estimate_pixel;
use lumivol::math::constants::{Float, Vector3f};
use std::env;

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 4 {
        eprintln!("Usage: {} <scene.xml> <x> <y> [--samples N] [--seed N]", args[0]);
        std::process::exit(1);
    }

    let scene_path = &args[1];
    let x: usize = args[2].parse().unwrap_or(0);
    let y: usize = args[3].parse().unwrap_or(0);

    let mut samples: u32 = 64;
    let mut seed: u64 = 0;

    let mut i = 4;
    while i < args.len() {
        match args[i].as_str() {
            "--samples" => {
                i += 1;
                samples = args.get(i).and_then(|v| v.parse::<u32>().ok()).unwrap_or(samples);
            }
            "--seed" => {
                i += 1;
                seed = args.get(i).and_then(|v| v.parse::<u64>().ok()).unwrap_or(seed);
            }
            _ => {}
        }
        i += 1;
    }

    let mut scene = match load_scene(scene_path, None) {
        Ok(load_result) => load_result.scene,
        Err(err) => {
            eprintln!("Failed to load scene {}: {}", scene_path, err);
            std::process::exit(1);
        }
    };
    if let Err(err) = scene.prepare() {
        eprintln!("Invalid scene {}: {}", scene_path, err);
        std::process::exit(1);
    }

    let (width, height) = (scene.camera.width(), scene.camera.height());
    if x >= width || y >= height {
        eprintln!("Pixel out of bounds: ({}, {}) for size {}x{}", x, y, width, height);
        std::process::exit(2);
    }

    let pixel_seed = ((seed & 0xFFF) << 32) | (((y as u64) & 0xFFFF) << 16) | ((x as u64) & 0xFFFF);
    let mut rng = LcgRng::new(pixel_seed);

    let mut counts = [0u32; 4];
    let mut radiance = Vector3f::zeros();
    let mut color = [0.0 as Float; 4];
    for _ in 0..samples {
        let estimate = estimate_pixel(&scene, &scene.camera, x, y, &mut rng);
        let slot = match (estimate.event.valid, estimate.event.kind) {
            (false, _) => 3,
            (true, ScatterType::Volume) => 0,
            (true, ScatterType::Light) => 1,
            (true, ScatterType::Object) => 2,
        };
        counts[slot] += 1;
        radiance += estimate.radiance.as_vector();
        color[0] += estimate.color.r;
        color[1] += estimate.color.g;
        color[2] += estimate.color.b;
        color[3] += estimate.color.a;
    }

    let inv = 1.0 / (samples.max(1) as Float);
    println!("pixel ({}, {}) samples={}", x, y, samples);
    println!("  events: volume {}, light {}, object {}, none {}", counts[0], counts[1], counts[2], counts[3]);
    println!("  mean radiance XYZ: {:.6}, {:.6}, {:.6}", radiance.x * inv, radiance.y * inv, radiance.z * inv);
    println!("  mean RGBA: {:.6}, {:.6}, {:.6}, {:.6}", color[0] * inv, color[1] * inv, color[2] * inv, color[3] * inv);
}
