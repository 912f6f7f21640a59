use lumivol::io::exr_utils::read_rgba_exr;

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: {} <image.exr>", args[0]);
        std::process::exit(1);
    }

    let img = match read_rgba_exr(&args[1]) {
        Ok(img) => img,
        Err(err) => {
            eprintln!("Failed to read {}: {}", args[1], err);
            std::process::exit(1);
        }
    };
    let mut min = [f32::INFINITY; 4];
    let mut max = [f32::NEG_INFINITY; 4];
    let mut sum = [0.0f64; 4];
    let mut covered = 0usize;

    for px in &img.data {
        let values = [px.r, px.g, px.b, px.a];
        for c in 0..4 {
            min[c] = min[c].min(values[c]);
            max[c] = max[c].max(values[c]);
            sum[c] += values[c] as f64;
        }
        if px.a > 0.0 {
            covered += 1;
        }
    }

    let n = img.data.len().max(1) as f64;
    println!("Size: {}x{} ({} pixels)", img.width, img.height, img.data.len());
    println!("Min RGBA: {:.6}, {:.6}, {:.6}, {:.6}", min[0], min[1], min[2], min[3]);
    println!("Max RGBA: {:.6}, {:.6}, {:.6}, {:.6}", max[0], max[1], max[2], max[3]);
    println!("Mean RGBA: {:.6}, {:.6}, {:.6}, {:.6}", sum[0] / n, sum[1] / n, sum[2] / n, sum[3] / n);
    println!("Coverage: {:.2}%", 100.0 * covered as f64 / n);
}
