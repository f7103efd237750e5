use clap::Parser;
use image::ImageReader;
use image::{GrayImage, Luma};
use imageproc::region_labelling::{Connectivity, connected_components};
use std::path::PathBuf;

use stickerlab::{InstanceMask, IsolationPipeline};

#[derive(Parser)]
#[command(name = "stickerlab")]
#[command(about = "Cut a photographed object out of its background and trace its outline")]
struct Cli {
    /// Path to input image file (alpha channel marks foreground)
    #[arg(value_name = "IMAGE")]
    image_path: PathBuf,

    /// Output file prefix
    #[arg(short, long, default_value = "sticker")]
    output: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Morphological gradient radius for edge extraction
    #[arg(long, default_value = "2")]
    edge_radius: u8,

    /// Thumbnail canvas size in pixels
    #[arg(long, default_value = "512")]
    canvas_size: u32,

    /// Fraction of the canvas the subject occupies
    #[arg(long, default_value = "0.8")]
    fill_fraction: f32,

    /// Point budget for outline smoothing
    #[arg(long, default_value = "120")]
    sample_points: usize,
}

fn main() -> anyhow::Result<()> {
    let args = Cli::parse();

    if args.verbose {
        println!("Loading image: {:?}", args.image_path);
    }

    let img = ImageReader::open(&args.image_path)?
        .decode()
        .map_err(|e| anyhow::anyhow!("Failed to decode image: {}", e))?
        .to_rgba8();

    if args.verbose {
        println!("Image loaded: {}x{}\n", img.width(), img.height());
    }

    // Derive the instance mask from the alpha channel: each 8-connected
    // component of non-transparent pixels becomes one instance
    let mask = mask_from_alpha(&img);
    let candidates = mask.instance_ids();

    if args.verbose {
        println!("Found {} foreground instance(s)", candidates.len());
    }

    let pipeline = IsolationPipeline::new()
        .with_verbose(args.verbose)
        .with_edge_radius(args.edge_radius)
        .with_target_points(args.sample_points)
        .with_canvas(args.canvas_size, args.fill_fraction);

    let Some(result) = pipeline.isolate(&img, &mask, &candidates)? else {
        println!("No foreground object detected in the image.");
        return Ok(());
    };

    let cutout_path = format!("{}_cutout.png", args.output);
    result.cutout.save(&cutout_path)?;
    println!("Saved cut-out to: {}", cutout_path);

    let thumb_path = format!("{}_thumb.png", args.output);
    result.thumbnail.save(&thumb_path)?;
    println!("Saved thumbnail to: {}", thumb_path);

    let svg_path = format!("{}_outline.svg", args.output);
    std::fs::write(
        &svg_path,
        outline_svg(&result.outline, result.bbox.width, result.bbox.height),
    )?;
    println!("Saved outline to: {}", svg_path);

    println!(
        "\nSubject: {}x{} at ({}, {}), outline has {} segments",
        result.bbox.width,
        result.bbox.height,
        result.bbox.x,
        result.bbox.y,
        result.outline.segments.len()
    );

    Ok(())
}

/// Build an instance mask from the image's alpha channel.
///
/// Labels 8-connected components of non-zero alpha; the first 255
/// components become instance ids 1.., anything beyond that is dropped.
fn mask_from_alpha(img: &image::RgbaImage) -> InstanceMask {
    let (width, height) = img.dimensions();
    let mut binary = GrayImage::new(width, height);
    for (x, y, pixel) in img.enumerate_pixels() {
        if pixel[3] != 0 {
            binary.put_pixel(x, y, Luma([255u8]));
        }
    }

    let labeled = connected_components(&binary, Connectivity::Eight, Luma([0u8]));

    let mut mask = InstanceMask::empty(width, height);
    let mut id_of_label: std::collections::HashMap<u32, u8> = std::collections::HashMap::new();
    let mut next_id = 1u16;

    for (x, y, label) in labeled.enumerate_pixels() {
        let label_val = label[0];
        if label_val == 0 {
            continue;
        }
        let id = *id_of_label.entry(label_val).or_insert_with(|| {
            if next_id > 255 {
                return 0;
            }
            let id = next_id as u8;
            next_id += 1;
            id
        });
        if id != 0 {
            mask.set(x, y, id);
        }
    }

    mask
}

/// Wrap the outline path in a minimal stroked SVG document.
fn outline_svg(path: &stickerlab::OutlinePath, width: u32, height: u32) -> String {
    format!(
        concat!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" ",
            "width=\"{w}\" height=\"{h}\" viewBox=\"0 0 {w} {h}\">\n",
            "  <path d=\"{d}\" fill=\"none\" stroke=\"white\" stroke-width=\"4\" ",
            "stroke-linejoin=\"round\"/>\n",
            "</svg>\n"
        ),
        w = width,
        h = height,
        d = path.to_svg_path(width as f32, height as f32),
    )
}
