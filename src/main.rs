use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use arboard::Clipboard;
use clap::{value_parser, Arg, ArgAction, ArgGroup, Command, ValueEnum};
use image::{imageops::FilterType, DynamicImage, Rgba, RgbaImage};
use log::LevelFilter;
use minifb::{Key, KeyRepeat, ScaleMode, Window, WindowOptions};

use img2pixels::export::{encode, export_filename, ExportFormat};
use img2pixels::{parse_hex_color, render, RenderParameters};

#[derive(ValueEnum, Clone, Debug)]
enum OutputFormat {
    Png,
    Jpeg,
}

fn main() -> Result<()> {
    let matches = Command::new("img2pixels")
        .version("0.1")
        .about("Pixelize the input image into coarse blocks, with an optional counting grid.")
        .arg(
            Arg::new("input")
                .help("Sets the input image file to use")
                .value_name("FILE")
                .index(1),
        )
        .arg(
            Arg::new("clipboard")
                .long("clipboard")
                .help("Read the input image from the system clipboard instead of a file")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .value_name("FILE")
                .value_parser(value_parser!(PathBuf))
                .help("Sets an optional output file"),
        )
        .arg(
            Arg::new("block_size")
                .short('b')
                .long("block-size")
                .help("Side length of one pixelized block, in source pixels")
                .value_name("UINT")
                .value_parser(value_parser!(u32).range(1..=100))
                .default_value("10"),
        )
        .arg(
            Arg::new("scale")
                .short('s')
                .long("scale")
                .help("Multiplier applied to the native dimensions of the output")
                .value_name("FLOAT")
                .value_parser(parse_scale)
                .default_value("1.0"),
        )
        .arg(
            Arg::new("no_grid")
                .long("no-grid")
                .help("Disable the grid overlay")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("grid_step")
                .long("grid-step")
                .help("Grid spacing in pre-scale pixels; unbinds the step from the block size")
                .value_name("UINT")
                .value_parser(value_parser!(u32).range(1..)),
        )
        .arg(
            Arg::new("grid_color")
                .long("grid-color")
                .help("Grid line color as a hex color")
                .value_name("HEX")
                .value_parser(parse_color)
                .default_value("#000000"),
        )
        .arg(
            Arg::new("grid_opacity")
                .long("grid-opacity")
                .help("Grid opacity between 0.0 and 1.0")
                .value_name("FLOAT")
                .value_parser(parse_opacity)
                .default_value("0.5"),
        )
        .arg(
            Arg::new("bg_color")
                .long("bg-color")
                .help("Background color as a hex color")
                .value_name("HEX")
                .value_parser(parse_color)
                .default_value("#ffffff"),
        )
        .arg(
            Arg::new("format")
                .short('f')
                .long("format")
                .help("Export format. Defaults to the output file extension, or png.")
                .value_name("OutputFormat")
                .value_parser(value_parser!(OutputFormat)),
        )
        .arg(
            Arg::new("show")
                .long("show")
                .help("Display the result in a window and edit the parameters interactively")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Prints debug information verbosely.")
                .action(ArgAction::SetTrue),
        )
        .group(ArgGroup::new("source").args(["input", "clipboard"]).required(true))
        .get_matches();

    let verbose = *matches.get_one::<bool>("verbose").unwrap_or(&false);
    env_logger::Builder::new()
        .filter_level(if verbose { LevelFilter::Debug } else { LevelFilter::Warn })
        .parse_default_env()
        .init();

    let source = if *matches.get_one::<bool>("clipboard").unwrap_or(&false) {
        load_from_clipboard()?
    } else {
        let input = matches.get_one::<String>("input").unwrap(); // the source group guarantees it
        println!("Using input file: {input}");
        image::open(Path::new(input)).with_context(|| format!("failed to decode {input}"))?
    };

    let mut params = RenderParameters::new();
    params.set_block_size(*matches.get_one::<u32>("block_size").unwrap());
    params.set_scale(*matches.get_one::<f32>("scale").unwrap());
    params.set_grid_enabled(!matches.get_one::<bool>("no_grid").unwrap_or(&false));
    params.set_grid_color(*matches.get_one::<Rgba<u8>>("grid_color").unwrap());
    params.set_grid_opacity(*matches.get_one::<f32>("grid_opacity").unwrap());
    params.set_background_color(*matches.get_one::<Rgba<u8>>("bg_color").unwrap());
    if let Some(step) = matches.get_one::<u32>("grid_step") {
        params.set_bind_grid_to_block(false);
        params.set_grid_step(*step);
    }

    let output_path = matches.get_one::<PathBuf>("output").cloned();
    let format = match matches.get_one::<OutputFormat>("format") {
        Some(OutputFormat::Png) => ExportFormat::Png,
        Some(OutputFormat::Jpeg) => ExportFormat::Jpeg,
        None => output_path
            .as_deref()
            .and_then(|p| p.extension())
            .and_then(|e| e.to_str())
            .and_then(ExportFormat::from_extension)
            .unwrap_or(ExportFormat::Png),
    };

    if *matches.get_one::<bool>("show").unwrap_or(&false) {
        show(&source, params, format, output_path)
    } else {
        let buffer = render(Some(&source), &params);
        let path = output_path
            .unwrap_or_else(|| PathBuf::from(export_filename(params.block_size(), format)));
        save_buffer(&buffer, format, &path)?;
        println!("Saved {} ({}x{})", path.display(), buffer.width(), buffer.height());
        Ok(())
    }
}

fn parse_scale(s: &str) -> Result<f32, String> {
    let scale: f32 = s.parse().map_err(|_| format!("invalid scale {s:?}"))?;
    if scale < 0.0 {
        return Err("scale must be zero or positive".to_string());
    }
    Ok(scale)
}

fn parse_opacity(s: &str) -> Result<f32, String> {
    let opacity: f32 = s.parse().map_err(|_| format!("invalid opacity {s:?}"))?;
    if !(0.0..=1.0).contains(&opacity) {
        return Err("opacity must be between 0.0 and 1.0".to_string());
    }
    Ok(opacity)
}

fn parse_color(s: &str) -> Result<Rgba<u8>, String> {
    parse_hex_color(s).map_err(|e| e.to_string())
}

fn load_from_clipboard() -> Result<DynamicImage> {
    let mut clipboard = Clipboard::new().context("failed to open the system clipboard")?;
    let img = clipboard.get_image().context("no image on the clipboard")?;
    let (width, height) = (img.width as u32, img.height as u32);
    let buffer = RgbaImage::from_raw(width, height, img.bytes.into_owned())
        .context("clipboard image size does not match its pixel data")?;
    println!("Using clipboard image ({width}x{height})");
    Ok(DynamicImage::ImageRgba8(buffer))
}

fn save_buffer(buffer: &RgbaImage, format: ExportFormat, path: &Path) -> Result<()> {
    let bytes = encode(buffer, format)?;
    std::fs::write(path, bytes).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}

fn show(
    source: &DynamicImage,
    mut params: RenderParameters,
    format: ExportFormat,
    output: Option<PathBuf>,
) -> Result<()> {
    println!("Press ESC to quit.");
    println!("Press ENTER to alternate between input and pixelization.");
    println!("Press + and - to change the block size, [ and ] to change the grid step.");
    println!("Press G to toggle the grid, B to bind the grid step to the block size.");
    println!("Press S to save the pixelized image.");

    let mut buffer = render(Some(source), &params);
    let (width, height) = buffer.dimensions();
    let mut pixelized_view = to_argb(&buffer);
    let original_view =
        to_argb(&source.resize_exact(width, height, FilterType::Triangle).to_rgba8());

    let mut window = Window::new(
        "img2pixels",
        width as usize,
        height as usize,
        WindowOptions {
            resize: true,
            scale_mode: ScaleMode::AspectRatioStretch,
            ..WindowOptions::default()
        },
    )
    .context("failed to create the preview window")?;

    let mut show_original = false;
    while window.is_open() && !window.is_key_down(Key::Escape) {
        let mut dirty = false;
        if window.is_key_pressed(Key::Equal, KeyRepeat::Yes) {
            params.set_block_size((params.block_size() + 1).min(100));
            dirty = true;
        }
        if window.is_key_pressed(Key::Minus, KeyRepeat::Yes) {
            params.set_block_size(params.block_size().saturating_sub(1));
            dirty = true;
        }
        if window.is_key_pressed(Key::LeftBracket, KeyRepeat::Yes) {
            params.set_grid_step(params.grid_step().saturating_sub(1));
            dirty = true;
        }
        if window.is_key_pressed(Key::RightBracket, KeyRepeat::Yes) {
            params.set_grid_step(params.grid_step() + 1);
            dirty = true;
        }
        if window.is_key_pressed(Key::G, KeyRepeat::No) {
            params.set_grid_enabled(!params.grid_enabled());
            dirty = true;
        }
        if window.is_key_pressed(Key::B, KeyRepeat::No) {
            params.set_bind_grid_to_block(!params.bind_grid_to_block());
            dirty = true;
        }
        if window.is_key_pressed(Key::Enter, KeyRepeat::No) {
            show_original = !show_original;
        }
        if dirty {
            // every parameter change redraws the whole pipeline from the source
            buffer = render(Some(source), &params);
            pixelized_view = to_argb(&buffer);
        }
        if window.is_key_pressed(Key::S, KeyRepeat::No) {
            let path = output
                .clone()
                .unwrap_or_else(|| PathBuf::from(export_filename(params.block_size(), format)));
            match save_buffer(&buffer, format, &path) {
                Ok(()) => println!("Image saved to {}", path.display()),
                Err(e) => eprintln!("{e:#}"),
            }
        }
        let view = if show_original { &original_view } else { &pixelized_view };
        window
            .update_with_buffer(view, width as usize, height as usize)
            .context("failed to update the preview window")?;
    }

    Ok(())
}

fn to_argb(buffer: &RgbaImage) -> Vec<u32> {
    buffer
        .pixels()
        .map(|p| {
            let [r, g, b, _] = p.0;
            (r as u32) << 16 | (g as u32) << 8 | (b as u32) | 0xFF000000
        })
        .collect()
}
