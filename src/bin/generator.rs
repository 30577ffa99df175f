use std::path::PathBuf;
use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use image::GenericImageView;
use distance_field::prelude::*;

/// Generate a tiny signed distance field texture from a high resolution mask image.
/// Options are read from an optional JSON file first, then overridden by flags.
#[derive(Parser, Debug)]
#[command(name = "generator")]
struct Args {
    /// Source image, any format the image crate can decode
    source: PathBuf,

    /// Destination field file, replaced if it exists
    dest: PathBuf,

    /// JSON file with options, missing fields fall back to defaults
    #[arg(long)]
    config: Option<PathBuf>,

    /// Width of the field, 1 to 255
    #[arg(long)]
    width: Option<u32>,

    /// Height of the field, 1 to 255
    #[arg(long)]
    height: Option<u32>,

    /// Pixels brighter than this are inside the shape
    #[arg(short, long)]
    threshold: Option<u8>,

    /// Which channel of the source decides inside and outside
    #[arg(short, long, value_enum)]
    channel: Option<ChannelArg>,

    /// Half extent of the window searched around each cell, in source pixels
    #[arg(short, long)]
    radius: Option<u32>,

    /// Static scales by --max-distance, dynamic by the range of the field
    #[arg(short, long, value_enum)]
    normalization: Option<NormalizationArg>,

    /// Distance mapped to the brightest byte, implies static normalization
    #[arg(long)]
    max_distance: Option<f32>,

    /// Signed fields store inside cells below 128
    #[arg(short, long, value_enum)]
    sign: Option<SignArg>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ChannelArg { Luma, Alpha, Red }

#[derive(Clone, Copy, Debug, ValueEnum)]
enum NormalizationArg { Static, Dynamic }

#[derive(Clone, Copy, Debug, ValueEnum)]
enum SignArg { Signed, Unsigned }


fn main() -> Result<()> {
    let args = Args::parse();
    let options = options(&args)?;
    options.validate().context("invalid options")?;

    let source = image::open(&args.source)
        .map_err(Error::from)
        .with_context(|| format!("could not read source {}", args.source.display()))?;

    let (source_width, source_height) = source.dimensions();
    println!(
        "Generating {}x{} field from {} ({}x{} pixels)",
        options.width(), options.height(), args.source.display(),
        source_width, source_height
    );

    let mask = binary_piston_image::of_dynamic_image(&source, options.channel, options.threshold)
        .with_context(|| format!("could not classify {}", args.source.display()))?;

    // the decoded image is no longer needed during the search
    drop(source);

    if mask.is_uniform() {
        println!("Every source pixel is {}, all cells will saturate",
            if mask.is_inside(0, 0) { "inside" } else { "outside" });
    }

    let distances = search(mask, &options)?;

    let stats = distances.stats();
    println!("Distances range from {:.2} to {:.2}", stats.min_distance, stats.max_distance);

    let field = distances.quantize(options.normalization)?;

    field.save(&args.dest)
        .with_context(|| format!("could not write {}", args.dest.display()))?;

    println!("Written to {}", args.dest.display());
    Ok(())
}

/// The mask is consumed, so it is released as soon as all samples exist.
fn search(mask: SourceMask, options: &Options) -> Result<DistanceField<F32DistanceStorage>> {
    Ok(compute_f32_distance_field(&mask, options)?)
}

/// Defaults, then the config file, then the flags.
fn options(args: &Args) -> Result<Options> {
    let options = match &args.config {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("could not read config {}", path.display()))?;

            serde_json::from_str(&json)
                .with_context(|| format!("could not parse config {}", path.display()))?
        },

        None => Options::default(),
    };

    apply_flags(options, args)
}

fn apply_flags(mut options: Options, args: &Args) -> Result<Options> {
    if let Some(width) = args.width { options.size.0 = width; }
    if let Some(height) = args.height { options.size.1 = height; }
    if let Some(threshold) = args.threshold { options.threshold = threshold; }
    if let Some(radius) = args.radius { options.search_radius = radius; }

    if let Some(channel) = args.channel {
        options.channel = match channel {
            ChannelArg::Luma => Channel::Luma,
            ChannelArg::Alpha => Channel::Alpha,
            ChannelArg::Red => Channel::Red,
        };
    }

    if let Some(sign) = args.sign {
        options.sign = match sign {
            SignArg::Signed => SignConvention::Signed,
            SignArg::Unsigned => SignConvention::Unsigned,
        };
    }

    let current_max = match options.normalization {
        Normalization::Static { max_distance } => Some(max_distance),
        Normalization::Dynamic => None,
    };

    // switching to static without any maximum scales by the search window
    let max_distance = args.max_distance.or(current_max)
        .unwrap_or(options.search_radius as f32);

    options.normalization = match (args.normalization, args.max_distance) {
        (Some(NormalizationArg::Dynamic), Some(flag)) => anyhow::bail!(
            "--max-distance {} only applies to static normalization, but dynamic was requested", flag
        ),

        (Some(NormalizationArg::Dynamic), None) => Normalization::Dynamic,
        (Some(NormalizationArg::Static), _) | (None, Some(_)) => Normalization::Static { max_distance },
        (None, None) => options.normalization,
    };

    Ok(options)
}


#[cfg(test)]
mod tests {
    use super::*;

    fn parse(flags: &[&str]) -> Args {
        let mut arguments = vec![ "generator", "shape.png", "shape.dfield" ];
        arguments.extend_from_slice(flags);
        Args::try_parse_from(arguments).unwrap()
    }

    fn dynamic_config() -> Options {
        Options { size: (32, 16), threshold: 10, normalization: Normalization::Dynamic, ..Default::default() }
    }

    #[test]
    fn search_consumes_mask(){
        let mask = SourceMask::from_fn(16, 16, |x, _| x < 8).unwrap();
        let options = Options { size: (16, 16), search_radius: 16, ..Default::default() };
        let expected = compute_f32_distance_field(&mask, &options).unwrap();

        assert_eq!(search(mask, &options).unwrap(), expected);
    }

    #[test]
    fn without_flags_config_is_kept(){
        assert_eq!(apply_flags(Options::default(), &parse(&[])).unwrap(), Options::default());
        assert_eq!(apply_flags(dynamic_config(), &parse(&[])).unwrap(), dynamic_config());
    }

    #[test]
    fn flags_override_config(){
        let args = parse(&[
            "--width", "8", "-t", "200", "-c", "alpha", "-r", "12", "-s", "unsigned",
        ]);

        let options = apply_flags(dynamic_config(), &args).unwrap();
        assert_eq!(options.size, (8, 16));
        assert_eq!(options.threshold, 200);
        assert_eq!(options.channel, Channel::Alpha);
        assert_eq!(options.search_radius, 12);
        assert_eq!(options.sign, SignConvention::Unsigned);
        assert_eq!(options.normalization, Normalization::Dynamic);
    }

    #[test]
    fn static_maximum_falls_back_to_search_radius(){
        let options = apply_flags(dynamic_config(), &parse(&[ "-n", "static", "-r", "24" ])).unwrap();
        assert_eq!(options.normalization, Normalization::Static { max_distance: 24.0 });

        // an existing static maximum is kept instead
        let config = Options { normalization: Normalization::Static { max_distance: 7.0 }, ..Default::default() };
        let options = apply_flags(config, &parse(&[ "-n", "static", "-r", "24" ])).unwrap();
        assert_eq!(options.normalization, Normalization::Static { max_distance: 7.0 });
    }

    #[test]
    fn max_distance_implies_static(){
        let options = apply_flags(dynamic_config(), &parse(&[ "--max-distance", "50" ])).unwrap();
        assert_eq!(options.normalization, Normalization::Static { max_distance: 50.0 });

        let options = apply_flags(Options::default(), &parse(&[ "--max-distance", "50" ])).unwrap();
        assert_eq!(options.normalization, Normalization::Static { max_distance: 50.0 });
    }

    #[test]
    fn max_distance_conflicts_with_dynamic(){
        let args = parse(&[ "-n", "dynamic", "--max-distance", "50" ]);
        let error = apply_flags(Options::default(), &args).unwrap_err();
        assert!(error.to_string().contains("--max-distance 50"));
    }

    #[test]
    fn reads_config_file_before_flags(){
        let directory = tempfile::tempdir().unwrap();
        let path = directory.path().join("options.json");
        std::fs::write(&path, r#"{ "size": [16, 16], "normalization": "dynamic" }"#).unwrap();

        let config = path.to_str().unwrap();
        let merged = options(&parse(&[ "--config", config, "--height", "4" ])).unwrap();
        assert_eq!(merged.size, (16, 4));
        assert_eq!(merged.normalization, Normalization::Dynamic);

        assert!(options(&parse(&[ "--config", "missing.json" ])).is_err());
    }
}
