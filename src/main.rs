use std::error::Error;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use log::info;

use prompt_guide::builder::{PdfBuilder, RenderOptions, DEFAULT_FOOTER_TEXT};
use prompt_guide::content::{self, ContentOptions, DEFAULT_OUTPUT_PATH};
use prompt_guide::fonts;
use prompt_guide::style::{parse_hex_color, Palette};

/// Renders the "5 Prompts IA pour Entrepreneurs Pressés" guide.
///
/// Fonts (LiberationSans and LiberationMono) are looked up in `PROMPT_GUIDE_FONTS_DIR`, next to
/// the executable under `assets/fonts`, in the crate's `assets/fonts`, then in the usual system
/// font directories.
#[derive(Parser)]
#[command(author, version, about = "Renders the Ezia prompt guide to PDF")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render the guide to a PDF file.
    Render(RenderArgs),

    /// Print the ordered list of rendering instructions without touching fonts.
    Outline {
        /// Include the recap table page.
        #[arg(long)]
        summary_table: bool,
    },

    /// Report where the font families are found.
    #[command(aliases = ["check-fonts"])]
    Fonts,
}

#[derive(Args)]
struct RenderArgs {
    /// Destination file; parent directories are created.
    #[arg(short, long, env = "PROMPT_GUIDE_OUTPUT", default_value = DEFAULT_OUTPUT_PATH)]
    output: PathBuf,

    /// Heading color as #RRGGBB.
    #[arg(long, value_parser = parse_hex_color)]
    primary_color: Option<genpdf::style::Color>,

    /// Footer text printed on every page.
    #[arg(long, default_value = DEFAULT_FOOTER_TEXT)]
    footer: String,

    /// Keep emoji in the output even though the fonts cannot draw them.
    #[arg(long)]
    keep_pictographs: bool,

    /// Add a page with a table summarising the time saved by each prompt.
    #[arg(long)]
    summary_table: bool,

    /// Add a PDF outline with one entry per section (requires the `bookmarks` feature).
    #[arg(long)]
    bookmarks: bool,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Render(args) => render(args),
        Commands::Outline { summary_table } => outline(summary_table),
        Commands::Fonts => report_fonts(),
    };

    if let Err(err) = result {
        eprintln!("Error: {}", err);
        print_error_sources(err.as_ref());
        std::process::exit(1);
    }
}

fn render(args: RenderArgs) -> Result<(), Box<dyn Error>> {
    let guide = content::lead_magnet_guide(&ContentOptions {
        summary_table: args.summary_table,
    })?;

    let mut palette = Palette::default();
    if let Some(primary) = args.primary_color {
        palette = palette.with_primary(primary);
    }
    let options = RenderOptions {
        palette,
        footer_text: args.footer,
        keep_pictographs: args.keep_pictographs,
    };

    let builder = PdfBuilder::new(guide).with_options(options);
    let rendered = if args.bookmarks {
        render_with_bookmarks(&builder)?
    } else {
        builder.render()?
    };
    rendered.write_to(&args.output)?;

    info!("{} pages", rendered.page_count);
    println!("✅ PDF généré avec succès : {}", args.output.display());
    Ok(())
}

#[cfg(feature = "bookmarks")]
fn render_with_bookmarks(
    builder: &PdfBuilder,
) -> Result<prompt_guide::builder::RenderedGuide, Box<dyn Error>> {
    Ok(builder.render_with_bookmarks()?)
}

#[cfg(not(feature = "bookmarks"))]
fn render_with_bookmarks(
    _builder: &PdfBuilder,
) -> Result<prompt_guide::builder::RenderedGuide, Box<dyn Error>> {
    Err(std::io::Error::new(
        std::io::ErrorKind::Other,
        "Enable the `bookmarks` feature to render bookmarked output",
    )
    .into())
}

fn outline(summary_table: bool) -> Result<(), Box<dyn Error>> {
    let guide = content::lead_magnet_guide(&ContentOptions { summary_table })?;
    for item in guide.story() {
        println!("{}", item);
    }
    Ok(())
}

fn report_fonts() -> Result<(), Box<dyn Error>> {
    for line in fonts::font_report() {
        println!("{}", line);
    }
    if fonts::guide_fonts_available() {
        Ok(())
    } else {
        Err(format!(
            "guide fonts are missing; see assets/fonts/README.md or set {}",
            fonts::FONTS_DIR_ENV
        )
        .into())
    }
}

fn print_error_sources(mut error: &(dyn Error + 'static)) {
    while let Some(source) = error.source() {
        eprintln!("  caused by: {}", source);
        error = source;
    }
}
