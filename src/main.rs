use std::{
    io::{Read, Seek},
    path::{Path, PathBuf},
};

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use itertools::Itertools;
use tracing::info;
use tracing_subscriber::EnvFilter;

use dewad::{
    blob::SoundLayout, extract::DEFAULT_MAX_LUMP_SIZE, sink::DirectorySink, BlobSink, Classifier,
    ExtractOptions, Extractor, GameVariant, SectionState, SoundCatalog, Wad,
};

#[derive(Debug, Parser)]
#[command(name = "dewad")]
struct Cli {
    /// WAD file to read
    wad_path: PathBuf,
    /// Game the WAD belongs to; guessed from the file name when omitted
    #[arg(long, value_enum)]
    game: Option<GameVariant>,
    /// Directory extracted files are written to
    #[arg(short, long, default_value = ".")]
    output: PathBuf,
    /// Extra sound effect label, matched as a name prefix (repeatable)
    #[arg(long = "extra-sound", value_name = "NAME")]
    extra_sounds: Vec<String>,
    #[arg(short, long)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// List the lumps of the WAD and how each is classified
    List,
    /// Extracts palettes, music, sounds, flats and pictures
    ExtractAll(ExtractArgs),
    /// Copies a lump verbatim
    #[command(arg_required_else_help = true)]
    ExtractRaw { entry_name: String },
}

#[derive(Debug, Args)]
struct ExtractArgs {
    #[arg(long)]
    no_palettes: bool,
    #[arg(long)]
    no_music: bool,
    #[arg(long)]
    no_sounds: bool,
    #[arg(long)]
    no_flats: bool,
    #[arg(long)]
    no_pictures: bool,
    /// Palettes to read from PLAYPAL (default: all it holds)
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    palette_count: Option<u32>,
    #[arg(long, default_value_t = 8)]
    sound_header_size: usize,
    /// Padding bytes around sound samples, stripped from both ends
    #[arg(long, default_value_t = 0)]
    sound_padding: usize,
    #[arg(long, default_value_t = DEFAULT_MAX_LUMP_SIZE)]
    max_lump_size: usize,
}

impl ExtractArgs {
    fn options(&self) -> ExtractOptions {
        ExtractOptions {
            palettes: !self.no_palettes,
            music: !self.no_music,
            sounds: !self.no_sounds,
            flats: !self.no_flats,
            pictures: !self.no_pictures,
            palette_count: self.palette_count.map(|n| n as usize),
            sound: SoundLayout {
                header_size: self.sound_header_size,
                leading_padding: self.sound_padding,
                trailing_padding: self.sound_padding,
            },
            max_lump_size: self.max_lump_size,
        }
    }
}

fn detect_game(path: &Path) -> GameVariant {
    let name = path
        .file_name()
        .map(|s| s.to_string_lossy().to_ascii_uppercase())
        .unwrap_or_default();

    if name.starts_with("HERETIC") {
        GameVariant::Heretic
    } else if name.starts_with("HEXEN") {
        GameVariant::Hexen
    } else if name.starts_with("STRIFE") {
        GameVariant::Strife
    } else {
        GameVariant::Doom
    }
}

fn list<R: Read + Seek>(wad: &Wad<R>, classifier: &Classifier) {
    let mut state = SectionState::default();

    println!(
        "{} lumps, classified as {:?}",
        wad.lumps().len(),
        classifier.game()
    );
    println!("+----------+------------+------------+-----------+");
    println!("| name     |     offset |       size | kind      |");
    println!("+----------+------------+------------+-----------+");
    let kinds = wad
        .lumps()
        .iter()
        .map(|e| {
            let (kind, next) = classifier.classify(&e.name, state);
            state = next;
            let kind_name = format!("{:?}", kind);
            println!(
                "| {:8} | {:-10} | {:-10} | {:9} |",
                e.name, e.offset, e.size, kind_name
            );
            kind
        })
        .collect_vec();
    println!("+----------+------------+------------+-----------+");

    for (kind, count) in kinds.into_iter().counts().into_iter().sorted() {
        println!("{:?}: {}", kind, count);
    }
}

fn extract_all<R: Read + Seek>(
    wad: &mut Wad<R>,
    classifier: &Classifier,
    output: &Path,
    args: &ExtractArgs,
) -> anyhow::Result<()> {
    let options = args.options();
    let mut images = DirectorySink::new(output)
        .with_context(|| format!("cannot create `{}`", output.display()))?;
    let mut blobs = images.clone();

    let summary = Extractor::new(classifier, &options).run(wad, &mut images, &mut blobs);

    println!("palettes extracted: {}", summary.palettes);
    println!("music files extracted: {}", summary.music);
    println!("sound files extracted: {}", summary.sounds);
    println!("images extracted: {}", summary.images());

    if !summary.failures.is_empty() {
        println!("failed lumps ({}):", summary.failures.len());
        for f in &summary.failures {
            println!("  #{} `{}` ({:?}): {}", f.index, f.name, f.kind, f.error);
        }
        info!(
            "failed: {}",
            summary.failures.iter().map(|f| f.name.as_str()).join(", ")
        );
    }

    Ok(())
}

fn extract_raw<R: Read + Seek>(
    wad: &mut Wad<R>,
    output: &Path,
    entry_name: &str,
) -> anyhow::Result<()> {
    let data = wad.read_raw(entry_name, DEFAULT_MAX_LUMP_SIZE)?;

    let mut sink = DirectorySink::new(output)?;
    sink.write_blob(entry_name, "lmp", &data)?;

    println!(
        "Extracted to `{}`",
        sink.path_for(entry_name, "lmp").display()
    );

    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    let game = cli.game.unwrap_or_else(|| detect_game(&cli.wad_path));
    info!(?game, "reading `{}`", cli.wad_path.display());

    let mut wad = Wad::open(&cli.wad_path)
        .with_context(|| format!("failed to read `{}`", cli.wad_path.display()))?;

    let mut sounds = SoundCatalog::for_game(game);
    sounds.extend(cli.extra_sounds.iter().cloned());
    let classifier = Classifier::with_sounds(game, sounds);

    match &cli.command {
        Commands::List => list(&wad, &classifier),
        Commands::ExtractAll(args) => extract_all(&mut wad, &classifier, &cli.output, args)?,
        Commands::ExtractRaw { entry_name } => extract_raw(&mut wad, &cli.output, entry_name)?,
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn game_is_guessed_from_file_name() {
        assert_eq!(detect_game(Path::new("/games/HERETIC1.WAD")), GameVariant::Heretic);
        assert_eq!(detect_game(Path::new("hexen.wad")), GameVariant::Hexen);
        assert_eq!(detect_game(Path::new("STRIFE1.WAD")), GameVariant::Strife);
        assert_eq!(detect_game(Path::new("DOOM2.WAD")), GameVariant::Doom);
        assert_eq!(detect_game(Path::new("heretic/DOOM.WAD")), GameVariant::Doom);
    }

    #[test]
    fn flags_map_to_options() {
        let cli = Cli::parse_from([
            "dewad",
            "DOOM.WAD",
            "extract-all",
            "--no-music",
            "--palette-count",
            "14",
            "--sound-padding",
            "16",
        ]);
        let Commands::ExtractAll(args) = cli.command else {
            panic!("expected extract-all");
        };
        let options = args.options();
        assert!(!options.music);
        assert!(options.sounds);
        assert_eq!(options.palette_count, Some(14));
        assert_eq!(options.sound.leading_padding, 16);
        assert_eq!(options.sound.header_size, 8);
    }

    #[test]
    fn cli_is_well_formed() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
