use std::io::Write;

use anyhow::{Context, Result};
use clap::Parser;
use gp_core::config::{ConvertConfig, Luma};
use gp_core::frame::GlyphGrid;
use gp_player::player::GlyphPlayer;
use gp_player::ticker::{CancelToken, run_push_loop};
use gp_source::image::ImageSource;
use gp_source::video::VideoSource;

pub mod cli;

fn main() -> Result<()> {
    // 1. Parser CLI
    let cli = cli::Cli::parse();

    // 2. Initialiser le logging
    env_logger::Builder::new()
        .filter_level(cli.log_level.parse().unwrap_or(log::LevelFilter::Warn))
        .init();

    // 3. Valider la source
    cli.validate_source()?;

    // 4. Charger la config + overrides CLI
    let config = resolve_config(&cli)?;
    let mut player = GlyphPlayer::new(config)?;

    // 5. Image : conversion one-shot, impression directe
    if let Some(ref path) = cli.image {
        let source = ImageSource::open(path)?;
        player.set_image(Box::new(source))?;
        print!("{}", player.frame()?.to_text());
        player.destroy();
        return Ok(());
    }

    // 6. Vidéo : boucle push cadencée au fps natif, Ctrl-C annule
    if let Some(ref path) = cli.video {
        let source = VideoSource::open(path)?;
        player.set_video(Box::new(source))?;

        let token = CancelToken::new();
        let handler_token = token.clone();
        ctrlc::set_handler(move || handler_token.cancel())
            .context("Impossible d'installer le handler Ctrl-C")?;

        player.play(Some(Box::new(print_grid)))?;
        run_push_loop(&mut player, &token);
        player.destroy();
    }

    Ok(())
}

/// Rend une grille sur stdout, curseur ramené en haut à gauche entre deux
/// frames pour un rendu stable sans dépendance terminal.
fn print_grid(grid: &GlyphGrid) {
    let mut out = std::io::stdout().lock();
    let _ = write!(out, "\x1b[H\x1b[2J{}", grid.to_text());
    let _ = out.flush();
}

/// Resolve config: file (if given) merged over defaults, then CLI overrides.
fn resolve_config(cli: &cli::Cli) -> Result<ConvertConfig> {
    let mut config = match cli.config {
        Some(ref path) => gp_core::config::load_config(path)?,
        None => ConvertConfig::default(),
    };

    if let Some(ref chars) = cli.chars {
        config.chars.clone_from(chars);
    }
    if let Some(step) = cli.step {
        config.step = step;
    }
    if let Some(threshold) = cli.threshold {
        config.threshold = Some(threshold);
    }
    if cli.invert {
        config.invert = true;
    }
    if cli.weighted {
        config.luma = Luma::Weighted;
    }

    config
        .validate()
        .context("Configuration invalide après overrides CLI")?;
    Ok(config)
}
