use clap::{Parser, Subcommand};
use color_eyre::eyre;

use glyph_synth::cli::{
    self,
    opt::{LettersOpts, RenderOpts},
};

#[derive(Parser, Debug)]
/// Generate synthetic character images from fonts
struct Options {
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Export one labeled image per letter
    Letters(LettersOpts),
    /// Render and transform a single character
    Render(RenderOpts),
}

fn main() -> eyre::Result<()> {
    let opt: Options = cli::init()?;
    match &opt.command {
        Command::Letters(opts) => cli::letters::run(opts),
        Command::Render(opts) => cli::render::run(opts).map(|_| ()),
    }
}
