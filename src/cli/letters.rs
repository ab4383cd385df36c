use std::path::Path;

use color_eyre::eyre::{self, WrapErr};
use fontlib::{Bounds, ImageGenerator};
use log::info;
use prettytable::{format, row, Cell, Row, Table};

use super::opt::LettersOpts;

/// Export every letter of the script into `opt.out`
pub fn run(opt: &LettersOpts) -> eyre::Result<()> {
    let script = opt.script().wrap_err("Failed to load letter script")?;
    let gen = script.generator();
    info!(
        "Using {} at {}px on {}x{} images",
        gen.font_file().display(),
        gen.font_size(),
        gen.image_size(),
        gen.image_size()
    );

    std::fs::create_dir_all(&opt.out)
        .wrap_err_with(|| format!("Failed to create folder `{}`", opt.out.display()))?;

    let mut labels = Vec::new();
    for letter in script.letters().chars() {
        let bounds = export(&gen, letter, &opt.out)?;
        labels.push((letter, bounds));
    }
    print_labels(&labels);
    Ok(())
}

fn export(gen: &ImageGenerator, letter: char, out: &Path) -> eyre::Result<Bounds> {
    let text = letter.to_string();
    let image_file = out.join(format!("{}.png", letter));
    let text_file = out.join(format!("{}.txt", letter));
    let bounds = gen
        .to_image(&text, &image_file, &text_file)
        .wrap_err_with(|| format!("Failed to export letter {:?}", letter))?;
    info!("Saved {}", image_file.display());
    Ok(bounds)
}

fn print_labels(labels: &[(char, Bounds)]) {
    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_NO_LINESEP_WITH_TITLE);
    table.set_titles(row!["Letter", "x1", "y1", "x2", "y2"]);
    for (letter, bounds) in labels {
        table.add_row(Row::new(vec![
            Cell::new(&letter.to_string()),
            Cell::new(&format!("{:.2}", bounds.x1)),
            Cell::new(&format!("{:.2}", bounds.y1)),
            Cell::new(&format!("{:.2}", bounds.x2)),
            Cell::new(&format!("{:.2}", bounds.y2)),
        ]));
    }
    table.printstd();
}
