use std::path::Path;

use color_eyre::eyre::{self, WrapErr};
use fontlib::{Char, Font};
use image::DynamicImage;
use log::info;

use super::opt::RenderOpts;

fn load_image(path: &Path) -> eyre::Result<DynamicImage> {
    image::open(path).wrap_err_with(|| format!("Failed to load image `{}`", path.display()))
}

/// Render a single character, apply the requested steps and save it
pub fn run(opt: &RenderOpts) -> eyre::Result<Char> {
    let font = Font::open(&opt.font, opt.size)
        .wrap_err_with(|| format!("Failed to load font `{}`", opt.font.display()))?;
    let texture = opt.texture.as_deref().map(load_image).transpose()?;
    let color = opt.color.map(|c| c.0);

    let mut ch = Char::from_font(
        opt.ch,
        &font,
        (opt.canvas.0, opt.canvas.1),
        color,
        texture.as_ref(),
    )
    .wrap_err_with(|| format!("Failed to render {:?}", opt.ch))?;
    info!("Rendered {:?} into {}", opt.ch, ch.rect());

    if let Some(path) = &opt.background {
        let background = load_image(path)?;
        ch = ch.add_background(&background);
    }
    if let Some(kernel) = opt.blur {
        ch = ch.blur((kernel.0, kernel.1));
    }
    if let Some(rect) = &opt.warp {
        ch = ch.apply_homography(rect)?;
        info!("Warped {:?} onto {}", opt.ch, rect);
    }

    ch.save(&opt.out)
        .wrap_err_with(|| format!("Failed to save `{}`", opt.out.display()))?;
    info!("Saved {}", opt.out.display());
    Ok(ch)
}
