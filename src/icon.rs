//! Choosing the icon to show for an executable.

use crate::bitmap::IconImage;

/// Picks the tallest non-degenerate image.
///
/// When several images share the greatest height, the first one wins. Returns `None` if no
/// image has pixels.
///
/// # Examples
///
/// ```rust
/// use bottlescope::bitmap::{IconImage, ImageSource};
/// use bottlescope::icon::select_best_icon;
///
/// let icon = |size: u32| {
///     IconImage::new(size, size, vec![0; (size * size * 4) as usize], ImageSource::Dib)
/// };
/// let best = select_best_icon([8, 32, 16].into_iter().filter_map(icon)).unwrap();
/// assert_eq!(best.height(), 32);
/// ```
pub fn select_best_icon<I>(images: I) -> Option<IconImage>
where
    I: IntoIterator<Item = IconImage>,
{
    let mut best: Option<IconImage> = None;

    for image in images.into_iter().filter(|image| !image.is_degenerate()) {
        match &best {
            Some(current) if current.height() >= image.height() => {}
            _ => best = Some(image),
        }
    }

    best
}
