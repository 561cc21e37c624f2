//! Placeholder logo images referenced by the manifest.
//!
//! MSIX packages must ship the logos their manifest names. The packager only
//! needs them to exist, so they are solid-colour squares, or zero-byte files
//! when the crate is built without the `placeholder-images` feature.

use camino::Utf8Path;
use log::{debug, warn};
use std::fs;

/// Subdirectory of the staging directory that holds the images.
pub const IMAGES_DIR: &str = "Images";

/// RGBA fill colour of rendered placeholders.
pub const PLACEHOLDER_COLOUR: [u8; 4] = [0, 120, 212, 255];

/// A placeholder image the manifest expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaceholderImage {
    /// File name inside [`IMAGES_DIR`].
    pub file_name: &'static str,
    /// Width and height in pixels.
    pub size: u32,
}

/// The three placeholder images, in the order they are written.
pub const PLACEHOLDER_IMAGES: [PlaceholderImage; 3] = [
    PlaceholderImage {
        file_name: "AppList.png",
        size: 44,
    },
    PlaceholderImage {
        file_name: "MedTile.png",
        size: 150,
    },
    PlaceholderImage {
        file_name: "StoreLogo.png",
        size: 50,
    },
];

/// How the placeholder images were produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetMode {
    /// Solid-colour PNGs at the required sizes.
    Rendered,
    /// Zero-byte files; the imaging backend is not compiled in.
    Empty,
}

impl AssetMode {
    /// The mode this build of the crate produces.
    #[must_use]
    pub const fn available() -> Self {
        if cfg!(feature = "placeholder-images") {
            Self::Rendered
        } else {
            Self::Empty
        }
    }
}

/// Writes the placeholder images under `<output_dir>/Images`.
///
/// Never fails: problems are logged and a rendered image that cannot be
/// written falls back to a zero-byte file.
pub fn write_placeholder_images(output_dir: &Utf8Path) -> AssetMode {
    let images_dir = output_dir.join(IMAGES_DIR);
    if let Err(e) = fs::create_dir_all(&images_dir) {
        warn!("could not create {images_dir}: {e}");
    }

    let mode = AssetMode::available();
    if mode == AssetMode::Empty {
        debug!("image rendering not compiled in; writing empty placeholders");
    }

    for image in PLACEHOLDER_IMAGES {
        let path = images_dir.join(image.file_name);
        write_placeholder(&path, image, mode);
    }

    mode
}

fn write_placeholder(path: &Utf8Path, image: PlaceholderImage, mode: AssetMode) {
    if mode == AssetMode::Rendered {
        match render(path, image.size) {
            Ok(()) => {
                debug!("created image {path}");
                return;
            }
            Err(e) => warn!("could not render {path}: {e}; writing an empty placeholder"),
        }
    }

    match fs::write(path, b"") {
        Ok(()) => debug!("created empty placeholder {path}"),
        Err(e) => warn!("could not write placeholder {path}: {e}"),
    }
}

#[cfg(feature = "placeholder-images")]
fn render(path: &Utf8Path, size: u32) -> Result<(), image::ImageError> {
    image::RgbaImage::from_pixel(size, size, image::Rgba(PLACEHOLDER_COLOUR)).save(path)
}

#[cfg(not(feature = "placeholder-images"))]
fn render(_path: &Utf8Path, _size: u32) -> std::io::Result<()> {
    Err(std::io::Error::new(
        std::io::ErrorKind::Unsupported,
        "image rendering is not compiled in",
    ))
}
