//! Image lookup for the needle and the label icon.
//!
//! A name is tried as a path first, then inside the bundled image directory,
//! then (for the needle) as the bundled default compiled into the binary.
//! Failure is reported to the caller that wrote the property, never in the
//! middle of a redraw.

use std::collections::HashMap;
use std::fmt;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use crate::config::DEFAULT_NEEDLE_IMAGE;
use crate::error::GaugeError;
use crate::geometry::Size;

/// The default needle, embedded so the binary finds it from any directory.
pub const EMBEDDED_NEEDLE: &[u8] = include_bytes!("../assets/images/needle.png");

/// Path prefix of images served from embedded bytes.
const EMBEDDED_PREFIX: &str = "embedded:";

/// A resolved image: where to load it from and its pixel size. Embedded
/// images carry their PNG bytes.
#[derive(Clone, PartialEq)]
pub struct ImageSource {
    pub path: PathBuf,
    pub size: Size,
    pub bytes: Option<&'static [u8]>,
}

impl ImageSource {
    pub fn file(path: impl Into<PathBuf>, size: Size) -> Self {
        Self {
            path: path.into(),
            size,
            bytes: None,
        }
    }

    /// An image compiled into the binary. The size comes from its header.
    pub fn embedded(name: &str, bytes: &'static [u8]) -> Result<Self, GaugeError> {
        Ok(Self {
            path: PathBuf::from(format!("{EMBEDDED_PREFIX}{name}")),
            size: png_header_size(bytes)?,
            bytes: Some(bytes),
        })
    }

    pub fn is_embedded(&self) -> bool {
        self.bytes.is_some()
    }
}

impl fmt::Debug for ImageSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageSource")
            .field("path", &self.path)
            .field("size", &self.size)
            .field("embedded", &self.is_embedded())
            .finish()
    }
}

/// Embedded bytes for a bundled image name.
fn embedded_image(name: &str) -> Option<&'static [u8]> {
    (name == DEFAULT_NEEDLE_IMAGE).then_some(EMBEDDED_NEEDLE)
}

pub trait ResourceResolver {
    /// Resolves `name`, falling back to the bundled `fallback` image if
    /// given.
    fn resolve(&self, name: &str, fallback: Option<&str>) -> Result<ImageSource, GaugeError>;
}

/// Images on disk, with a directory of bundled images.
#[derive(Debug, Clone)]
pub struct ImageDirectory {
    bundled: PathBuf,
}

impl ImageDirectory {
    pub fn new(bundled: impl Into<PathBuf>) -> Self {
        Self {
            bundled: bundled.into(),
        }
    }

    /// The `assets/images` directory shipped with the crate.
    pub fn bundled() -> Self {
        Self::new(concat!(env!("CARGO_MANIFEST_DIR"), "/assets/images"))
    }

    fn candidates(&self, name: &str, fallback: Option<&str>) -> Vec<PathBuf> {
        let mut paths = Vec::with_capacity(3);
        if !name.is_empty() {
            paths.push(PathBuf::from(name));
            paths.push(self.bundled.join(name));
        }
        if let Some(fallback) = fallback {
            paths.push(self.bundled.join(fallback));
        }
        paths
    }
}

impl Default for ImageDirectory {
    fn default() -> Self {
        Self::bundled()
    }
}

impl ResourceResolver for ImageDirectory {
    fn resolve(&self, name: &str, fallback: Option<&str>) -> Result<ImageSource, GaugeError> {
        if let Some(path) = self
            .candidates(name, fallback)
            .into_iter()
            .find(|p| p.is_file())
        {
            if path.file_name() != Path::new(name).file_name() {
                log::debug!("image {name:?} resolved to fallback {}", path.display());
            }
            let size = png_size(&path)?;
            return Ok(ImageSource::file(path, size));
        }
        let embedded = std::iter::once(name)
            .chain(fallback)
            .find_map(|n| embedded_image(n).map(|bytes| (n, bytes)));
        match embedded {
            Some((n, bytes)) => {
                log::debug!("image {name:?} resolved to embedded {n:?}");
                ImageSource::embedded(n, bytes)
            }
            None => Err(GaugeError::ResourceNotFound {
                name: name.to_string(),
            }),
        }
    }
}

/// Reads the pixel size from a PNG header.
pub fn png_size(path: &Path) -> Result<Size, GaugeError> {
    png_header_size(BufReader::new(File::open(path)?))
}

fn png_header_size(reader: impl Read) -> Result<Size, GaugeError> {
    let reader = png::Decoder::new(reader).read_info()?;
    let info = reader.info();
    Ok(Size::new(f64::from(info.width), f64::from(info.height)))
}

/// Images registered by name with known sizes; nothing touches the disk.
/// For hosts that manage their own textures, and for tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryImages {
    images: HashMap<String, Size>,
}

impl MemoryImages {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_image(mut self, name: impl Into<String>, size: Size) -> Self {
        self.images.insert(name.into(), size);
        self
    }
}

impl ResourceResolver for MemoryImages {
    fn resolve(&self, name: &str, fallback: Option<&str>) -> Result<ImageSource, GaugeError> {
        std::iter::once(name)
            .chain(fallback)
            .find_map(|n| {
                self.images
                    .get(n)
                    .map(|size| ImageSource::file(n, *size))
            })
            .ok_or_else(|| GaugeError::ResourceNotFound {
                name: name.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_dir(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "speedmeter-images-{tag}-{}",
            std::process::id()
        ));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn bundled_needle_is_found_by_name() {
        let images = ImageDirectory::bundled();
        let needle = images.resolve(DEFAULT_NEEDLE_IMAGE, None).unwrap();
        assert!(needle.path.ends_with("assets/images/needle.png"));
        assert!(needle.size.width > 0.0 && needle.size.height > 0.0);
    }

    #[test]
    fn missing_needle_falls_back_to_default() {
        let images = ImageDirectory::bundled();
        let needle = images
            .resolve("no-such-needle.png", Some(DEFAULT_NEEDLE_IMAGE))
            .unwrap();
        assert!(needle.path.ends_with("needle.png"));
    }

    #[test]
    fn missing_icon_is_reported() {
        let images = ImageDirectory::bundled();
        assert!(matches!(
            images.resolve("no-such-icon.png", None),
            Err(GaugeError::ResourceNotFound { name }) if name == "no-such-icon.png"
        ));
    }

    #[test]
    fn default_needle_is_embedded_when_no_directory_has_it() {
        let dir = empty_dir("default");
        let images = ImageDirectory::new(&dir);
        let needle = images
            .resolve("no-such-needle.png", Some(DEFAULT_NEEDLE_IMAGE))
            .unwrap();
        assert!(needle.is_embedded());
        assert_eq!(needle.size, Size::new(128.0, 128.0));

        let by_name = images.resolve(DEFAULT_NEEDLE_IMAGE, None).unwrap();
        assert_eq!(by_name, needle);
        assert!(images.resolve("no-such-icon.png", None).is_err());
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn files_on_disk_win_over_embedded_bytes() {
        let needle = ImageDirectory::bundled()
            .resolve(DEFAULT_NEEDLE_IMAGE, None)
            .unwrap();
        assert!(!needle.is_embedded());
    }

    #[test]
    fn memory_images_resolve_without_disk() {
        let images = MemoryImages::new().with_image("needle.png", Size::new(32.0, 32.0));
        let needle = images.resolve("other.png", Some("needle.png")).unwrap();
        assert_eq!(needle.size, Size::new(32.0, 32.0));
        assert!(images.resolve("other.png", None).is_err());
    }
}
