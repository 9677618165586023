//! Structs and functions for handling cubemap textures.
//!
//! The module provides the [`Cubemap`] struct which is a CPU representation of a GPU cubemap,
//! and the face naming and validation helpers used while uploading it.

use std::{
    fmt,
    path::{Path, PathBuf},
    sync::Arc,
};

use glow::HasContext;
use image::DynamicImage;

use crate::abs::Capabilities;
use crate::error::{DemoError, Result};

/// The six faces of a cubemap in upload order (`TEXTURE_CUBE_MAP_POSITIVE_X + index`).
pub const CUBE_FACES: [&str; 6] = ["right", "left", "top", "bottom", "front", "back"];

/// Decoded dimensions and channel count of one face.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FaceFormat {
    pub width: u32,
    pub height: u32,
    pub channels: u8,
}

impl FaceFormat {
    /// Checks this face against the first face of the cubemap.
    ///
    /// Every face must be square and share the first face's size and channel count.
    pub fn check_against(&self, first: &FaceFormat, face: usize) -> Result<()> {
        if self.width != self.height {
            return Err(DemoError::CubemapFaceNotSquare {
                face,
                format: *self,
            });
        }
        if self != first {
            return Err(DemoError::CubemapFaceMismatch {
                face,
                expected: *first,
                found: *self,
            });
        }
        Ok(())
    }
}

impl fmt::Display for FaceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{} with {} channels", self.width, self.height, self.channels)
    }
}

/// Where the face images of a cubemap live.
///
/// Face `i` is read from `<dir>/<prefix><name><i + 1>.<extension>`, so the right face of the
/// default source is `space_right1.jpg`.
#[derive(Clone, Debug)]
pub struct CubemapSource {
    pub dir: PathBuf,
    pub prefix: String,
    pub extension: String,
}

impl CubemapSource {
    pub fn new(dir: impl Into<PathBuf>, prefix: &str, extension: &str) -> Self {
        Self {
            dir: dir.into(),
            prefix: prefix.to_string(),
            extension: extension.to_string(),
        }
    }

    /// Returns the path of the face at `index` in [`CUBE_FACES`] order.
    pub fn face_path(&self, index: usize) -> PathBuf {
        self.dir.join(format!(
            "{}{}{}.{}",
            self.prefix,
            CUBE_FACES[index],
            index + 1,
            self.extension
        ))
    }
}

/// Pixel data of one decoded face, ready for upload.
struct FaceData {
    format: FaceFormat,
    gl_format: u32,
    internal_format: u32,
    pixels: Vec<u8>,
}

impl FaceData {
    fn decode(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path).map_err(|source| DemoError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let image = image::load_from_memory(&bytes).map_err(|e| DemoError::ImageDecode {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Ok(Self::from_image(image))
    }

    fn from_image(image: DynamicImage) -> Self {
        let (width, height) = (image.width(), image.height());
        let (channels, gl_format, internal_format, pixels) = match image {
            // Grayscale is expanded so it samples as gray instead of red.
            gray @ DynamicImage::ImageLuma8(_) => {
                (3, glow::RGB, glow::RGB8, gray.into_rgb8().into_raw())
            }
            gray @ DynamicImage::ImageLumaA8(_) => {
                (4, glow::RGBA, glow::RGBA8, gray.into_rgba8().into_raw())
            }
            DynamicImage::ImageRgb8(buf) => (3, glow::RGB, glow::RGB8, buf.into_raw()),
            DynamicImage::ImageRgba8(buf) => (4, glow::RGBA, glow::RGBA8, buf.into_raw()),
            other => (4, glow::RGBA, glow::RGBA8, other.into_rgba8().into_raw()),
        };
        Self {
            format: FaceFormat {
                width,
                height,
                channels,
            },
            gl_format,
            internal_format,
            pixels,
        }
    }
}

/// Sampling state chosen for a cubemap from the context's capabilities.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CubemapSampling {
    /// Anisotropy level, when anisotropic filtering is available.
    pub anisotropy: Option<f32>,
    pub mipmaps: bool,
    pub seamless: bool,
}

impl CubemapSampling {
    /// Picks the sampling state for `caps`.
    ///
    /// `max_anisotropy` is only queried when anisotropic filtering is advertised.
    pub fn choose(caps: &Capabilities, max_anisotropy: impl FnOnce() -> f32) -> Self {
        let anisotropy = if caps.anisotropic_filtering() {
            let level = max_anisotropy();
            log::info!(
                "anisotropic filtering available: will use {}x anisotropic filtering",
                level as i32
            );
            Some(level)
        } else {
            log::warn!("anisotropic filtering unavailable: distorted light might look too blurry");
            None
        };

        let mipmaps = caps.mipmap_generation();
        if mipmaps {
            log::info!("mipmap generation available: will use trilinear filtering");
        } else {
            log::warn!(
                "mipmap generation unavailable: aliasing effects might be visible (texture looks too crisp)"
            );
        }

        let seamless = caps.seamless_cubemap();
        if seamless {
            log::info!("seamless cubemap sampling available");
        } else {
            log::warn!("seamless cubemap sampling unavailable: cubemap might have seams");
        }

        Self {
            anisotropy,
            mipmaps,
            seamless,
        }
    }
}

/// Represents a cubemap texture stored on the GPU side.
pub struct Cubemap {
    gl: Arc<glow::Context>,
    id: glow::Texture,
    size: u32,
    sampling: CubemapSampling,
}

impl Cubemap {
    /// Loads the six faces described by `source` into a new cubemap.
    ///
    /// Faces are read, decoded and uploaded one after another; each decoded buffer is dropped
    /// as soon as its face is uploaded.
    pub fn load(gl: &Arc<glow::Context>, caps: &Capabilities, source: &CubemapSource) -> Result<Self> {
        let sampling = CubemapSampling::choose(caps, || unsafe {
            gl.get_parameter_f32(glow::MAX_TEXTURE_MAX_ANISOTROPY_EXT)
        });

        let texture = unsafe {
            gl.create_texture().map_err(|reason| DemoError::GlResource {
                what: "cubemap texture",
                reason,
            })?
        };
        // Owning the handle from here on deletes it on every error path below.
        let mut cubemap = Self {
            gl: Arc::clone(gl),
            id: texture,
            size: 0,
            sampling,
        };

        unsafe {
            gl.bind_texture(glow::TEXTURE_CUBE_MAP, Some(texture));
            gl.pixel_store_i32(glow::UNPACK_ALIGNMENT, 1);
        }

        let mut first: Option<FaceFormat> = None;
        for index in 0..CUBE_FACES.len() {
            let path = source.face_path(index);
            log::debug!("loading cubemap face {}", path.display());
            let face = FaceData::decode(&path)?;
            face.format
                .check_against(first.get_or_insert(face.format), index)?;

            unsafe {
                gl.tex_image_2d(
                    glow::TEXTURE_CUBE_MAP_POSITIVE_X + index as u32,
                    0,
                    face.internal_format as i32,
                    face.format.width as i32,
                    face.format.height as i32,
                    0,
                    face.gl_format,
                    glow::UNSIGNED_BYTE,
                    glow::PixelUnpackData::Slice(Some(face.pixels.as_slice())),
                );
            }
            cubemap.size = face.format.width;
        }

        unsafe {
            gl.pixel_store_i32(glow::UNPACK_ALIGNMENT, 4);
            cubemap.apply_sampling();
            gl.bind_texture(glow::TEXTURE_CUBE_MAP, None);
        }

        Ok(cubemap)
    }

    /// Applies the chosen sampling state to the bound cubemap.
    unsafe fn apply_sampling(&self) {
        let gl = &self.gl;
        let target = glow::TEXTURE_CUBE_MAP;
        unsafe {
            gl.tex_parameter_i32(target, glow::TEXTURE_MAG_FILTER, glow::LINEAR as i32);
            for wrap in [glow::TEXTURE_WRAP_S, glow::TEXTURE_WRAP_T, glow::TEXTURE_WRAP_R] {
                gl.tex_parameter_i32(target, wrap, glow::CLAMP_TO_EDGE as i32);
            }
            if let Some(level) = self.sampling.anisotropy {
                gl.tex_parameter_f32(target, glow::TEXTURE_MAX_ANISOTROPY_EXT, level);
            }
            if self.sampling.mipmaps {
                gl.tex_parameter_i32(
                    target,
                    glow::TEXTURE_MIN_FILTER,
                    glow::LINEAR_MIPMAP_LINEAR as i32,
                );
                gl.generate_mipmap(target);
            } else {
                gl.tex_parameter_i32(target, glow::TEXTURE_MIN_FILTER, glow::LINEAR as i32);
            }
            if self.sampling.seamless {
                gl.enable(glow::TEXTURE_CUBE_MAP_SEAMLESS);
            }
        }
    }

    /// Returns the edge length of each face.
    pub fn size(&self) -> u32 {
        self.size
    }

    /// Binds the cubemap to the specified texture unit.
    pub fn bind(&self, unit: u32) {
        unsafe {
            self.gl.active_texture(glow::TEXTURE0 + unit);
            self.gl.bind_texture(glow::TEXTURE_CUBE_MAP, Some(self.id));
        }
    }
}

impl Drop for Cubemap {
    fn drop(&mut self) {
        unsafe {
            self.gl.delete_texture(self.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn format(width: u32, height: u32, channels: u8) -> FaceFormat {
        FaceFormat {
            width,
            height,
            channels,
        }
    }

    #[test]
    fn test_face_paths() {
        let source = CubemapSource::new("assets", "space_", "jpg");
        assert_eq!(source.face_path(0), Path::new("assets/space_right1.jpg"));
        assert_eq!(source.face_path(1), Path::new("assets/space_left2.jpg"));
        assert_eq!(source.face_path(2), Path::new("assets/space_top3.jpg"));
        assert_eq!(source.face_path(3), Path::new("assets/space_bottom4.jpg"));
        assert_eq!(source.face_path(4), Path::new("assets/space_front5.jpg"));
        assert_eq!(source.face_path(5), Path::new("assets/space_back6.jpg"));
    }

    #[test]
    fn test_matching_faces_pass() {
        let first = format(512, 512, 3);
        for face in 0..6 {
            assert!(format(512, 512, 3).check_against(&first, face).is_ok());
        }
    }

    #[test]
    fn test_mismatched_faces_fail() {
        let first = format(512, 512, 3);

        let err = format(256, 256, 3).check_against(&first, 2).unwrap_err();
        assert!(matches!(err, DemoError::CubemapFaceMismatch { face: 2, .. }));

        let err = format(512, 512, 4).check_against(&first, 5).unwrap_err();
        assert!(matches!(
            err,
            DemoError::CubemapFaceMismatch {
                face: 5,
                found: FaceFormat { channels: 4, .. },
                ..
            }
        ));
    }

    #[test]
    fn test_non_square_face_fails() {
        let first = format(512, 256, 3);
        let err = first.check_against(&first, 0).unwrap_err();
        assert!(matches!(err, DemoError::CubemapFaceNotSquare { face: 0, .. }));
    }

    #[test]
    fn test_decoded_channels() {
        let rgb = FaceData::from_image(DynamicImage::new_rgb8(4, 4));
        assert_eq!(rgb.format, format(4, 4, 3));
        assert_eq!(rgb.gl_format, glow::RGB);
        assert_eq!(rgb.pixels.len(), 4 * 4 * 3);

        let luma = FaceData::from_image(DynamicImage::new_luma8(4, 4));
        assert_eq!(luma.format, format(4, 4, 3));
        assert_eq!(luma.internal_format, glow::RGB8);
        assert_eq!(luma.pixels.len(), 4 * 4 * 3);

        let luma_alpha = FaceData::from_image(DynamicImage::new_luma_a8(4, 4));
        assert_eq!(luma_alpha.format.channels, 4);
        assert_eq!(luma_alpha.gl_format, glow::RGBA);
        assert_eq!(luma_alpha.pixels.len(), 4 * 4 * 4);

        let rgba16 = FaceData::from_image(DynamicImage::new_rgba16(2, 2));
        assert_eq!(rgba16.format.channels, 4);
        assert_eq!(rgba16.pixels.len(), 2 * 2 * 4);
    }

    #[test]
    fn test_sampling_skips_anisotropy_query_when_absent() {
        let caps = Capabilities::new(3, 3, Default::default());
        let sampling = CubemapSampling::choose(&caps, || panic!("queried without the extension"));
        assert_eq!(
            sampling,
            CubemapSampling {
                anisotropy: None,
                mipmaps: true,
                seamless: true,
            }
        );

        let caps = Capabilities::new(
            3,
            3,
            ["GL_EXT_texture_filter_anisotropic".to_string()].into(),
        );
        let sampling = CubemapSampling::choose(&caps, || 16.0);
        assert_eq!(sampling.anisotropy, Some(16.0));
    }
}
