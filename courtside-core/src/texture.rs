/// Textures and per-object texture bindings
use std::path::Path;

use tracing::{info, warn};

use crate::error::ResourceError;
use crate::render::{
    PixelFormat, Rasterizer, SharedRasterizer, TextureHandle, TextureImage, DIFFUSE_UNIT,
    NORMAL_UNIT,
};
use crate::resource::Resource;

/// Decode an image file into bottom-to-top rows.
pub fn decode_texture(path: &Path) -> Result<TextureImage, ResourceError> {
    let decoded = image::open(path).map_err(|source| ResourceError::Decode {
        path: path.to_path_buf(),
        source,
    })?;
    let channels = decoded.color().channel_count();
    let format =
        PixelFormat::from_channels(channels).ok_or_else(|| ResourceError::UnsupportedChannels {
            path: path.to_path_buf(),
            channels,
        })?;

    let flipped = decoded.flipv();
    let pixels = match format {
        PixelFormat::Red => flipped.to_luma8().into_raw(),
        PixelFormat::Rgb => flipped.to_rgb8().into_raw(),
        PixelFormat::Rgba => flipped.to_rgba8().into_raw(),
    };

    Ok(TextureImage {
        width: flipped.width(),
        height: flipped.height(),
        format,
        pixels,
    })
}

/// A texture owned by the rasterizer, released on drop
#[derive(Debug)]
pub struct Texture {
    resource: Resource<TextureHandle>,
}

impl Texture {
    pub fn from_image(context: &SharedRasterizer, image: &TextureImage) -> Self {
        Self {
            resource: Resource::acquire(context, |r| r.create_texture(image)),
        }
    }

    pub fn load(context: &SharedRasterizer, path: impl AsRef<Path>) -> Result<Self, ResourceError> {
        let path = path.as_ref();
        let image = decode_texture(path)?;
        info!(
            path = %path.display(),
            width = image.width,
            height = image.height,
            "texture loaded"
        );
        Ok(Self::from_image(context, &image))
    }

    /// 1x1 placeholder of a single colour.
    pub fn solid(context: &SharedRasterizer, rgb: [u8; 3]) -> Self {
        Self::from_image(context, &TextureImage::solid(rgb))
    }

    /// Load `path`, or fall back to a solid placeholder if it cannot be decoded.
    pub fn load_or_solid(context: &SharedRasterizer, path: impl AsRef<Path>, rgb: [u8; 3]) -> Self {
        let path = path.as_ref();
        match Self::load(context, path) {
            Ok(texture) => texture,
            Err(error) => {
                warn!(%error, ?rgb, "using solid placeholder texture");
                Self::solid(context, rgb)
            }
        }
    }

    pub fn handle(&self) -> TextureHandle {
        self.resource.handle()
    }
}

/// What a bound texture is sampled as
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureRole {
    Diffuse,
    Normal,
}

impl TextureRole {
    pub fn unit(self) -> u32 {
        match self {
            Self::Diffuse => DIFFUSE_UNIT,
            Self::Normal => NORMAL_UNIT,
        }
    }
}

/// Either a texture this binding owns, or a handle owned by another binding
#[derive(Debug)]
pub enum BoundTexture {
    Owned(Texture),
    Shared(TextureHandle),
}

#[derive(Debug)]
pub struct TextureBinding {
    pub role: TextureRole,
    pub texture: BoundTexture,
}

impl TextureBinding {
    pub fn handle(&self) -> TextureHandle {
        match &self.texture {
            BoundTexture::Owned(texture) => texture.handle(),
            BoundTexture::Shared(handle) => *handle,
        }
    }

    pub fn is_owned(&self) -> bool {
        matches!(self.texture, BoundTexture::Owned(_))
    }
}

/// Up to one diffuse and one normal binding.
///
/// Without a normal map the normal unit samples the diffuse texture through a
/// shared binding, so the diffuse handle is still released only once.
#[derive(Debug, Default)]
pub struct TextureSet {
    bindings: Vec<TextureBinding>,
}

impl TextureSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, role: TextureRole, texture: Texture) -> Self {
        self.insert(role, texture);
        self
    }

    pub fn insert(&mut self, role: TextureRole, texture: Texture) {
        self.bindings.retain(|binding| binding.role != role);
        self.bindings.push(TextureBinding {
            role,
            texture: BoundTexture::Owned(texture),
        });
        self.refresh_fallback();
    }

    fn refresh_fallback(&mut self) {
        self.bindings
            .retain(|binding| binding.role != TextureRole::Normal || binding.is_owned());

        if self.get(TextureRole::Normal).is_none() {
            if let Some(diffuse) = self.get(TextureRole::Diffuse) {
                let handle = diffuse.handle();
                self.bindings.push(TextureBinding {
                    role: TextureRole::Normal,
                    texture: BoundTexture::Shared(handle),
                });
            }
        }
    }

    pub fn get(&self, role: TextureRole) -> Option<&TextureBinding> {
        self.bindings.iter().find(|binding| binding.role == role)
    }

    pub fn bindings(&self) -> &[TextureBinding] {
        &self.bindings
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Bind every texture to its role's unit.
    pub fn bind(&self, rasterizer: &mut dyn Rasterizer) {
        for binding in &self.bindings {
            rasterizer.bind_texture(binding.role.unit(), binding.handle());
        }
    }
}
