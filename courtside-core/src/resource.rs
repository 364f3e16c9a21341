/// Scoped rasterizer resources: acquired on creation, released on drop
use std::fmt;

use tracing::warn;

use crate::render::{MeshHandle, Rasterizer, SharedRasterizer, TextureHandle};

/// A rasterizer-side object that must be released exactly once
pub trait GpuHandle: Copy + fmt::Debug {
    fn release(self, rasterizer: &mut dyn Rasterizer);
}

impl GpuHandle for MeshHandle {
    fn release(self, rasterizer: &mut dyn Rasterizer) {
        rasterizer.release_mesh(self);
    }
}

impl GpuHandle for TextureHandle {
    fn release(self, rasterizer: &mut dyn Rasterizer) {
        rasterizer.release_texture(self);
    }
}

/// Owns one handle and releases it when dropped
pub struct Resource<H: GpuHandle> {
    handle: H,
    context: SharedRasterizer,
}

impl<H: GpuHandle> Resource<H> {
    pub fn acquire(context: &SharedRasterizer, create: impl FnOnce(&mut dyn Rasterizer) -> H) -> Self {
        let handle = create(&mut *context.borrow_mut());
        Self {
            handle,
            context: context.clone(),
        }
    }

    pub fn handle(&self) -> H {
        self.handle
    }

    pub fn context(&self) -> &SharedRasterizer {
        &self.context
    }
}

impl<H: GpuHandle> Drop for Resource<H> {
    fn drop(&mut self) {
        match self.context.try_borrow_mut() {
            Ok(mut rasterizer) => self.handle.release(&mut *rasterizer),
            // Only reachable while unwinding out of a draw call.
            Err(_) => warn!(handle = ?self.handle, "rasterizer busy, resource leaked"),
        }
    }
}

impl<H: GpuHandle> fmt::Debug for Resource<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resource").field("handle", &self.handle).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Mesh;
    use crate::render::testing::{recording, Call};

    #[test]
    fn test_drop_releases_once() {
        let (recorder, context) = recording();
        let resource = Resource::acquire(&context, |r| r.upload_mesh(&Mesh::floor(1.0)));
        let handle = resource.handle();
        drop(resource);

        let recorder = recorder.borrow();
        assert_eq!(recorder.calls[0], Call::UploadMesh(handle, 6));
        assert_eq!(recorder.calls[1], Call::ReleaseMesh(handle));
        assert_eq!(recorder.released_meshes(), 1);
    }

    #[test]
    fn test_release_on_early_return() {
        fn build(context: &SharedRasterizer) -> Result<Resource<MeshHandle>, &'static str> {
            let _buffer = Resource::acquire(context, |r| r.upload_mesh(&Mesh::floor(1.0)));
            Err("later step failed")
        }

        let (recorder, context) = recording();
        assert!(build(&context).is_err());
        assert_eq!(recorder.borrow().released_meshes(), 1);
    }
}
