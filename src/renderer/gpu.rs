use std::sync::Arc;

use crate::{
    WindowError,
    driver::{Driver, Platform},
    windowing::Size,
};

use super::{Gpu, Ops};

/// Owns the window's GPU backend across frames.
///
/// The backend is created lazily on the first draw, kept while the window
/// is running, and dropped as soon as it becomes invisible or dies.
#[derive(Default)]
pub(crate) struct GpuLifecycle {
    gpu: Option<Box<dyn Gpu>>,
}

impl GpuLifecycle {
    pub fn is_held(&self) -> bool {
        self.gpu.is_some()
    }

    /// Makes a backend ready for the next frame.
    ///
    /// A held backend is refreshed when `sync` is set and flushed; a failed
    /// flush discards it. Without a usable backend a new one is created, and
    /// failing to do so is fatal for the window.
    pub fn prepare(
        &mut self,
        platform: &dyn Platform,
        driver: &Arc<dyn Driver>,
        sync: bool,
    ) -> Result<(), WindowError> {
        let held = self.gpu.take().and_then(|mut gpu| {
            if sync {
                gpu.refresh();
            }
            match gpu.flush() {
                Ok(()) => Some(gpu),
                Err(err) => {
                    log::warn!("GPU flush failed, recreating context: {err:#}");
                    gpu.release();
                    None
                }
            }
        });
        let gpu = match held {
            Some(gpu) => gpu,
            None => {
                let ctx = platform.new_context(driver).map_err(WindowError::Context)?;
                let gpu = platform.new_gpu(ctx).map_err(WindowError::Backend)?;
                log::debug!("GPU context created");
                gpu
            }
        };
        self.gpu = Some(gpu);
        Ok(())
    }

    /// Encodes a frame on the held backend and returns its timings when
    /// profiling.
    pub fn draw(&mut self, profiling: bool, size: Size, ops: &Ops) -> Option<String> {
        let gpu = self.gpu.as_mut()?;
        gpu.draw(profiling, size, ops);
        profiling.then(|| gpu.timings())
    }

    pub fn refresh(&mut self) {
        if let Some(gpu) = self.gpu.as_mut() {
            gpu.refresh();
        }
    }

    pub fn release(&mut self) {
        if let Some(mut gpu) = self.gpu.take() {
            gpu.release();
            log::debug!("GPU context released");
        }
    }
}
