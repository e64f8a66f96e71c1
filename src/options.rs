//! Decode configuration

use std::sync::Arc;

use crate::tiff::constants::layout;
use crate::tiff::registry::TagRegistry;
use crate::tiff::resolution::DEFAULT_DPI;

/// How far a decoder reads into the stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScanMode {
    /// Stop as soon as dimensions and resolution are known
    #[default]
    DimensionsOnly,
    /// Read every metadata segment up to the image data
    AllMetadata,
}

/// Options shared by all decoders
#[derive(Debug, Clone)]
pub struct DecodeOptions {
    pub mode: ScanMode,
    /// Bound on the directories followed in each IFD chain
    pub max_ifd_hops: usize,
    /// DPI reported when the file carries no usable resolution
    pub default_dpi: i32,
    /// Custom tag definitions; the built-in table when `None`
    pub registry: Option<Arc<TagRegistry>>,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        DecodeOptions {
            mode: ScanMode::default(),
            max_ifd_hops: layout::DEFAULT_MAX_IFD_HOPS,
            default_dpi: DEFAULT_DPI,
            registry: None,
        }
    }
}

impl DecodeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Options that read every metadata segment
    pub fn all_metadata() -> Self {
        Self::default().with_mode(ScanMode::AllMetadata)
    }

    pub fn with_mode(mut self, mode: ScanMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_max_ifd_hops(mut self, max_ifd_hops: usize) -> Self {
        self.max_ifd_hops = max_ifd_hops;
        self
    }

    pub fn with_default_dpi(mut self, default_dpi: i32) -> Self {
        self.default_dpi = default_dpi;
        self
    }

    pub fn with_registry(mut self, registry: TagRegistry) -> Self {
        self.registry = Some(Arc::new(registry));
        self
    }

    /// The tag registry in effect
    pub fn registry(&self) -> &TagRegistry {
        match &self.registry {
            Some(registry) => registry.as_ref(),
            None => TagRegistry::builtin(),
        }
    }

    /// Whether decoders may stop once dimensions and DPI are known
    pub fn short_circuit(&self) -> bool {
        self.mode == ScanMode::DimensionsOnly
    }
}
