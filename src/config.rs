//! Configuration for linearization runs.

/// Options controlling how a document is linearized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinearizationConfig {
    /// FlateDecode the hint stream.
    pub compress_hint_stream: bool,

    /// Add a trailer `/ID` when the input document has none.
    pub generate_document_id: bool,

    /// Re-parent every leaf page directly under the root `/Pages` node.
    pub flatten_page_tree: bool,

    /// Serialize objects without optional whitespace.
    pub compact_objects: bool,

    /// Lowest header version the output declares.
    ///
    /// Cross-reference streams need PDF 1.5, so the header uses the larger of
    /// this and the document's own version.
    pub min_version: (u8, u8),
}

impl Default for LinearizationConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl LinearizationConfig {
    /// Create new configuration with defaults.
    pub fn new() -> Self {
        Self {
            compress_hint_stream: true,
            generate_document_id: true,
            flatten_page_tree: false,
            compact_objects: false,
            min_version: (1, 5),
        }
    }

    /// Enable or disable hint stream compression.
    pub fn with_compress_hint_stream(mut self, enable: bool) -> Self {
        self.compress_hint_stream = enable;
        self
    }

    /// Enable or disable `/ID` generation.
    pub fn with_generate_document_id(mut self, enable: bool) -> Self {
        self.generate_document_id = enable;
        self
    }

    /// Enable or disable page tree flattening.
    pub fn with_flatten_page_tree(mut self, enable: bool) -> Self {
        self.flatten_page_tree = enable;
        self
    }

    /// Enable or disable compact object serialization.
    pub fn with_compact_objects(mut self, enable: bool) -> Self {
        self.compact_objects = enable;
        self
    }

    /// Set the header version floor.
    pub fn with_min_version(mut self, major: u8, minor: u8) -> Self {
        self.min_version = (major, minor);
        self
    }

    /// Header version for a document declaring `document_version`.
    pub fn header_version(&self, document_version: (u8, u8)) -> (u8, u8) {
        document_version.max(self.min_version)
    }
}
