//! Marshal, unmarshal, and parse options.

/// Options shared by parsing, marshalling, and unmarshalling.
///
/// Built with chained setters:
///
/// ```
/// let options = hackle::Options::new()
///     .infer_hcl_tags(true)
///     .heredocs_for_multiline(2);
/// assert!(options.infer_hcl_tags);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Options {
    /// Treat untagged record-typed fields as blocks.
    pub infer_hcl_tags: bool,
    /// Allow `attr` with no `= value` to mean `attr = true` for boolean
    /// fields.
    pub bare_boolean_attributes: bool,
    /// Marshal strings with at least this many newlines as indented
    /// heredocs; zero disables.
    pub heredocs_for_multiline: usize,
    /// Accept unknown entries during unmarshalling.
    pub allow_extra: bool,
    /// Include help/default/enum metadata as comment lines in marshalled
    /// output.
    pub schema_comments: bool,
    /// Keep detached comments as standalone entries when parsing.
    pub detached_comments: bool,

    /// Set while reflecting a schema; switches the marshaller into
    /// type-descriptor mode.
    pub(crate) schema: bool,
}

impl Options {
    /// Create default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Treat untagged record-typed fields as blocks.
    pub fn infer_hcl_tags(mut self, infer: bool) -> Self {
        self.infer_hcl_tags = infer;
        self
    }

    /// Allow bare boolean attributes (`attr` meaning `attr = true`).
    pub fn bare_boolean_attributes(mut self, bare: bool) -> Self {
        self.bare_boolean_attributes = bare;
        self
    }

    /// Marshal strings with at least `n` newlines as indented heredocs.
    pub fn heredocs_for_multiline(mut self, n: usize) -> Self {
        self.heredocs_for_multiline = n;
        self
    }

    /// Accept unknown entries during unmarshalling.
    pub fn allow_extra(mut self, allow: bool) -> Self {
        self.allow_extra = allow;
        self
    }

    /// Include help/default/enum metadata as comments when marshalling.
    pub fn schema_comments(mut self, include: bool) -> Self {
        self.schema_comments = include;
        self
    }

    /// Keep detached comments when parsing.
    pub fn detached_comments(mut self, keep: bool) -> Self {
        self.detached_comments = keep;
        self
    }
}
