/// Options that change the shape of the emitted assembly.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TranslatorConfig {
    /// Prefix each command's instructions with a `// <vm command>` line.
    pub annotate: bool,
}

impl TranslatorConfig {
    pub fn annotated() -> Self {
        TranslatorConfig { annotate: true }
    }
}
