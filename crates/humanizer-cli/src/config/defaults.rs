pub struct DefaultsConfig {
    pub max_changes: usize,
    pub use_aa_similarity: bool,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            max_changes: 10,
            use_aa_similarity: false,
        }
    }
}
