//! Configuration record passed in from the CLI collaborator (spec.md §6).

#[derive(Debug, Clone)]
pub struct Config {
    /// Also write `<TYPE>_<id>.data` beside the decoded artifacts.
    pub dump_raw_blocks: bool,
    /// Suppress the `Status: ...` diagnostic stream.
    pub quiet_status: bool,
    /// Suppress the `Progress: M of N` diagnostic stream.
    pub quiet_progress: bool,
    /// Run the WOBA collaborator on `BMAP` blocks; when false, write
    /// `BMAP_<id>.raw` instead.
    pub decode_graphics: bool,
    /// Emit `<!-- 'TYPE' #id ... -->` decorative comments in the root
    /// project document, matching the original importer's texture.
    pub emit_comments: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            dump_raw_blocks: false,
            quiet_status: false,
            quiet_progress: false,
            decode_graphics: true,
            emit_comments: true,
        }
    }
}
