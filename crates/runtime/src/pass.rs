/// Deterministic render-pass metadata.
///
/// Every render pass gets the next index; events and reports are stamped with
/// it so a sequence of passes can be replayed and compared.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct RenderPass {
    /// 0-based pass index.
    pub index: u64,
}

impl RenderPass {
    pub fn new(index: u64) -> Self {
        Self { index }
    }

    pub fn next(self) -> Self {
        Self::new(self.index + 1)
    }
}
