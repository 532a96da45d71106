use serde::Serialize;

/// A display target the requester can write to and toggle.
pub trait StatusRegion {
    fn set_text(&mut self, text: &str);
    fn set_visible(&mut self, visible: bool);
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RegionKind {
    Success,
    Error,
    Warning,
}

impl RegionKind {
    pub fn name(&self) -> &'static str {
        match self {
            RegionKind::Success => "success",
            RegionKind::Error => "error",
            RegionKind::Warning => "warning",
        }
    }
}

/// The three regions owned by the caller. Only `show` mutates visibility, so
/// at most one region is visible once the requester has run.
#[derive(Clone, Debug, Default)]
pub struct StatusRegions<R: StatusRegion> {
    pub success: R,
    pub error: R,
    pub warning: R,
}

impl<R: StatusRegion> StatusRegions<R> {
    pub fn new(success: R, error: R, warning: R) -> Self {
        Self { success, error, warning }
    }

    pub fn get(&self, kind: RegionKind) -> &R {
        match kind {
            RegionKind::Success => &self.success,
            RegionKind::Error => &self.error,
            RegionKind::Warning => &self.warning,
        }
    }

    fn get_mut(&mut self, kind: RegionKind) -> &mut R {
        match kind {
            RegionKind::Success => &mut self.success,
            RegionKind::Error => &mut self.error,
            RegionKind::Warning => &mut self.warning,
        }
    }

    /// Write `text` into `kind`, show it and hide the other two.
    /// Hidden regions keep their previous text.
    pub fn show(&mut self, kind: RegionKind, text: &str) {
        let target = self.get_mut(kind);
        target.set_text(text);
        target.set_visible(true);
        for other in [RegionKind::Success, RegionKind::Error, RegionKind::Warning] {
            if other != kind {
                self.get_mut(other).set_visible(false);
            }
        }
    }
}

/// In-memory region; backs the CLI and tests.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct MemoryRegion {
    pub text: String,
    pub visible: bool,
}

impl StatusRegion for MemoryRegion {
    fn set_text(&mut self, text: &str) {
        self.text.clear();
        self.text.push_str(text);
    }

    fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }
}

impl StatusRegions<MemoryRegion> {
    /// The visible region, if any. `None` before the first `show`.
    pub fn visible(&self) -> Option<(RegionKind, &str)> {
        [RegionKind::Success, RegionKind::Error, RegionKind::Warning]
            .into_iter()
            .find(|k| self.get(*k).visible)
            .map(|k| (k, self.get(k).text.as_str()))
    }

    pub fn visible_count(&self) -> usize {
        [&self.success, &self.error, &self.warning].iter().filter(|r| r.visible).count()
    }
}
