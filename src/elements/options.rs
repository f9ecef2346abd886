use crate::host::{BoundingBoxOptions, Selector};

/// When a per-element layer refreshes on its own.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UpdateOn {
    /// `Render` when the collection is queried on every pass, otherwise `Position`.
    #[default]
    Auto,
    /// Every host render tick.
    Render,
    /// Tracked elements being added, removed or moved.
    Position,
    /// Tracked elements being added or removed.
    None,
}

impl UpdateOn {
    pub fn resolve(self, query_each_time: bool) -> Self {
        match self {
            Self::Auto if query_each_time => Self::Render,
            Self::Auto => Self::Position,
            other => other,
        }
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ElementLayerOptions {
    pub selector: Selector,
    /// Re-run the selector on every pass instead of fixing the collection up front.
    pub query_each_time: bool,
    pub update_on: UpdateOn,
    /// Skip elements outside the visible region.
    pub check_bounds: bool,
}

impl Default for ElementLayerOptions {
    fn default() -> Self {
        Self {
            selector: Selector::Visible,
            query_each_time: false,
            update_on: UpdateOn::Auto,
            check_bounds: true,
        }
    }
}

impl ElementLayerOptions {
    pub fn with_selector(mut self, selector: Selector) -> Self {
        self.selector = selector;
        self
    }

    pub fn query_each_time(mut self) -> Self {
        self.query_each_time = true;
        self
    }

    pub fn with_update_on(mut self, update_on: UpdateOn) -> Self {
        self.update_on = update_on;
        self
    }

    pub fn without_bounds_check(mut self) -> Self {
        self.check_bounds = false;
        self
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct NodeLayerOptions {
    #[serde(flatten)]
    pub element: ElementLayerOptions,
    pub bounding_box: BoundingBoxOptions,
    /// One platform node per element id, kept across reorderings (DOM layers only).
    pub unique_elements: bool,
}

impl Default for NodeLayerOptions {
    fn default() -> Self {
        Self {
            element: ElementLayerOptions::default(),
            bounding_box: BoundingBoxOptions {
                include_labels: false,
                include_overlays: false,
            },
            unique_elements: false,
        }
    }
}

impl NodeLayerOptions {
    pub fn with_element(mut self, element: ElementLayerOptions) -> Self {
        self.element = element;
        self
    }

    pub fn with_bounding_box(mut self, bounding_box: BoundingBoxOptions) -> Self {
        self.bounding_box = bounding_box;
        self
    }

    pub fn unique_elements(mut self) -> Self {
        self.unique_elements = true;
        self
    }
}

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct EdgeLayerOptions {
    #[serde(flatten)]
    pub element: ElementLayerOptions,
    /// Points probed along an edge for the bounds check. Falls back to the stack config.
    pub samples: Option<usize>,
}

impl EdgeLayerOptions {
    pub fn with_element(mut self, element: ElementLayerOptions) -> Self {
        self.element = element;
        self
    }

    pub fn with_samples(mut self, samples: usize) -> Self {
        self.samples = Some(samples);
        self
    }
}

#[cfg(test)]
#[path = "../../tests/unit/elements/options.rs"]
mod tests;
