//! Per-page bookkeeping for a previewed document.

/// Content of a page once its markup has been fetched and measured.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedPage {
    pub markup: String,
    /// Intrinsic width of the page content, before any zoom is applied.
    pub width: f32,
    /// Intrinsic height of the page content, before any zoom is applied.
    pub height: f32,
}

impl RenderedPage {
    pub fn new(markup: impl Into<String>, width: f32, height: f32) -> Self {
        Self { markup: markup.into(), width, height }
    }
}

/// What occupies a page's slot in the content column.
#[derive(Debug, Clone, PartialEq)]
pub enum PageHandle {
    /// Loading indicator shown while the page request is outstanding.
    Placeholder,
    Rendered(RenderedPage),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageState {
    Unloaded,
    Loading,
    Loaded,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    number: u32,
    pub(crate) handle: Option<PageHandle>,
    pub(crate) height: f32,
    pub(crate) margin_top: f32,
    pub(crate) next_margin: Option<f32>,
    failed: bool,
}

impl Page {
    fn new(number: u32) -> Self {
        Self {
            number,
            handle: None,
            height: 0.0,
            margin_top: 0.0,
            next_margin: None,
            failed: false,
        }
    }

    pub fn number(&self) -> u32 {
        self.number
    }

    pub fn state(&self) -> PageState {
        match self.handle {
            None => PageState::Unloaded,
            Some(PageHandle::Placeholder) => PageState::Loading,
            Some(PageHandle::Rendered(_)) => PageState::Loaded,
        }
    }

    /// Whether the page occupies space in the content column.
    pub fn is_placed(&self) -> bool {
        self.handle.is_some()
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self.handle, Some(PageHandle::Rendered(_)))
    }

    /// Whether the last load of this page failed. Cleared by the next attempt.
    pub fn has_failed(&self) -> bool {
        self.failed
    }

    pub fn rendered(&self) -> Option<&RenderedPage> {
        match &self.handle {
            Some(PageHandle::Rendered(rendered)) => Some(rendered),
            _ => None,
        }
    }

    /// Unscaled height of whatever currently occupies the slot.
    pub fn height(&self) -> f32 {
        self.height
    }

    pub fn margin_top(&self) -> f32 {
        self.margin_top
    }

    pub fn next_margin(&self) -> Option<f32> {
        self.next_margin
    }

    pub(crate) fn place_placeholder(&mut self, height: f32, margin_top: f32) {
        self.handle = Some(PageHandle::Placeholder);
        self.failed = false;
        self.height = height;
        self.margin_top = margin_top;
    }

    pub(crate) fn set_rendered(&mut self, rendered: RenderedPage) {
        self.height = rendered.height;
        self.handle = Some(PageHandle::Rendered(rendered));
    }

    pub(crate) fn discard(&mut self) {
        self.handle = None;
        self.height = 0.0;
        self.margin_top = 0.0;
    }

    pub(crate) fn mark_failed(&mut self) {
        self.discard();
        self.failed = true;
    }
}

/// Ordered pages `1..=page_count`. Created once and never resized.
#[derive(Debug, Clone)]
pub struct PageStore {
    pages: Vec<Page>,
}

impl PageStore {
    pub fn new(page_count: u32) -> Self {
        Self { pages: (1..=page_count).map(Page::new).collect() }
    }

    pub fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }

    pub fn contains(&self, number: u32) -> bool {
        number >= 1 && number <= self.page_count()
    }

    pub fn get(&self, number: u32) -> Option<&Page> {
        let index = number.checked_sub(1)?;
        self.pages.get(index as usize)
    }

    pub(crate) fn get_mut(&mut self, number: u32) -> Option<&mut Page> {
        let index = number.checked_sub(1)?;
        self.pages.get_mut(index as usize)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Page> {
        self.pages.iter()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut Page> {
        self.pages.iter_mut()
    }

    /// First page that has not been placed yet, in document order.
    pub fn next_unplaced(&self) -> Option<u32> {
        self.pages.iter().find(|page| !page.is_placed()).map(Page::number)
    }

    pub fn loaded_pages(&self) -> Vec<u32> {
        self.pages.iter().filter(|page| page.is_loaded()).map(Page::number).collect()
    }

    /// Top of the page's margin box, in content coordinates.
    ///
    /// Scale transforms do not affect flow, so every placed page before this
    /// one contributes its margin plus its unscaled height.
    pub fn flow_top(&self, number: u32) -> f32 {
        self.pages
            .iter()
            .take_while(|page| page.number < number)
            .filter(|page| page.is_placed())
            .map(|page| page.margin_top + page.height)
            .sum()
    }

    /// Top edge of the page as drawn, in content coordinates.
    pub fn visual_top(&self, number: u32) -> f32 {
        let margin = self.get(number).map(|page| page.margin_top).unwrap_or(0.0);
        self.flow_top(number) + margin
    }

    pub fn flow_height(&self) -> f32 {
        self.pages
            .iter()
            .filter(|page| page.is_placed())
            .map(|page| page.margin_top + page.height)
            .sum()
    }
}
