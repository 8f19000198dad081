//! Slide rendering dispatch
//!
//! The engine does not draw anything. Hosts register one renderer per slide
//! kind plus a required fallback, and the registry picks the right one for
//! the current slide. Unknown kinds always reach the fallback.

use lessonflow_core::{Slide, SlideKind};
use std::collections::HashMap;

/// A slide together with its position in the lesson
#[derive(Debug, Clone, Copy)]
pub struct SlideView<'a> {
    pub slide: &'a Slide,
    pub index: usize,
    pub total: usize,
}

impl SlideView<'_> {
    pub fn is_first(&self) -> bool {
        self.index == 0
    }

    pub fn is_last(&self) -> bool {
        self.index + 1 == self.total
    }
}

/// Turns a slide into whatever the host displays
pub trait SlideRenderer<O> {
    fn render(&self, view: &SlideView<'_>) -> O;
}

impl<F, O> SlideRenderer<O> for F
where
    F: Fn(&SlideView<'_>) -> O,
{
    fn render(&self, view: &SlideView<'_>) -> O {
        self(view)
    }
}

type BoxedRenderer<O> = Box<dyn SlideRenderer<O> + Send + Sync>;

pub struct RendererRegistry<O> {
    renderers: HashMap<SlideKind, BoxedRenderer<O>>,
    fallback: BoxedRenderer<O>,
}

impl<O> RendererRegistry<O> {
    pub fn new<R>(fallback: R) -> Self
    where
        R: SlideRenderer<O> + Send + Sync + 'static,
    {
        Self {
            renderers: HashMap::new(),
            fallback: Box::new(fallback),
        }
    }

    /// Registers `renderer` for `kind`, replacing any previous one
    pub fn register<R>(&mut self, kind: SlideKind, renderer: R) -> &mut Self
    where
        R: SlideRenderer<O> + Send + Sync + 'static,
    {
        self.renderers.insert(kind, Box::new(renderer));
        self
    }

    pub fn with<R>(mut self, kind: SlideKind, renderer: R) -> Self
    where
        R: SlideRenderer<O> + Send + Sync + 'static,
    {
        self.register(kind, renderer);
        self
    }

    pub fn has_renderer(&self, kind: &SlideKind) -> bool {
        self.renderers.contains_key(kind)
    }

    pub fn resolve(&self, kind: &SlideKind) -> &(dyn SlideRenderer<O> + Send + Sync) {
        match self.renderers.get(kind) {
            Some(renderer) => renderer.as_ref(),
            None => {
                log::debug!("No renderer for slide kind '{}', using fallback", kind);
                self.fallback.as_ref()
            }
        }
    }

    pub fn render(&self, view: &SlideView<'_>) -> O {
        self.resolve(&view.slide.kind).render(view)
    }
}
