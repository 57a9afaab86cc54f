//! A layer broadcasting every span and event to a runtime-sized list of
//! output layers, one per configured logging output.
//!
//! Filtering is left to the global filter in front of it, so the outputs
//! themselves never disable a callsite.
use tracing_core::{span, subscriber::Subscriber, Event};
use tracing_subscriber::layer::{Context, Layer};

type BoxedLayer<S> = Box<dyn Layer<S> + Send + Sync + 'static>;

pub struct Fanout<S> {
    outputs: Vec<BoxedLayer<S>>,
}

impl<S> Fanout<S>
where
    S: Subscriber,
{
    pub fn new() -> Self {
        Self { outputs: vec![] }
    }

    pub fn push<L>(&mut self, layer: L)
    where
        L: Layer<S> + Send + Sync + 'static,
    {
        self.outputs.push(Box::new(layer));
    }
}

impl<S> Layer<S> for Fanout<S>
where
    S: Subscriber,
{
    fn new_span(&self, attrs: &span::Attributes<'_>, id: &span::Id, ctx: Context<'_, S>) {
        self.outputs
            .iter()
            .for_each(|l| l.new_span(attrs, id, ctx.clone()));
    }

    fn on_record(&self, id: &span::Id, values: &span::Record<'_>, ctx: Context<'_, S>) {
        self.outputs
            .iter()
            .for_each(|l| l.on_record(id, values, ctx.clone()));
    }

    fn on_follows_from(&self, id: &span::Id, follows: &span::Id, ctx: Context<'_, S>) {
        self.outputs
            .iter()
            .for_each(|l| l.on_follows_from(id, follows, ctx.clone()));
    }

    fn on_event(&self, event: &Event<'_>, ctx: Context<'_, S>) {
        self.outputs
            .iter()
            .for_each(|l| l.on_event(event, ctx.clone()));
    }

    fn on_enter(&self, id: &span::Id, ctx: Context<'_, S>) {
        self.outputs.iter().for_each(|l| l.on_enter(id, ctx.clone()));
    }

    fn on_exit(&self, id: &span::Id, ctx: Context<'_, S>) {
        self.outputs.iter().for_each(|l| l.on_exit(id, ctx.clone()));
    }

    fn on_close(&self, id: span::Id, ctx: Context<'_, S>) {
        self.outputs
            .iter()
            .for_each(|l| l.on_close(id.clone(), ctx.clone()));
    }

    fn on_id_change(&self, old: &span::Id, new: &span::Id, ctx: Context<'_, S>) {
        self.outputs
            .iter()
            .for_each(|l| l.on_id_change(old, new, ctx.clone()));
    }
}
