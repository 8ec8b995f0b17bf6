//! Chart lifecycle shared by every variant.
//!
//! A [`Chart`] pairs the common state machine
//! (`Uninitialized -> Initialized -> Rendered -> Destroyed`) with a
//! [`ChartKind`] that turns the current data into scene elements. Each
//! render rebuilds the full scene and reconciles it against the previous one
//! by element key.

use serde::Serialize;
use std::marker::PhantomData;
use std::sync::{Arc, Mutex};

use super::axis::{self, Ink, PlotArea};
use super::options::{ChartOptions, ChartOptionsPatch, ChartType};
use super::scene::{Element, Point, RenderStatus, Scene, SceneDiff, Tooltip};
use super::styles::{ChartStyle, ChartTheme};
use crate::error::{ChartError, ChartResult};
use crate::events::{Observers, Subscription};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

struct ContainerInner {
    size: Mutex<Size>,
    resized: Observers<Size>,
}

/// The surface a chart is drawn into. Clones share the same size and
/// resize observers.
#[derive(Clone)]
pub struct Container {
    inner: Arc<ContainerInner>,
}

impl Container {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            inner: Arc::new(ContainerInner {
                size: Mutex::new(Size::new(width, height)),
                resized: Observers::new(),
            }),
        }
    }

    pub fn size(&self) -> Size {
        self.inner.size.lock().map(|s| *s).unwrap_or_default()
    }

    /// Change the size, notifying observers when it actually changed.
    ///
    /// Observers of a mounted chart lock that chart, so do not call this
    /// while holding the chart's lock.
    pub fn set_size(&self, size: Size) {
        let changed = match self.inner.size.lock() {
            Ok(mut current) if *current != size => {
                *current = size;
                true
            }
            _ => false,
        };
        if changed {
            self.inner.resized.notify(&size);
        }
    }

    pub fn on_resize<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&Size) + Send + Sync + 'static,
    {
        self.inner.resized.subscribe(callback)
    }

    pub fn observer_count(&self) -> usize {
        self.inner.resized.len()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LifecycleState {
    Uninitialized,
    Initialized,
    Rendered,
    Destroyed,
}

/// Published to [`Chart::on_event`] subscribers.
#[derive(Debug, Clone, PartialEq)]
pub enum ChartEvent {
    Rendered { status: RenderStatus, diff: SceneDiff },
    Resized(Size),
    Destroyed,
}

/// Everything a [`ChartKind`] needs to lay out one frame.
pub struct DrawContext<'a> {
    pub area: PlotArea,
    pub options: &'a ChartOptions,
    pub theme: &'a ChartTheme,
    pub style: &'a ChartStyle,
}

impl<'a> DrawContext<'a> {
    pub fn ink(&self) -> Ink<'a> {
        Ink {
            theme: self.theme,
            style: self.style,
        }
    }

    /// Title and axis captions, falling back to the variant's default
    /// captions when the options leave them unset.
    pub fn chrome(&self, x_label: &str, y_label: &str, y2_label: Option<&str>) -> Vec<Element> {
        let x = self.options.x_axis_label.as_deref().unwrap_or(x_label);
        let y = self.options.y_axis_label.as_deref().unwrap_or(y_label);
        let mut out = axis::axis_labels(&self.area, x, y, y2_label, self.ink());
        if let Some(title) = self.options.title.as_deref().filter(|t| !t.is_empty()) {
            out.push(axis::title(&self.area, title, self.ink()));
        }
        out
    }
}

/// Per-variant geometry: how one kind of series becomes scene elements.
pub trait ChartKind: Send + 'static {
    type Data: Clone + Default + Send;

    const TYPE: ChartType;

    fn has_data(data: &Self::Data, options: &ChartOptions) -> bool;

    /// Elements for one frame, in paint order. Only called when
    /// [`ChartKind::has_data`] is true.
    fn draw(data: &Self::Data, ctx: &DrawContext<'_>) -> Vec<Element>;
}

/// The operations every chart supports.
pub trait Visualization {
    type Data;

    /// Prepare the chart for rendering. A second call is a no-op.
    fn init(&mut self) -> ChartResult<()>;

    /// Rebuild the scene from the current data, options and size.
    fn render(&mut self) -> ChartResult<SceneDiff>;

    fn resize(&mut self) -> ChartResult<SceneDiff>;

    /// Replace the data and re-render.
    fn update_data(&mut self, data: Self::Data) -> ChartResult<SceneDiff>;

    /// Merge `patch` into the options and re-render.
    fn update_options(&mut self, patch: ChartOptionsPatch) -> ChartResult<SceneDiff>;

    /// Stop observing the container and drop everything drawn. Terminal.
    fn destroy(&mut self) -> ChartResult<()>;

    fn state(&self) -> LifecycleState;
}

pub struct Chart<K: ChartKind> {
    id: String,
    container: Container,
    theme: ChartTheme,
    style: ChartStyle,
    options: ChartOptions,
    data: K::Data,
    state: LifecycleState,
    scene: Scene,
    events: Observers<ChartEvent>,
    resize_subscription: Option<Subscription>,
    kind: PhantomData<fn() -> K>,
}

impl<K: ChartKind> Chart<K> {
    /// Create a chart with no data. The id must be non-empty.
    pub fn new(
        id: &str,
        container: Container,
        theme: ChartTheme,
        options: ChartOptions,
    ) -> ChartResult<Self> {
        if id.trim().is_empty() {
            return Err(ChartError::Configuration(format!(
                "{} chart requires an id",
                K::TYPE
            )));
        }
        Ok(Self {
            id: id.to_string(),
            container,
            theme,
            style: ChartStyle::default(),
            options: options.normalized(),
            data: K::Data::default(),
            state: LifecycleState::Uninitialized,
            scene: Scene::default(),
            events: Observers::new(),
            resize_subscription: None,
            kind: PhantomData,
        })
    }

    pub fn with_style(mut self, style: ChartStyle) -> Self {
        self.style = style;
        self
    }

    pub fn with_data(mut self, data: K::Data) -> Self {
        self.data = data;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn data(&self) -> &K::Data {
        &self.data
    }

    pub fn options(&self) -> &ChartOptions {
        &self.options
    }

    pub fn theme(&self) -> &ChartTheme {
        &self.theme
    }

    /// The scene produced by the last render; empty before the first
    /// render and after destroy.
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn status(&self) -> RenderStatus {
        self.scene.status
    }

    /// Size used for layout: explicit option sizes win over the container.
    pub fn size(&self) -> Size {
        let container = self.container.size();
        Size::new(
            self.options.width.unwrap_or(container.width),
            self.options.height.unwrap_or(container.height),
        )
    }

    pub fn tooltip_at(&self, point: Point) -> Option<&Tooltip> {
        self.scene.tooltip_at(point)
    }

    pub fn on_event<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&ChartEvent) + Send + Sync + 'static,
    {
        self.events.subscribe(callback)
    }

    /// Initialize, render once and start following container resizes.
    ///
    /// The chart is moved behind a shared lock so the resize observer can
    /// reach it; the observer only holds a weak reference and is removed by
    /// `destroy`.
    pub fn mount(mut self) -> ChartResult<Arc<Mutex<Self>>> {
        self.init()?;
        self.render()?;
        let container = self.container.clone();
        let chart = Arc::new(Mutex::new(self));

        let weak = Arc::downgrade(&chart);
        let subscription = container.on_resize(move |size| {
            let Some(chart) = weak.upgrade() else {
                return;
            };
            let Ok(mut chart) = chart.lock() else {
                return;
            };
            if chart.state == LifecycleState::Destroyed {
                return;
            }
            if let Err(e) = chart.resize() {
                log::warn!("resize of chart '{}' to {:?} failed: {}", chart.id, size, e);
            }
        });

        match chart.lock() {
            Ok(mut guard) => guard.resize_subscription = Some(subscription),
            Err(_) => {
                return Err(ChartError::Configuration(
                    "chart lock poisoned while mounting".to_string(),
                ))
            }
        }
        Ok(chart)
    }

    fn ensure_live(&self) -> ChartResult<()> {
        match self.state {
            LifecycleState::Destroyed => {
                log::error!("chart '{}' used after destroy()", self.id);
                Err(ChartError::Destroyed(self.id.clone()))
            }
            LifecycleState::Uninitialized => {
                log::error!("chart '{}' used before init()", self.id);
                Err(ChartError::NotInitialized(self.id.clone()))
            }
            _ => Ok(()),
        }
    }

    fn build_scene(&self) -> Scene {
        let size = self.size();
        let area = PlotArea::new(size.width, size.height, self.options.margin);
        let ctx = DrawContext {
            area,
            options: &self.options,
            theme: &self.theme,
            style: &self.style,
        };

        let mut scene = Scene::new(size.width, size.height);
        scene.background = Some(self.theme.background);
        if K::has_data(&self.data, &self.options) {
            scene.elements = K::draw(&self.data, &ctx);
        } else {
            scene.status = RenderStatus::NoData;
            scene.elements.push(axis::no_data(&area, ctx.ink()));
        }
        scene
    }
}

impl<K: ChartKind> Visualization for Chart<K> {
    type Data = K::Data;

    fn init(&mut self) -> ChartResult<()> {
        match self.state {
            LifecycleState::Uninitialized => {
                self.state = LifecycleState::Initialized;
                log::debug!("initialized {} chart '{}'", K::TYPE, self.id);
                Ok(())
            }
            LifecycleState::Destroyed => self.ensure_live(),
            _ => {
                log::warn!("chart '{}' is already initialized", self.id);
                Ok(())
            }
        }
    }

    fn render(&mut self) -> ChartResult<SceneDiff> {
        self.ensure_live()?;
        let next = self.build_scene();
        let diff = self.scene.diff(&next);
        log::debug!(
            "rendered {} chart '{}': {} added, {} updated, {} removed",
            K::TYPE,
            self.id,
            diff.added.len(),
            diff.updated.len(),
            diff.removed.len()
        );
        self.scene = next;
        self.state = LifecycleState::Rendered;
        self.events.notify(&ChartEvent::Rendered {
            status: self.scene.status,
            diff: diff.clone(),
        });
        Ok(diff)
    }

    fn resize(&mut self) -> ChartResult<SceneDiff> {
        let diff = self.render()?;
        self.events.notify(&ChartEvent::Resized(self.size()));
        Ok(diff)
    }

    fn update_data(&mut self, data: K::Data) -> ChartResult<SceneDiff> {
        self.ensure_live()?;
        self.data = data;
        self.render()
    }

    fn update_options(&mut self, patch: ChartOptionsPatch) -> ChartResult<SceneDiff> {
        self.ensure_live()?;
        self.options.apply(patch);
        self.render()
    }

    fn destroy(&mut self) -> ChartResult<()> {
        if self.state == LifecycleState::Destroyed {
            return self.ensure_live();
        }
        if let Some(subscription) = self.resize_subscription.take() {
            subscription.unsubscribe();
        }
        self.scene = Scene::default();
        self.data = K::Data::default();
        self.state = LifecycleState::Destroyed;
        log::debug!("destroyed {} chart '{}'", K::TYPE, self.id);
        self.events.notify(&ChartEvent::Destroyed);
        Ok(())
    }

    fn state(&self) -> LifecycleState {
        self.state
    }
}
