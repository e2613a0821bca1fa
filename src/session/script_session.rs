use std::time::Duration;

use crate::animation::engine::{AnimationEngine, PlaybackMode, TickOutcome};
use crate::animation::scheduler::{ManualClock, Scheduler, TimerHandle};
use crate::animation::track::Track;
use crate::document::model::DocumentModel;
use crate::foundation::config::SessionConfig;
use crate::foundation::core::{ElementId, Point};
use crate::foundation::diagnostics::{Diagnostic, DiagnosticSink};
use crate::foundation::error::{ScriptError, ScriptResult, TypeCheckFailure};
use crate::generator::dsl::generate_script;
use crate::interpreter::apply::{apply_plan, write_position};
use crate::interpreter::plan::{Navigation, build_plan};
use crate::presentation::controller::{Presentation, has_slide_breaks};
use crate::runtime::context::{BindingKind, Change, Runtime};
use crate::runtime::handlers::{EventKind, Handler};
use crate::runtime::variables::VarType;
use crate::script::checker::type_check;
use crate::script::command::{ScriptLine, parse_lines, parse_script};

/// What one entry point did to the document, plus every non-fatal problem it met.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize)]
pub struct ExecutionReport {
    /// Line, lookup and engine-fault diagnostics, in the order they were found.
    pub diagnostics: Vec<Diagnostic>,
    /// Elements created, including those of slides entered along the way.
    pub created: usize,
    /// Connections created.
    pub connections: usize,
    /// Animation tracks loaded into the engine.
    pub tracks: usize,
}

#[derive(Default)]
struct Run {
    sink: DiagnosticSink,
    created: usize,
    connections: usize,
    tracks: usize,
}

impl Run {
    fn finish(self) -> ExecutionReport {
        ExecutionReport {
            diagnostics: self.sink.into_vec(),
            created: self.created,
            connections: self.connections,
            tracks: self.tracks,
        }
    }
}

/// One scripting session bound to a document and a host scheduler.
///
/// The session owns the variable runtime, the handler registry, the animation engine and the
/// presentation state. Everything runs synchronously on the caller's thread; the host feeds
/// timer callbacks back through [`Session::on_timer`].
pub struct Session<D: DocumentModel, S: Scheduler> {
    doc: D,
    scheduler: S,
    config: SessionConfig,
    runtime: Runtime,
    engine: AnimationEngine,
    presentation: Option<Presentation>,
    timer: Option<TimerHandle>,
    last_tick: Option<Duration>,
    handler_depth: usize,
    loading_slide: bool,
    queued_navigation: Option<Navigation>,
}

impl<D: DocumentModel, S: Scheduler> Session<D, S> {
    /// Session with the default configuration.
    pub fn new(doc: D, scheduler: S) -> Self {
        let config = SessionConfig::default();
        Self {
            doc,
            scheduler,
            runtime: Runtime::new(config.tolerance),
            config,
            engine: AnimationEngine::new(),
            presentation: None,
            timer: None,
            last_tick: None,
            handler_depth: 0,
            loading_slide: false,
            queued_navigation: None,
        }
    }

    pub fn with_config(doc: D, scheduler: S, config: SessionConfig) -> ScriptResult<Self> {
        config.validate()?;
        let mut session = Self::new(doc, scheduler);
        session.runtime = Runtime::new(config.tolerance);
        session.config = config;
        Ok(session)
    }

    pub fn doc(&self) -> &D {
        &self.doc
    }

    pub fn doc_mut(&mut self) -> &mut D {
        &mut self.doc
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn runtime(&self) -> &Runtime {
        &self.runtime
    }

    pub fn engine(&self) -> &AnimationEngine {
        &self.engine
    }

    pub fn presentation(&self) -> Option<&Presentation> {
        self.presentation.as_ref()
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Run only the static pass, without touching any state.
    pub fn check(&self, script: &str, source: Option<&str>) -> Result<(), TypeCheckFailure> {
        let globals: Vec<&str> = self
            .runtime
            .variables()
            .iter()
            .filter(|v| v.global)
            .map(|v| v.name.as_str())
            .collect();
        type_check(&parse_script(script), &globals, source)
    }

    /// Execute a top-level script.
    ///
    /// The script is type-checked first; a structural error aborts before any mutation and
    /// surfaces one notice through the document. Otherwise the runtime is reset (globals are
    /// kept) and the script runs. A script with slide-break markers starts a presentation at
    /// its first slide; any other script replaces a running presentation.
    #[tracing::instrument(skip(self, script), fields(lines = script.lines().count()))]
    pub fn execute(&mut self, script: &str, source: Option<&str>) -> ScriptResult<ExecutionReport> {
        if let Err(failure) = self.check(script, source) {
            tracing::warn!(errors = failure.diagnostics.len(), "script rejected");
            self.doc.notify(&failure.notice());
            return Err(ScriptError::TypeCheck(failure));
        }

        self.stop_animation();
        self.runtime.reset();
        let mut run = Run::default();

        if has_slide_breaks(script) {
            self.presentation = Presentation::new(script);
            match &self.presentation {
                Some(p) => {
                    tracing::debug!(slides = p.len(), "presentation started");
                    self.enter_slide(0, false, &mut run);
                }
                None => tracing::debug!("presentation script has no slides"),
            }
        } else {
            if self.presentation.take().is_some() {
                tracing::debug!("presentation replaced by a plain script");
            }
            self.run_lines(&parse_script(script), &mut run);
        }
        Ok(run.finish())
    }

    /// Move to the next slide. Past the last slide this only shows a notice.
    pub fn next_slide(&mut self) -> ExecutionReport {
        let mut run = Run::default();
        self.navigate(Navigation::Next, &mut run);
        run.finish()
    }

    /// Move to the previous slide. Before the first slide this only shows a notice.
    pub fn prev_slide(&mut self) -> ExecutionReport {
        let mut run = Run::default();
        self.navigate(Navigation::Prev, &mut run);
        run.finish()
    }

    /// End the presentation; the current slide's elements stay on the canvas.
    pub fn stop_presentation(&mut self) {
        self.stop_animation();
        if let Some(p) = self.presentation.as_mut() {
            p.deactivate();
        }
    }

    /// Stop the animation engine and cancel its timer. Track definitions are kept.
    pub fn stop_animation(&mut self) {
        self.engine.stop();
        self.stop_timer();
    }

    /// Host timer callback. Callbacks for cancelled timers are ignored.
    pub fn on_timer(&mut self, handle: TimerHandle) -> TickOutcome {
        if self.timer != Some(handle) {
            return TickOutcome::Inactive;
        }
        let now = self.scheduler.now();
        let delta = self
            .last_tick
            .map(|prev| now.saturating_sub(prev).as_secs_f64())
            .unwrap_or(0.0);
        self.last_tick = Some(now);

        let outcome = self.engine.tick(delta, &mut self.doc);
        if outcome != TickOutcome::Inactive {
            self.doc.request_redraw();
        }
        if outcome == TickOutcome::Completed {
            self.stop_timer();
            self.animation_finished();
        }
        outcome
    }

    /// Dispatch a click on a document element to its `on click` handler.
    ///
    /// Returns `None` when the element has no handler.
    pub fn click(&mut self, element: ElementId) -> Option<ExecutionReport> {
        let id = self.runtime.script_id_of(element)?.to_owned();
        self.click_id(&id)
    }

    /// Dispatch a click by script-local element id.
    pub fn click_id(&mut self, id: &str) -> Option<ExecutionReport> {
        let handler = self.runtime.handlers.get(EventKind::Click, id)?;
        tracing::debug!(element = id, "click handler");
        let mut run = Run::default();
        self.run_handler(&handler, &mut run);
        Some(run.finish())
    }

    /// The host changed an element's text; update a text-bound variable.
    ///
    /// String variables take the trimmed text, numeric ones its evaluated value.
    pub fn element_text_edited(&mut self, element: ElementId, text: &str) -> ExecutionReport {
        let mut run = Run::default();
        if let Some(var) = self.bound_var(element, BindingKind::Text) {
            let is_string = self
                .runtime
                .lookup(&var)
                .is_some_and(|v| v.ty == VarType::String);
            let result = if is_string {
                self.runtime.set_string(&var, text.trim())
            } else {
                let value = self.runtime.evaluate(text);
                self.runtime.set(&var, value)
            };
            self.after_external_write(result, &mut run);
        }
        run.finish()
    }

    /// The host moved an element; update a position-bound variable.
    pub fn element_moved(&mut self, element: ElementId, position: Point) -> ExecutionReport {
        let mut run = Run::default();
        if let Some(var) = self.bound_var(element, BindingKind::Position) {
            let result = write_position(&mut self.runtime, &var, position);
            self.after_external_write(result, &mut run);
        }
        run.finish()
    }

    /// Script that recreates the current document.
    pub fn generate_script(&self) -> String {
        generate_script(&self.doc)
    }

    fn bound_var(&self, element: ElementId, kind: BindingKind) -> Option<String> {
        let id = self.runtime.script_id_of(element)?;
        match self.runtime.binding_of(id) {
            Some((k, var)) if k == kind => Some(var.to_owned()),
            _ => None,
        }
    }

    fn after_external_write(&mut self, result: ScriptResult<bool>, run: &mut Run) {
        match result {
            Ok(_) => {
                self.runtime.recompute();
                self.flush(run);
                self.poll_auto_next(run);
            }
            Err(e) => run.sink.warn(0, e.to_string()),
        }
    }

    fn run_lines(&mut self, lines: &[ScriptLine], run: &mut Run) {
        let plan = build_plan(lines, &mut self.runtime, &self.config, &mut run.sink);
        let applied = apply_plan(&plan, &mut self.doc, &mut self.runtime, &mut run.sink);
        run.created += applied.created.len();
        run.connections += applied.connections.len();

        if let Some(mode) = plan.playback {
            if !applied.tracks.is_empty() {
                run.tracks += applied.tracks.len();
                self.start_engine(applied.tracks, mode);
            }
        }

        self.flush(run);
        if let Some(nav) = plan.navigation {
            self.navigate(nav, run);
        }
        self.poll_auto_next(run);
    }

    fn run_handler(&mut self, handler: &Handler, run: &mut Run) {
        self.handler_depth += 1;
        self.run_lines(&parse_lines(&handler.body), run);
        self.handler_depth -= 1;
    }

    /// Deliver queued variable changes: handlers first, then text bindings, then auto-next
    /// watches.
    fn flush(&mut self, run: &mut Run) {
        if self.handler_depth >= self.config.watcher_depth_limit {
            let dropped = self.runtime.drop_pending();
            if dropped > 0 {
                run.sink.warn(
                    0,
                    format!("variable handlers nested too deeply; {dropped} notification(s) dropped"),
                );
            }
            return;
        }

        while let Some(Change { name: var, value }) = self.runtime.pop_changed() {
            if let Some(handler) = self.runtime.handlers.get(EventKind::Variable, &var) {
                // The guard sees the value of this assignment, not the latest one.
                if handler.condition.holds(value) {
                    tracing::debug!(variable = %var, value, "variable handler");
                    self.run_handler(&handler, run);
                }
            }

            if let Some(text) = self.runtime.lookup(&var).map(|v| v.display_value()) {
                for element in self.runtime.text_bound_elements(&var) {
                    self.doc.set_text(element, &text);
                }
            }
            self.runtime.check_auto_next(&var);
        }
    }

    fn poll_auto_next(&mut self, run: &mut Run) {
        if !self.runtime.take_advance_request() {
            return;
        }
        let Some(p) = self.presentation.as_mut() else {
            tracing::debug!("auto-advance requested outside a presentation");
            return;
        };
        if !p.is_active() || p.auto_next_suppressed() {
            return;
        }
        if self.engine.is_running() {
            p.set_pending(true);
            return;
        }
        p.set_pending(false);
        self.navigate(Navigation::Next, run);
    }

    fn animation_finished(&mut self) {
        let pending = self
            .presentation
            .as_ref()
            .is_some_and(|p| p.is_active() && p.auto_next_pending());
        if pending {
            // Diagnostics reach the log through the sink; a timer callback has no report.
            let mut run = Run::default();
            self.navigate(Navigation::Next, &mut run);
        }
    }

    fn navigate(&mut self, nav: Navigation, run: &mut Run) {
        // A slide that asks to move while it loads moves once it has finished loading.
        if self.loading_slide {
            self.queued_navigation = Some(nav);
            return;
        }
        match self.navigation_target(nav) {
            Ok(index) => self.enter_slide(index, true, run),
            Err(notice) => self.doc.notify(notice),
        }
    }

    fn navigation_target(&self, nav: Navigation) -> Result<usize, &'static str> {
        match self.presentation.as_ref().filter(|p| p.is_active()) {
            Some(p) => p.target(nav),
            None => Err("No presentation is running"),
        }
    }

    /// Load slide `index`, then follow the navigations slides request while loading.
    ///
    /// A chain of as many moves as there are slides must revisit a slide, so it is cut there.
    fn enter_slide(&mut self, index: usize, clear: bool, run: &mut Run) {
        let limit = self.presentation.as_ref().map_or(0, Presentation::len);
        let mut index = index;
        let mut clear = clear;
        let mut hops = 0;
        loop {
            if clear {
                tracing::debug!(slide = index, "slide transition");
                self.stop_animation();
                self.runtime.reset();
                self.doc.clear_visuals();
                self.doc.clear_space();
            }
            self.run_slide(index, run);

            let Some(nav) = self.queued_navigation.take() else {
                return;
            };
            index = match self.navigation_target(nav) {
                Ok(next) => next,
                Err(notice) => {
                    self.doc.notify(notice);
                    return;
                }
            };
            hops += 1;
            if hops >= limit {
                run.sink.warn(
                    0,
                    format!("slide navigation loops back; staying on slide {}", self.current_slide() + 1),
                );
                return;
            }
            clear = true;
        }
    }

    fn current_slide(&self) -> usize {
        self.presentation.as_ref().map_or(0, Presentation::current)
    }

    fn run_slide(&mut self, index: usize, run: &mut Run) {
        let Some(p) = self.presentation.as_mut() else {
            return;
        };
        p.set_current(index);
        p.set_pending(false);
        p.set_suppressed(true);
        let lines = p.slide(index).map(parse_lines).unwrap_or_default();

        self.loading_slide = true;
        self.run_lines(&lines, run);
        self.loading_slide = false;

        if let Some(p) = self.presentation.as_mut() {
            p.set_suppressed(false);
        }
    }

    fn start_engine(&mut self, tracks: Vec<Track>, mode: PlaybackMode) {
        self.stop_animation();
        self.engine.load(tracks, mode);
        self.engine.start(&mut self.doc);
        if self.engine.is_running() {
            let interval = Duration::from_millis(self.config.tick_interval_ms);
            self.timer = Some(self.scheduler.schedule_repeating(interval));
            self.last_tick = Some(self.scheduler.now());
        }
    }

    fn stop_timer(&mut self) {
        if let Some(handle) = self.timer.take() {
            self.scheduler.cancel(handle);
        }
        self.last_tick = None;
    }
}

impl<D: DocumentModel> Session<D, ManualClock> {
    /// Move the fake clock forward by `by`, firing every timer that falls due on the way.
    pub fn advance(&mut self, by: Duration) -> Vec<TickOutcome> {
        let deadline = self.scheduler.now() + by;
        let mut outcomes = Vec::new();
        while let Some(handle) = self.scheduler.fire_next(deadline) {
            outcomes.push(self.on_timer(handle));
        }
        outcomes
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/script_session.rs"]
mod tests;
