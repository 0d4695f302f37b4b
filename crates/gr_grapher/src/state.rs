use gr_chart_state::{ChartState, DeriveCtx};
use gr_config::{ChartType, GrapherConfig, GrapherQueryParams, Tab};
use gr_indicator::IndicatorTable;
use gr_types::{EntityName, TimeBounds, VariableId};

use crate::memo::{Derived, Input};
use crate::{GrapherError, Result, SelectionManager};

// ----------------------------------------------------------------------------

/// Where the state machine is:
/// `Uninitialized → ConfigLoading → DataLoading → Ready`.
///
/// `Ready` cycles back to `DataLoading` when the table is re-fetched with
/// the config intact, and back to `ConfigLoading` when a whole new config
/// is applied.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LoadState {
    #[default]
    Uninitialized,
    ConfigLoading,
    DataLoading,
    Ready,
}

/// Guards an in-flight fetch. Tokens from superseded fetches no longer
/// match the state's generation and their results are discarded on arrival:
/// last-requested-wins, never first-completed-wins.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FetchToken {
    generation: u64,
}

/// What the baker and search indexer read: derived summary fields only,
/// no transform internals.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GrapherSummary {
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub available_entities: Vec<EntityName>,
}

// ----------------------------------------------------------------------------

/// The central reactive object: owns the full config, the loaded table, the
/// selection, the current time window and tab, and the memoized per-type
/// chart states.
#[derive(Debug, Default)]
pub struct GrapherState {
    /// The live config (user/URL actions mutate it).
    config: Input<GrapherConfig>,

    /// The config exactly as applied, before any URL/user overrides. The
    /// query-string encoder emits only what differs from this.
    authored: GrapherConfig,

    /// The loaded indicator table. Exclusively owned here; chart states
    /// share its columns read-only.
    table: Input<IndicatorTable>,

    selection: SelectionManager,

    time_range: Input<TimeBounds>,
    tab: Input<Tab>,

    /// Line charts: show only first and last point (URL toggle).
    endpoints_only: bool,

    load_state: LoadState,

    /// Fetch generation; see [`FetchToken`].
    generation: u64,

    /// One memoized derivation per chart type, so switching types (or
    /// tabs) and back re-derives nothing and refetches nothing.
    chart_states: ahash::HashMap<ChartType, Derived<ChartState>>,
}

impl GrapherState {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn load_state(&self) -> LoadState {
        self.load_state
    }

    #[inline]
    pub fn config(&self) -> &GrapherConfig {
        self.config.get()
    }

    #[inline]
    pub fn table(&self) -> &IndicatorTable {
        self.table.get()
    }

    #[inline]
    pub fn selection(&self) -> &SelectionManager {
        &self.selection
    }

    #[inline]
    pub fn selection_mut(&mut self) -> &mut SelectionManager {
        &mut self.selection
    }

    #[inline]
    pub fn time_range(&self) -> TimeBounds {
        *self.time_range.get()
    }

    #[inline]
    pub fn tab(&self) -> Tab {
        *self.tab.get()
    }

    // --- Lifecycle ---

    /// Announce that a (new) config is being fetched. Any in-flight fetch —
    /// config or data — is superseded from this moment.
    pub fn begin_config_load(&mut self) -> FetchToken {
        self.generation += 1;
        self.load_state = LoadState::ConfigLoading;
        FetchToken {
            generation: self.generation,
        }
    }

    /// Apply a freshly fetched (already migrated) config: a fresh cycle.
    /// Seeds selection, time window and tab from the config, then moves to
    /// `DataLoading` and hands out the token for the data fetch.
    pub fn apply_config(&mut self, config: GrapherConfig) -> FetchToken {
        self.selection
            .set_selected_entities(config.selected_entity_names.iter().cloned());
        self.time_range.set(config.time_range);
        self.tab.set(config.tab);
        self.authored = config.clone();
        self.config.set(config);
        self.chart_states.clear();

        self.generation += 1;
        self.load_state = LoadState::DataLoading;
        FetchToken {
            generation: self.generation,
        }
    }

    /// Parse, migrate and apply a persisted config JSON.
    pub fn apply_config_json(&mut self, json: &str) -> Result<FetchToken> {
        let config = GrapherConfig::from_json(json)?;
        Ok(self.apply_config(config))
    }

    /// The variable ids the data fetch must deliver for the current config.
    pub fn required_variable_ids(&self) -> Vec<VariableId> {
        self.config.get().variable_ids()
    }

    /// Announce a data re-fetch with the config intact (`Ready →
    /// DataLoading`). Supersedes any in-flight data fetch.
    pub fn begin_data_load(&mut self) -> FetchToken {
        self.generation += 1;
        self.load_state = LoadState::DataLoading;
        FetchToken {
            generation: self.generation,
        }
    }

    /// Deliver fetched data. Returns false — and changes nothing — if the
    /// token was superseded by a newer fetch; the stale result must never
    /// overwrite a state that has moved on.
    pub fn complete_data_load(&mut self, token: FetchToken, table: IndicatorTable) -> bool {
        if token.generation != self.generation {
            gr_log::warn_once!(
                "discarding stale fetch result (generation {} < {})",
                token.generation,
                self.generation
            );
            return false;
        }

        self.selection
            .set_available_entities(table.entities().iter().cloned());
        self.table.set(table);
        self.load_state = LoadState::Ready;
        true
    }

    // --- Mutations ---

    pub fn set_tab(&mut self, tab: Tab) {
        self.tab.set(tab);
    }

    pub fn set_time_range(&mut self, bounds: TimeBounds) {
        self.time_range.set(bounds);
    }

    /// Switch the chart type. Purely a re-derivation from the loaded table;
    /// no fetch is involved.
    pub fn set_chart_type(&mut self, chart_type: ChartType) {
        self.config.modify(|config| config.chart_type = chart_type);
    }

    // --- Derivation ---

    /// The chart type the active tab shows.
    pub fn active_chart_type(&self) -> ChartType {
        match *self.tab.get() {
            Tab::Map => ChartType::WorldMap,
            Tab::Chart | Tab::Table => self.config.get().chart_type,
        }
    }

    /// The derived state for the active tab's chart type. Memoized:
    /// recomputed only when config, table, selection or time window
    /// actually changed.
    pub fn chart_state(&mut self) -> Result<&ChartState> {
        self.chart_state_for(self.active_chart_type())
    }

    /// The derived state for any chart type (all types share the loaded
    /// table; none of them may mutate it).
    pub fn chart_state_for(&mut self, chart_type: ChartType) -> Result<&ChartState> {
        let Self {
            config,
            table,
            selection,
            time_range,
            chart_states,
            ..
        } = self;

        let revisions = [
            config.revision(),
            table.revision(),
            selection.revision(),
            time_range.revision(),
        ];

        let derived = chart_states.entry(chart_type).or_default();
        derived
            .try_get_or_compute(&revisions, || {
                // The state's live time window overrides the config's.
                let mut effective = config.get().clone();
                effective.time_range = *time_range.get();

                let ctx = DeriveCtx {
                    table: table.get(),
                    config: &effective,
                    selection: selection.selected_entity_names(),
                };
                ChartState::derive(chart_type, &ctx)
            })
            .map_err(GrapherError::from)
    }

    // --- Query-string synchronization ---

    /// Serialize the state that differs from the authored config into URL
    /// query params.
    pub fn to_query_string(&self) -> String {
        let mut params = GrapherQueryParams::default();

        if *self.time_range.get() != self.authored.time_range {
            params.time = Some(*self.time_range.get());
        }
        if *self.tab.get() != self.authored.tab {
            params.tab = Some(*self.tab.get());
        }
        if self.selection.selected_entity_names() != self.authored.selected_entity_names.as_slice() {
            params.selection = Some(self.selection.selected_entity_names().to_vec());
        }

        let config = self.config.get();
        if config.stack_mode != self.authored.stack_mode {
            params.stack_mode = Some(config.stack_mode);
        }
        if config.x_axis.scale_type != self.authored.x_axis.scale_type {
            params.x_scale = Some(config.x_axis.scale_type);
        }
        if config.y_axis.scale_type != self.authored.y_axis.scale_type {
            params.y_scale = Some(config.y_axis.scale_type);
        }
        if config.facet != self.authored.facet {
            params.facet = Some(config.facet);
        }
        if config.map.region != self.authored.map.region {
            params.region = Some(config.map.region);
        }
        if self.endpoints_only {
            params.endpoints_only = Some(true);
        }

        params.to_query_string()
    }

    /// Populate state from an incoming query string (navigation or a
    /// programmatic URL). Recognized keys apply; unrecognized ones are
    /// ignored without erroring.
    pub fn apply_query_string(&mut self, query: &str) {
        let params = GrapherQueryParams::from_query_string(query);

        if let Some(time) = params.time {
            self.time_range.set(time);
        }
        if let Some(tab) = params.tab {
            self.tab.set(tab);
        }
        if let Some(selection) = params.selection {
            let resolved: Vec<EntityName> = selection
                .iter()
                .map(|name_or_code| self.selection.resolve(name_or_code.as_str()))
                .collect();
            self.selection.set_selected_entities(resolved);
        }
        if let Some(stack_mode) = params.stack_mode {
            self.config.modify(|config| config.stack_mode = stack_mode);
        }
        if let Some(scale) = params.x_scale {
            self.config.modify(|config| config.x_axis.scale_type = scale);
        }
        if let Some(scale) = params.y_scale {
            self.config.modify(|config| config.y_axis.scale_type = scale);
        }
        if let Some(facet) = params.facet {
            self.config.modify(|config| config.facet = facet);
        }
        if let Some(region) = params.region {
            self.config.modify(|config| config.map.region = region);
        }
        if let Some(endpoints_only) = params.endpoints_only {
            self.endpoints_only = endpoints_only;
        }
    }

    // --- Derived summary ---

    /// The summary the baker/search indexer consume.
    pub fn summary(&self) -> GrapherSummary {
        GrapherSummary {
            title: self.config.get().title.clone(),
            subtitle: self.config.get().subtitle.clone(),
            available_entities: self.selection.available_entity_names().cloned().collect(),
        }
    }
}
