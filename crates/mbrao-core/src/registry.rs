//! Engine registry
//!
//! Maps `(EngineName, EngineRole)` to engine factories. Each pair is
//! instantiated at most once per registry; later lookups return the same
//! `Arc`, so engines may keep per-instance caches.
//!
//! Registration happens up front (builder or `register_*` calls). Unknown
//! names fail with [`MbraoError::UnknownEngine`]; there is no fallback.

use crate::config::HtmlPipelineConfig;
use crate::engine::{EngineName, EngineRole, ParsingEngine, RenderingEngine, ResolvedEngine};
use crate::engines::{HtmlPipelineEngine, PlainTextEngine};
use crate::error::{MbraoError, Result};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock};

type Factory<E> = Arc<dyn Fn() -> Arc<E> + Send + Sync>;

struct Slot<E: ?Sized> {
    factory: Factory<E>,
    instance: Option<Arc<E>>,
}

impl<E: ?Sized> Slot<E> {
    fn new(factory: Factory<E>) -> Self {
        Self {
            factory,
            instance: None,
        }
    }
}

type Table<E> = RwLock<HashMap<EngineName, Slot<E>>>;

/// Registration table and instance cache for parsing and rendering engines
pub struct EngineRegistry {
    parsing: Table<dyn ParsingEngine>,
    rendering: Table<dyn RenderingEngine>,
}

impl EngineRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            parsing: RwLock::new(HashMap::new()),
            rendering: RwLock::new(HashMap::new()),
        }
    }

    /// Start building a registry
    pub fn builder() -> EngineRegistryBuilder {
        EngineRegistryBuilder::default()
    }

    /// Registry with `plain_text` and `html_pipeline` registered
    pub fn with_builtin_engines() -> Self {
        let registry = Self::new();
        registry.register_builtin_engines(HtmlPipelineConfig::default());
        registry
    }

    /// Process-wide registry with the built-in engines, created on first use
    pub fn global() -> Arc<EngineRegistry> {
        static GLOBAL: OnceLock<Arc<EngineRegistry>> = OnceLock::new();
        GLOBAL
            .get_or_init(|| Arc::new(Self::with_builtin_engines()))
            .clone()
    }

    /// Register the built-in engines, configuring the HTML pipeline
    pub fn register_builtin_engines(&self, html: HtmlPipelineConfig) {
        self.register_parsing(PlainTextEngine::NAME, PlainTextEngine::new);
        self.register_rendering(HtmlPipelineEngine::NAME, move || {
            HtmlPipelineEngine::with_config(html.clone())
        });
    }

    /// Register a parsing engine factory
    ///
    /// Replaces any previous registration of the name and drops its cached
    /// instance.
    pub fn register_parsing<E, F>(&self, name: impl Into<EngineName>, factory: F)
    where
        E: ParsingEngine + 'static,
        F: Fn() -> E + Send + Sync + 'static,
    {
        let factory: Factory<dyn ParsingEngine> =
            Arc::new(move || -> Arc<dyn ParsingEngine> { Arc::new(factory()) });
        insert(&self.parsing, name.into(), EngineRole::Parsing, factory);
    }

    /// Register an already built parsing engine
    pub fn register_parsing_instance(
        &self,
        name: impl Into<EngineName>,
        engine: Arc<dyn ParsingEngine>,
    ) {
        let factory: Factory<dyn ParsingEngine> = Arc::new(move || engine.clone());
        insert(&self.parsing, name.into(), EngineRole::Parsing, factory);
    }

    /// Register a rendering engine factory
    ///
    /// Replaces any previous registration of the name and drops its cached
    /// instance.
    pub fn register_rendering<E, F>(&self, name: impl Into<EngineName>, factory: F)
    where
        E: RenderingEngine + 'static,
        F: Fn() -> E + Send + Sync + 'static,
    {
        let factory: Factory<dyn RenderingEngine> =
            Arc::new(move || -> Arc<dyn RenderingEngine> { Arc::new(factory()) });
        insert(&self.rendering, name.into(), EngineRole::Rendering, factory);
    }

    /// Register an already built rendering engine
    pub fn register_rendering_instance(
        &self,
        name: impl Into<EngineName>,
        engine: Arc<dyn RenderingEngine>,
    ) {
        let factory: Factory<dyn RenderingEngine> = Arc::new(move || engine.clone());
        insert(&self.rendering, name.into(), EngineRole::Rendering, factory);
    }

    /// Resolve an engine by name and role
    pub fn resolve(&self, name: &EngineName, role: EngineRole) -> Result<ResolvedEngine> {
        match role {
            EngineRole::Parsing => self.parsing(name).map(ResolvedEngine::Parsing),
            EngineRole::Rendering => self.rendering(name).map(ResolvedEngine::Rendering),
        }
    }

    /// Resolve a parsing engine
    pub fn parsing(&self, name: &EngineName) -> Result<Arc<dyn ParsingEngine>> {
        resolve_in(&self.parsing, name, EngineRole::Parsing)
    }

    /// Resolve a rendering engine
    pub fn rendering(&self, name: &EngineName) -> Result<Arc<dyn RenderingEngine>> {
        resolve_in(&self.rendering, name, EngineRole::Rendering)
    }

    /// Whether a name is registered for a role
    pub fn contains(&self, name: &EngineName, role: EngineRole) -> bool {
        match role {
            EngineRole::Parsing => self.parsing.read().contains_key(name),
            EngineRole::Rendering => self.rendering.read().contains_key(name),
        }
    }

    /// Registered names for a role, sorted
    pub fn names(&self, role: EngineRole) -> Vec<EngineName> {
        let mut names: Vec<EngineName> = match role {
            EngineRole::Parsing => self.parsing.read().keys().cloned().collect(),
            EngineRole::Rendering => self.rendering.read().keys().cloned().collect(),
        };
        names.sort();
        names
    }

    /// Number of registrations across both roles
    pub fn len(&self) -> usize {
        self.parsing.read().len() + self.rendering.read().len()
    }

    /// Whether nothing is registered
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn insert<E: ?Sized>(table: &Table<E>, name: EngineName, role: EngineRole, factory: Factory<E>) {
    tracing::debug!(
        engine = %name,
        type_name = %name.type_name(),
        role = %role,
        "Registering engine"
    );
    if table.write().insert(name.clone(), Slot::new(factory)).is_some() {
        tracing::debug!(engine = %name, role = %role, "Replaced existing engine registration");
    }
}

fn resolve_in<E: ?Sized>(table: &Table<E>, name: &EngineName, role: EngineRole) -> Result<Arc<E>> {
    if let Some(instance) = table.read().get(name).and_then(|slot| slot.instance.clone()) {
        return Ok(instance);
    }

    let mut table = table.write();
    let slot = table
        .get_mut(name)
        .ok_or_else(|| MbraoError::unknown_engine(name.as_str(), role))?;

    // Another thread may have won the race between the two locks.
    if let Some(instance) = &slot.instance {
        return Ok(instance.clone());
    }

    tracing::debug!(engine = %name, role = %role, "Instantiating engine");
    let instance = (slot.factory)();
    slot.instance = Some(instance.clone());
    Ok(instance)
}

impl Default for EngineRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for EngineRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EngineRegistry")
            .field("parsing", &self.names(EngineRole::Parsing))
            .field("rendering", &self.names(EngineRole::Rendering))
            .finish()
    }
}

/// Accumulates registrations, then builds an [`EngineRegistry`]
#[derive(Default)]
pub struct EngineRegistryBuilder {
    registry: EngineRegistry,
}

impl EngineRegistryBuilder {
    /// Include the built-in engines with default settings
    pub fn builtin_engines(self) -> Self {
        self.registry
            .register_builtin_engines(HtmlPipelineConfig::default());
        self
    }

    /// Register a parsing engine factory
    pub fn parsing<E, F>(self, name: impl Into<EngineName>, factory: F) -> Self
    where
        E: ParsingEngine + 'static,
        F: Fn() -> E + Send + Sync + 'static,
    {
        self.registry.register_parsing(name, factory);
        self
    }

    /// Register a rendering engine factory
    pub fn rendering<E, F>(self, name: impl Into<EngineName>, factory: F) -> Self
    where
        E: RenderingEngine + 'static,
        F: Fn() -> E + Send + Sync + 'static,
    {
        self.registry.register_rendering(name, factory);
        self
    }

    /// Build the registry
    pub fn build(self) -> EngineRegistry {
        self.registry
    }
}
