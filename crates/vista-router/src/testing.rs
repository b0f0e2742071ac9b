//! Test doubles shared by the unit tests

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use vista_types::{Instruction, Params, RouteTable};

use crate::error::{NavigationError, RouterError};
use crate::grammar::Grammar;
use crate::pipeline::{LifecyclePipeline, Pipeline};
use crate::router::Router;
use crate::tree::RoutedInstruction;
use crate::viewport::ViewPort;

/// Grammar answering from a fixed URL → instruction map
#[derive(Clone, Default)]
pub struct ScriptedGrammar {
    routes: Arc<Mutex<HashMap<String, Instruction>>>,
    configured: Arc<Mutex<Vec<String>>>,
}

impl ScriptedGrammar {
    pub fn with_route(self, url: &str, instruction: Instruction) -> Self {
        self.add_route(url, instruction);
        self
    }

    pub fn add_route(&self, url: &str, instruction: Instruction) {
        self.routes.lock().insert(url.to_string(), instruction);
    }

    pub fn configured(&self) -> Vec<String> {
        self.configured.lock().clone()
    }
}

impl Grammar for ScriptedGrammar {
    fn config(&self, router_name: &str, _table: RouteTable) -> Result<(), RouterError> {
        self.configured.lock().push(router_name.to_string());
        Ok(())
    }

    fn recognize(&self, url: &str) -> Option<Instruction> {
        self.routes.lock().get(url).cloned()
    }

    fn generate(&self, name: &str, _params: &Params) -> Result<String, RouterError> {
        Err(RouterError::UnknownRouteName(name.to_string()))
    }
}

/// Pipeline counting its calls, optionally held open or failing
#[derive(Clone, Default)]
pub struct CountingPipeline {
    calls: Arc<AtomicUsize>,
    gated: bool,
    entered: Arc<Notify>,
    release: Arc<Notify>,
    fail_on: Option<String>,
}

impl CountingPipeline {
    pub fn gated() -> Self {
        Self {
            gated: true,
            ..Self::default()
        }
    }

    pub fn failing_on(url: &str) -> Self {
        Self {
            fail_on: Some(url.to_string()),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub async fn wait_until_entered(&self) {
        self.entered.notified().await;
    }

    pub fn release(&self) {
        self.release.notify_one();
    }
}

#[async_trait]
impl Pipeline for CountingPipeline {
    async fn process(&self, instruction: &RoutedInstruction) -> Result<(), NavigationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.gated {
            self.entered.notify_one();
            self.release.notified().await;
        }
        if self.fail_on.is_some() && self.fail_on.as_deref() == instruction.canonical_url() {
            return Err(NavigationError::Pipeline {
                step: "counting".to_string(),
                source: anyhow::anyhow!("scripted failure"),
            });
        }
        Ok(())
    }
}

/// View handle recording every lifecycle call
pub struct RecordingPort {
    name: String,
    log: Arc<Mutex<Vec<String>>>,
    activated: Mutex<Vec<String>>,
    deactivated: Mutex<Vec<String>>,
    activate_calls: AtomicUsize,
    can_deactivate_calls: AtomicUsize,
    failing: AtomicBool,
    vetoing: AtomicBool,
    refusing: AtomicBool,
    slow: AtomicBool,
}

impl RecordingPort {
    pub fn new(name: &str) -> Arc<Self> {
        Self::logging(name, &Arc::new(Mutex::new(Vec::new())))
    }

    pub fn logging(name: &str, log: &Arc<Mutex<Vec<String>>>) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            log: log.clone(),
            activated: Mutex::new(Vec::new()),
            deactivated: Mutex::new(Vec::new()),
            activate_calls: AtomicUsize::new(0),
            can_deactivate_calls: AtomicUsize::new(0),
            failing: AtomicBool::new(false),
            vetoing: AtomicBool::new(false),
            refusing: AtomicBool::new(false),
            slow: AtomicBool::new(false),
        })
    }

    pub fn failing(self: Arc<Self>) -> Arc<Self> {
        self.failing.store(true, Ordering::SeqCst);
        self
    }

    pub fn vetoing(self: Arc<Self>) -> Arc<Self> {
        self.set_vetoing(true);
        self
    }

    pub fn refusing(self: Arc<Self>) -> Arc<Self> {
        self.refusing.store(true, Ordering::SeqCst);
        self
    }

    pub fn slow(self: Arc<Self>) -> Arc<Self> {
        self.slow.store(true, Ordering::SeqCst);
        self
    }

    pub fn set_vetoing(&self, vetoing: bool) {
        self.vetoing.store(vetoing, Ordering::SeqCst);
    }

    pub fn activated(&self) -> Vec<String> {
        self.activated.lock().clone()
    }

    pub fn deactivated(&self) -> Vec<String> {
        self.deactivated.lock().clone()
    }

    pub fn activate_calls(&self) -> usize {
        self.activate_calls.load(Ordering::SeqCst)
    }

    pub fn can_deactivate_calls(&self) -> usize {
        self.can_deactivate_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ViewPort for RecordingPort {
    async fn activate(&self, instruction: &Instruction) -> anyhow::Result<()> {
        self.activate_calls.fetch_add(1, Ordering::SeqCst);
        self.log
            .lock()
            .push(format!("{}:activate:{}", self.name, instruction.component));

        if self.slow.load(Ordering::SeqCst) {
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        if self.failing.load(Ordering::SeqCst) {
            anyhow::bail!("{} failed to activate", self.name);
        }

        self.activated.lock().push(instruction.component.clone());
        self.log
            .lock()
            .push(format!("{}:activate:{}:done", self.name, instruction.component));
        Ok(())
    }

    async fn can_deactivate(
        &self,
        _current: &Instruction,
        _next: Option<&Instruction>,
    ) -> anyhow::Result<bool> {
        self.can_deactivate_calls.fetch_add(1, Ordering::SeqCst);
        Ok(!self.vetoing.load(Ordering::SeqCst))
    }

    async fn can_activate(&self, _instruction: &Instruction) -> anyhow::Result<bool> {
        Ok(!self.refusing.load(Ordering::SeqCst))
    }

    async fn deactivate(&self, current: &Instruction) -> anyhow::Result<()> {
        self.deactivated.lock().push(current.component.clone());
        Ok(())
    }
}

/// Root router with the default lifecycle pipeline
pub fn router_with(grammar: ScriptedGrammar) -> Arc<Router> {
    pipeline_router(grammar, LifecyclePipeline::default())
}

/// Root router with a specific pipeline
pub fn pipeline_router(grammar: ScriptedGrammar, pipeline: impl Pipeline + 'static) -> Arc<Router> {
    Router::root(Arc::new(grammar), Arc::new(pipeline))
}
