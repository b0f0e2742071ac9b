//! Navigation pipeline
//!
//! The router hands every recognized, routed instruction to a [`Pipeline`].
//! [`LifecyclePipeline`] runs an ordered list of [`NavigationStep`]s and
//! stops at the first failure.
//!
//! # Default Steps
//!
//! ```text
//! RoutedInstruction
//!     │
//!     ▼
//! ┌─────────────────────────┐
//! │   CanDeactivateStep     │  live views may leave?
//! └───────────┬─────────────┘
//!             ▼
//! ┌─────────────────────────┐
//! │   CanActivateStep       │  new views may enter?
//! └───────────┬─────────────┘
//!             ▼
//! ┌─────────────────────────┐
//! │   ActivateStep          │  swap views, parents first
//! └─────────────────────────┘
//! ```

use async_trait::async_trait;
use futures::future::BoxFuture;
use futures::FutureExt;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::error::NavigationError;
use crate::router::Router;
use crate::tree::RoutedInstruction;

/// Multi-step navigation executor shared by a whole router tree
#[async_trait]
pub trait Pipeline: Send + Sync {
    /// Run the navigation lifecycle for a routed instruction tree
    async fn process(&self, instruction: &RoutedInstruction) -> Result<(), NavigationError>;
}

/// One stage of a [`LifecyclePipeline`]
#[async_trait]
pub trait NavigationStep: Send + Sync {
    /// Run this stage
    async fn run(&self, instruction: &RoutedInstruction) -> Result<(), NavigationError>;

    /// Step name for logging
    fn name(&self) -> &'static str;
}

/// Pipeline running its steps in order
pub struct LifecyclePipeline {
    steps: Vec<Box<dyn NavigationStep>>,
}

impl LifecyclePipeline {
    /// Create a pipeline with no steps
    pub fn new() -> Self {
        Self { steps: Vec::new() }
    }

    /// Append a step
    pub fn with_step(mut self, step: impl NavigationStep + 'static) -> Self {
        self.steps.push(Box::new(step));
        self
    }

    /// Names of the configured steps, in order
    pub fn step_names(&self) -> Vec<&'static str> {
        self.steps.iter().map(|step| step.name()).collect()
    }
}

impl Default for LifecyclePipeline {
    fn default() -> Self {
        Self::new()
            .with_step(CanDeactivateStep)
            .with_step(CanActivateStep)
            .with_step(ActivateStep)
    }
}

#[async_trait]
impl Pipeline for LifecyclePipeline {
    async fn process(&self, instruction: &RoutedInstruction) -> Result<(), NavigationError> {
        for step in &self.steps {
            debug!(
                step = step.name(),
                router = %instruction.router().name(),
                component = %instruction.component(),
                "Running pipeline step"
            );
            if let Err(e) = step.run(instruction).await {
                warn!(step = step.name(), error = %e, "Pipeline step failed");
                return Err(e);
            }
        }
        Ok(())
    }
}

/// Guard walk over the views currently shown
pub struct CanDeactivateStep;

#[async_trait]
impl NavigationStep for CanDeactivateStep {
    async fn run(&self, instruction: &RoutedInstruction) -> Result<(), NavigationError> {
        instruction
            .router()
            .can_deactivate_ports(Some(instruction))
            .await
    }

    fn name(&self) -> &'static str {
        "CanDeactivate"
    }
}

/// Asks each incoming slot's view whether it accepts the new instruction
pub struct CanActivateStep;

fn can_activate_slot<'r>(
    router: &'r Arc<Router>,
    child: &'r RoutedInstruction,
    viewport: &'r str,
) -> BoxFuture<'r, Result<bool, NavigationError>> {
    async move {
        // Unmounted slots accept anything
        let Some(port) = router.viewports().get(viewport) else {
            return Ok(true);
        };
        port.can_activate(child.instruction())
            .await
            .map_err(|e| NavigationError::NavigationVetoed {
                router: router.name().to_string(),
                viewport: viewport.to_string(),
                reason: Some(e.to_string()),
            })
    }
    .boxed()
}

#[async_trait]
impl NavigationStep for CanActivateStep {
    async fn run(&self, instruction: &RoutedInstruction) -> Result<(), NavigationError> {
        instruction
            .router()
            .traverse_instruction(instruction, &can_activate_slot)
            .await
    }

    fn name(&self) -> &'static str {
        "CanActivate"
    }
}

/// Activation walk over the new instruction tree
pub struct ActivateStep;

#[async_trait]
impl NavigationStep for ActivateStep {
    async fn run(&self, instruction: &RoutedInstruction) -> Result<(), NavigationError> {
        instruction.router().activate_ports(instruction).await
    }

    fn name(&self) -> &'static str {
        "Activate"
    }
}
