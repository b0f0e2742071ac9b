//! Activation protocol - ordered asynchronous tree walks
//!
//! Every walk is level-synchronous: all calls at one level are issued
//! together and the walk only moves down once each of them has settled.
//!
//! ```text
//! guard walk      live router tree     ports.can_deactivate   first veto wins
//! traversal       routed instruction   visitor(slot)          first failure wins
//! activation      routed instruction   deactivate + activate  every sibling settles
//! ```
//!
//! The guard walk follows the routers that are alive right now, since the
//! views it asks are the ones currently shown. The other two walks follow
//! the new instruction tree.

use futures::future::{join_all, try_join_all, BoxFuture};
use futures::FutureExt;
use std::sync::Arc;
use tracing::{debug, trace, warn};

use crate::error::NavigationError;
use crate::router::Router;
use crate::tree::RoutedInstruction;

/// Visitor applied to every slot of a routed instruction.
///
/// Receives the router owning the slot, the routed child instruction and the
/// viewport name. `Ok(false)` vetoes the traversal.
pub type SlotVisitor = dyn for<'r> Fn(
        &'r Arc<Router>,
        &'r RoutedInstruction,
        &'r str,
    ) -> BoxFuture<'r, Result<bool, NavigationError>>
    + Send
    + Sync;

impl Router {
    /// Ask every currently shown view below this node whether it may go away
    pub fn can_deactivate_ports<'a>(
        self: &'a Arc<Self>,
        next: Option<&'a RoutedInstruction>,
    ) -> BoxFuture<'a, Result<(), NavigationError>> {
        async move {
            // Nothing shown, nothing to guard
            let checks = self
                .ports
                .entries()
                .into_iter()
                .filter_map(|entry| entry.current.clone().map(|current| (entry, current)))
                .map(|(entry, current)| {
                    let incoming = next
                        .and_then(|n| n.viewports().get(&entry.name))
                        .map(|slot| slot.instruction().clone());
                    let router = self.name.clone();

                    async move {
                        trace!(router = %router, viewport = %entry.name, "can_deactivate");
                        let reason = match entry.port.can_deactivate(&current, incoming.as_deref()).await {
                            Ok(true) => return Ok(()),
                            Ok(false) => None,
                            Err(e) => Some(e.to_string()),
                        };
                        warn!(router = %router, viewport = %entry.name, "Deactivation vetoed");
                        Err(NavigationError::NavigationVetoed {
                            router,
                            viewport: entry.name,
                            reason,
                        })
                    }
                });
            try_join_all(checks).await?;

            let children: Vec<Arc<Router>> = self.children.lock().values().cloned().collect();
            let descents = children.iter().map(|child| {
                let incoming = next.and_then(|n| {
                    n.viewports()
                        .values()
                        .find(|slot| Arc::ptr_eq(slot.router(), child))
                });
                child.can_deactivate_ports(incoming)
            });
            try_join_all(descents).await?;

            Ok(())
        }
        .boxed()
    }

    /// Apply `visit` to every slot of `routed`, one level at a time.
    ///
    /// A visit returning `Ok(false)` or an error aborts the whole traversal.
    pub fn traverse_instruction<'a>(
        self: &'a Arc<Self>,
        routed: &'a RoutedInstruction,
        visit: &'a SlotVisitor,
    ) -> BoxFuture<'a, Result<(), NavigationError>> {
        async move {
            let visits = routed.viewports().iter().map(|(viewport, child)| async move {
                if visit(self, child, viewport.as_str()).await? {
                    Ok(())
                } else {
                    Err(NavigationError::NavigationVetoed {
                        router: self.name.clone(),
                        viewport: viewport.clone(),
                        reason: None,
                    })
                }
            });
            try_join_all(visits).await?;

            let descents = routed
                .viewports()
                .values()
                .map(|child| child.router().traverse_instruction(child, visit));
            try_join_all(descents).await?;

            Ok(())
        }
        .boxed()
    }

    /// Activate every slot of `routed`, parents before children.
    ///
    /// All slots at depth N settle before any slot at depth N+1 starts.
    pub async fn activate_ports(self: &Arc<Self>, routed: &RoutedInstruction) -> Result<(), NavigationError> {
        let mut frontier = vec![routed];
        let mut depth = 0;

        while !frontier.is_empty() {
            let slots: Vec<(&RoutedInstruction, &String, &RoutedInstruction)> = frontier
                .iter()
                .flat_map(|&parent| {
                    parent
                        .viewports()
                        .iter()
                        .map(move |(viewport, child)| (parent, viewport, child))
                })
                .collect();

            debug!(router = %self.name, depth, slots = slots.len(), "Activating level");

            let results = join_all(
                slots
                    .iter()
                    .map(|(parent, viewport, child)| parent.router().activate_port(viewport, child)),
            )
            .await;
            if let Some(error) = results.into_iter().find_map(Result::err) {
                return Err(error);
            }

            frontier = slots.into_iter().map(|(_, _, child)| child).collect();
            depth += 1;
        }

        Ok(())
    }

    /// Swap the view in one of this node's slots
    async fn activate_port(&self, viewport: &str, child: &RoutedInstruction) -> Result<(), NavigationError> {
        let Some(port) = self.ports.get(viewport) else {
            debug!(router = %self.name, viewport = %viewport, "No view registered, skipping");
            return Ok(());
        };

        let failure = |source| NavigationError::ActivationFailure {
            router: self.name.clone(),
            viewport: viewport.to_string(),
            source,
        };

        let current = self.ports.current(viewport);
        if current.as_deref() == Some(&**child.instruction()) {
            trace!(router = %self.name, viewport = %viewport, "Already showing, skipping");
            return Ok(());
        }

        if let Some(current) = current {
            trace!(router = %self.name, viewport = %viewport, component = %current.component, "deactivate");
            port.deactivate(&current).await.map_err(failure)?;
        }

        trace!(router = %self.name, viewport = %viewport, component = %child.component(), "activate");
        port.activate(child.instruction()).await.map_err(failure)?;
        self.ports.set_current(viewport, child.instruction().clone());

        Ok(())
    }
}
