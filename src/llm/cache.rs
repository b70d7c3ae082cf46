use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use futures::future::{BoxFuture, FutureExt, Shared};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use crate::domain::ModelDescriptor;
use crate::error::{SummarizeError, SummarizeResult};
use crate::llm::backend::{Generator, ModelLoader};
use crate::llm::registry::ModelRegistry;

/// A model that finished loading, paired with the descriptor it was loaded from.
pub struct LoadedModel {
    pub descriptor: ModelDescriptor,
    pub generator: Arc<dyn Generator>,
}

type LoadFlight = Shared<BoxFuture<'static, SummarizeResult<Arc<LoadedModel>>>>;

enum Slot {
    /// A load in progress. Every caller that finds it awaits the same outcome.
    Loading { flight_id: u64, flight: LoadFlight },
    Ready(Arc<LoadedModel>),
}

/// Lazily populated map from model identifier to loaded model.
///
/// Concurrent misses on one key join a single in-flight load and all see its
/// outcome, success or failure. Misses on different keys run in parallel. A
/// failed flight is dropped from the map, so only calls arriving after it
/// start a new load. Entries are never evicted.
pub struct ModelCache {
    registry: Arc<ModelRegistry>,
    loader: Arc<dyn ModelLoader>,
    slots: DashMap<String, Slot>,
    next_flight: AtomicU64,
}

impl ModelCache {
    pub fn new(registry: Arc<ModelRegistry>, loader: Arc<dyn ModelLoader>) -> Self {
        Self {
            registry,
            loader,
            slots: DashMap::new(),
            next_flight: AtomicU64::new(0),
        }
    }

    pub fn registry(&self) -> &ModelRegistry {
        &self.registry
    }

    pub async fn get_or_load(&self, identifier: &str) -> SummarizeResult<Arc<LoadedModel>> {
        let descriptor = self.registry.resolve(identifier)?;
        let key = descriptor.identifier.clone();

        // The shard lock is released before anything is awaited
        let (flight_id, flight) = match self.slots.entry(key.clone()) {
            Entry::Occupied(mut entry) => {
                let joinable = match entry.get() {
                    Slot::Ready(model) => {
                        tracing::debug!(model = %key, "model cache hit");
                        return Ok(model.clone());
                    }
                    // A failure left behind by a cancelled caller is stale
                    Slot::Loading { flight, .. } if matches!(flight.peek(), Some(Err(_))) => None,
                    Slot::Loading { flight_id, flight } => Some((*flight_id, flight.clone())),
                };
                match joinable {
                    Some(joined) => joined,
                    None => {
                        let (flight_id, flight) = self.start_flight(descriptor);
                        entry.insert(Slot::Loading {
                            flight_id,
                            flight: flight.clone(),
                        });
                        (flight_id, flight)
                    }
                }
            }
            Entry::Vacant(entry) => {
                let (flight_id, flight) = self.start_flight(descriptor);
                entry.insert(Slot::Loading {
                    flight_id,
                    flight: flight.clone(),
                });
                (flight_id, flight)
            }
        };

        let outcome = flight.await;
        self.settle(&key, flight_id, &outcome);
        outcome
    }

    fn start_flight(&self, descriptor: &ModelDescriptor) -> (u64, LoadFlight) {
        let flight_id = self.next_flight.fetch_add(1, Ordering::Relaxed);
        let loader = self.loader.clone();
        let descriptor = descriptor.clone();

        let flight: LoadFlight = async move {
            tracing::info!(
                model = %descriptor.identifier,
                checkpoint = %descriptor.canonical_name,
                "loading model"
            );
            let started = Instant::now();

            let generator = loader.load(&descriptor).await.map_err(|e| {
                tracing::warn!(model = %descriptor.identifier, error = %e, "model load failed");
                e
            })?;

            tracing::info!(
                model = %descriptor.identifier,
                elapsed_ms = started.elapsed().as_millis() as u64,
                "model loaded"
            );
            Ok::<_, SummarizeError>(Arc::new(LoadedModel {
                descriptor,
                generator,
            }))
        }
        .boxed()
        .shared();

        (flight_id, flight)
    }

    /// Replaces the finished flight with its result. Later flights are left alone.
    fn settle(&self, key: &str, flight_id: u64, outcome: &SummarizeResult<Arc<LoadedModel>>) {
        let is_this_flight =
            |slot: &Slot| matches!(slot, Slot::Loading { flight_id: id, .. } if *id == flight_id);

        match outcome {
            Ok(model) => {
                if let Some(mut slot) = self.slots.get_mut(key) {
                    if is_this_flight(&*slot) {
                        *slot = Slot::Ready(model.clone());
                    }
                }
            }
            Err(_) => {
                self.slots.remove_if(key, |_, slot| is_this_flight(slot));
            }
        }
    }

    pub fn is_loaded(&self, identifier: &str) -> bool {
        self.registry
            .resolve(identifier)
            .ok()
            .and_then(|d| self.slots.get(&d.identifier))
            .map(|slot| matches!(*slot, Slot::Ready(_)))
            .unwrap_or(false)
    }

    /// Identifiers with a successfully loaded model, sorted.
    pub fn loaded_identifiers(&self) -> Vec<String> {
        let mut ids: Vec<String> = self
            .slots
            .iter()
            .filter(|entry| matches!(entry.value(), Slot::Ready(_)))
            .map(|entry| entry.key().clone())
            .collect();
        ids.sort();
        ids
    }
}
