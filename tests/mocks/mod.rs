#![allow(dead_code)]

use async_trait::async_trait;
use briefly::domain::{GenerationParams, ModelDescriptor};
use briefly::{Generator, ModelLoader, SummarizeError, SummarizeResult};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Notify;

/// Loader that counts loads and can fail, stall, or block on demand.
#[derive(Default)]
pub struct MockLoader {
    pub loads: AtomicUsize,
    pub loads_by_model: Mutex<HashMap<String, usize>>,
    failures_left: AtomicUsize,
    load_delay: Duration,
    holds: HashMap<String, Arc<Notify>>,
    generator: MockGeneratorConfig,
    pub calls: Arc<Mutex<Vec<(String, GenerationParams)>>>,
}

#[derive(Default, Clone)]
struct MockGeneratorConfig {
    fail: bool,
    delay: Duration,
}

impl MockLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// The next `n` loads fail with a model load error.
    pub fn failing_loads(self, n: usize) -> Self {
        self.failures_left.store(n, Ordering::SeqCst);
        self
    }

    pub fn with_load_delay(mut self, delay: Duration) -> Self {
        self.load_delay = delay;
        self
    }

    /// Loads of `identifier` wait until the returned handle is notified.
    pub fn hold(mut self, identifier: &str) -> (Self, Arc<Notify>) {
        let notify = Arc::new(Notify::new());
        self.holds.insert(identifier.to_string(), notify.clone());
        (self, notify)
    }

    pub fn failing_generation(mut self) -> Self {
        self.generator.fail = true;
        self
    }

    pub fn with_generation_delay(mut self, delay: Duration) -> Self {
        self.generator.delay = delay;
        self
    }

    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }

    pub fn loads_of(&self, identifier: &str) -> usize {
        self.loads_by_model
            .lock()
            .unwrap()
            .get(identifier)
            .copied()
            .unwrap_or(0)
    }

    pub fn inputs(&self) -> Vec<String> {
        self.calls.lock().unwrap().iter().map(|(i, _)| i.clone()).collect()
    }
}

#[async_trait]
impl ModelLoader for MockLoader {
    async fn load(&self, descriptor: &ModelDescriptor) -> SummarizeResult<Arc<dyn Generator>> {
        if let Some(notify) = self.holds.get(&descriptor.identifier) {
            notify.notified().await;
        }
        if !self.load_delay.is_zero() {
            tokio::time::sleep(self.load_delay).await;
        }

        self.loads.fetch_add(1, Ordering::SeqCst);
        *self
            .loads_by_model
            .lock()
            .unwrap()
            .entry(descriptor.identifier.clone())
            .or_insert(0) += 1;

        let remaining = self.failures_left.load(Ordering::SeqCst);
        if remaining > 0 {
            self.failures_left.store(remaining - 1, Ordering::SeqCst);
            return Err(SummarizeError::model_load(
                &descriptor.canonical_name,
                "weights unavailable",
            ));
        }

        Ok(Arc::new(MockGenerator {
            model: descriptor.canonical_name.clone(),
            config: self.generator.clone(),
            calls: self.calls.clone(),
            sampled: AtomicUsize::new(0),
        }))
    }
}

/// Extractive stand-in for a seq2seq model: keeps a prefix of the input words,
/// sized between the length bounds.
pub struct MockGenerator {
    model: String,
    config: MockGeneratorConfig,
    calls: Arc<Mutex<Vec<(String, GenerationParams)>>>,
    sampled: AtomicUsize,
}

#[async_trait]
impl Generator for MockGenerator {
    async fn generate(&self, input: &str, params: &GenerationParams) -> SummarizeResult<String> {
        self.calls
            .lock()
            .unwrap()
            .push((input.to_string(), *params));

        if !self.config.delay.is_zero() {
            tokio::time::sleep(self.config.delay).await;
        }
        if self.config.fail {
            return Err(SummarizeError::generation(&self.model, "out of memory"));
        }

        let words: Vec<&str> = input.split_whitespace().collect();
        let target = (words.len() / 3)
            .clamp(params.min_length, params.max_length)
            .min(words.len());

        // Sampling shifts the window so repeated calls may differ
        let offset = if params.do_sample {
            self.sampled.fetch_add(1, Ordering::SeqCst) % (words.len() - target + 1)
        } else {
            0
        };

        Ok(words[offset..offset + target].join(" "))
    }
}

pub fn words(n: usize) -> String {
    (0..n)
        .map(|i| format!("word{i}"))
        .collect::<Vec<_>>()
        .join(" ")
}
