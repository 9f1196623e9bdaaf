//! Recording doubles for the observer, verifier and confirmation ports.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;

use lpforge::error::{Error, Result};
use lpforge::port::{
    Confirmer, ProvisionEvent, ProvisionObserver, SourceVerifier, VerificationRequest,
};

/// Thread-safe event collector for observer assertions.
#[derive(Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<ProvisionEvent>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<ProvisionEvent> {
        self.events.lock().clone()
    }

    pub fn count(&self, predicate: impl Fn(&ProvisionEvent) -> bool) -> usize {
        self.events.lock().iter().filter(|e| predicate(e)).count()
    }
}

impl ProvisionObserver for RecordingObserver {
    fn observe(&self, event: ProvisionEvent) {
        self.events.lock().push(event);
    }
}

/// Records verification requests, optionally rejecting all of them.
#[derive(Default)]
pub struct RecordingVerifier {
    requests: Mutex<Vec<VerificationRequest>>,
    reject: bool,
}

impl RecordingVerifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rejecting() -> Self {
        Self {
            requests: Mutex::new(Vec::new()),
            reject: true,
        }
    }

    pub fn requests(&self) -> Vec<VerificationRequest> {
        self.requests.lock().clone()
    }
}

#[async_trait]
impl SourceVerifier for RecordingVerifier {
    async fn verify(&self, request: &VerificationRequest) -> Result<()> {
        self.requests.lock().push(request.clone());
        if self.reject {
            return Err(Error::Verification("bytecode mismatch".into()));
        }
        Ok(())
    }
}

/// Answers prompts with a fixed choice and counts them.
pub struct CountingConfirmer {
    answer: bool,
    prompts: AtomicUsize,
}

impl CountingConfirmer {
    pub fn new(answer: bool) -> Self {
        Self {
            answer,
            prompts: AtomicUsize::new(0),
        }
    }

    pub fn prompts(&self) -> usize {
        self.prompts.load(Ordering::SeqCst)
    }
}

impl Confirmer for CountingConfirmer {
    fn confirm(&self, _prompt: &str, _default: bool) -> Result<bool> {
        self.prompts.fetch_add(1, Ordering::SeqCst);
        Ok(self.answer)
    }
}
