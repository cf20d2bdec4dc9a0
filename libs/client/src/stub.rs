//! A programmable [`Handler`] for tests.

use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use tablewire_core::{Handler, Outcome, RemoteError, Value};

struct Expectation {
    operation: String,
    args: Vec<Value>,
    outcome: Outcome,
}

/// Answers calls from canned outcomes registered with [`on`](Self::on)
///
/// The first expectation matching the operation name and the exact argument
/// values wins. Calls nothing matches fail with [`RemoteError::Io`]. Every
/// call is recorded, matched or not.
///
/// ```
/// use tablewire_client::StubService;
/// use tablewire_core::Value;
///
/// let stub = StubService::new();
/// stub.on("isTableEnabled", vec![Value::from("existTable")])
///     .returns(vec![Value::Bool(true)]);
/// ```
#[derive(Default)]
pub struct StubService {
    expectations: Mutex<Vec<Expectation>>,
    calls: Mutex<Vec<(String, Vec<Value>)>>,
}

/// Pending expectation; finish it with [`returns`](Self::returns) or [`fails`](Self::fails)
#[must_use = "an expectation is only registered by `returns` or `fails`"]
pub struct Stubbing<'a> {
    stub: &'a StubService,
    operation: String,
    args: Vec<Value>,
}

impl StubService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(&self, operation: impl Into<String>, args: Vec<Value>) -> Stubbing<'_> {
        Stubbing {
            stub: self,
            operation: operation.into(),
            args,
        }
    }

    /// Every call received so far, in arrival order
    pub fn calls(&self) -> Vec<(String, Vec<Value>)> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    fn expect(&self, expectation: Expectation) {
        self.expectations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(expectation);
    }
}

impl Stubbing<'_> {
    pub fn returns(self, values: Vec<Value>) {
        self.finish(Ok(values));
    }

    pub fn fails(self, error: RemoteError) {
        self.finish(Err(error));
    }

    fn finish(self, outcome: Outcome) {
        self.stub.expect(Expectation {
            operation: self.operation,
            args: self.args,
            outcome,
        });
    }
}

#[async_trait]
impl Handler for StubService {
    async fn handle(&self, operation: &str, args: Vec<Value>) -> Outcome {
        let outcome = self
            .expectations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .find(|e| e.operation == operation && e.args == args)
            .map(|e| e.outcome.clone());

        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((operation.to_string(), args));

        outcome.unwrap_or_else(|| {
            Err(RemoteError::io(format!(
                "no stubbed response for `{}`",
                operation
            )))
        })
    }
}
