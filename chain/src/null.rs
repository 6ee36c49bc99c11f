//! Deterministic, programmable chain adapter for tests.
//!
//! Never touches the network. Responses are scripted up front; every call
//! is recorded so tests can assert exact call counts (e.g. "zero chain
//! calls on validation failure").

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use codestake_types::{Address, NetworkId, TokenAmount, TxId, TxReceipt, TxStatus};

use crate::adapter::{ChainAdapter, PendingTx};
use crate::catalog::{Operation, Query};
use crate::error::ChainError;

#[derive(Debug)]
struct NullState {
    network: NetworkId,
    balance: TokenAmount,
    query_responses: HashMap<&'static str, Value>,
    balance_outcomes: VecDeque<Result<TokenAmount, ChainError>>,
    submit_outcomes: VecDeque<Result<TxId, ChainError>>,
    finality_outcomes: VecDeque<Result<TxReceipt, ChainError>>,
    queries: Vec<&'static str>,
    submissions: Vec<&'static str>,
    network_reads: usize,
    switch_requests: Vec<NetworkId>,
}

/// A [`ChainAdapter`] test double with scripted outcomes and call
/// recording.
pub struct NullAdapter {
    state: Mutex<NullState>,
}

impl NullAdapter {
    pub fn new(network: NetworkId) -> Self {
        Self {
            state: Mutex::new(NullState {
                network,
                balance: TokenAmount::ZERO,
                query_responses: HashMap::new(),
                balance_outcomes: VecDeque::new(),
                submit_outcomes: VecDeque::new(),
                finality_outcomes: VecDeque::new(),
                queries: Vec::new(),
                submissions: Vec::new(),
                network_reads: 0,
                switch_requests: Vec::new(),
            }),
        }
    }

    // ── Scripting ───────────────────────────────────────────────────────

    pub fn set_network(&self, network: NetworkId) {
        self.state.lock().unwrap().network = network;
    }

    pub fn set_balance(&self, balance: TokenAmount) {
        self.state.lock().unwrap().balance = balance;
    }

    /// Script the response for a query, keyed by query name.
    pub fn set_query_response(&self, query_name: &'static str, response: Value) {
        self.state
            .lock()
            .unwrap()
            .query_responses
            .insert(query_name, response);
    }

    /// Queue the outcome of the next `token_balance` call. Unqueued
    /// calls fall back to the value set with [`set_balance`].
    ///
    /// [`set_balance`]: NullAdapter::set_balance
    pub fn push_balance_outcome(&self, outcome: Result<TokenAmount, ChainError>) {
        self.state
            .lock()
            .unwrap()
            .balance_outcomes
            .push_back(outcome);
    }

    /// Queue the outcome of the next `submit` call.
    pub fn push_submit_outcome(&self, outcome: Result<TxId, ChainError>) {
        self.state.lock().unwrap().submit_outcomes.push_back(outcome);
    }

    /// Queue the outcome of the next `await_finality` call.
    pub fn push_finality_outcome(&self, outcome: Result<TxReceipt, ChainError>) {
        self.state
            .lock()
            .unwrap()
            .finality_outcomes
            .push_back(outcome);
    }

    // ── Inspection ──────────────────────────────────────────────────────

    /// Names of executed queries, in call order.
    pub fn recorded_queries(&self) -> Vec<&'static str> {
        self.state.lock().unwrap().queries.clone()
    }

    /// Names of submitted operations, in call order.
    pub fn recorded_submissions(&self) -> Vec<&'static str> {
        self.state.lock().unwrap().submissions.clone()
    }

    /// Total chain interactions of any kind (queries + submissions).
    pub fn chain_call_count(&self) -> usize {
        let state = self.state.lock().unwrap();
        state.queries.len() + state.submissions.len()
    }

    /// How many times the active network was read.
    pub fn network_read_count(&self) -> usize {
        self.state.lock().unwrap().network_reads
    }

    pub fn recorded_switch_requests(&self) -> Vec<NetworkId> {
        self.state.lock().unwrap().switch_requests.clone()
    }
}

#[async_trait]
impl ChainAdapter for NullAdapter {
    async fn active_network(&self) -> Result<NetworkId, ChainError> {
        let mut state = self.state.lock().unwrap();
        state.network_reads += 1;
        Ok(state.network)
    }

    async fn request_network_switch(&self, target: NetworkId) -> Result<(), ChainError> {
        self.state.lock().unwrap().switch_requests.push(target);
        Ok(())
    }

    async fn token_balance(&self, _address: &Address) -> Result<TokenAmount, ChainError> {
        let mut state = self.state.lock().unwrap();
        match state.balance_outcomes.pop_front() {
            Some(outcome) => outcome,
            None => Ok(state.balance),
        }
    }

    async fn execute_query(&self, query: &Query) -> Result<Value, ChainError> {
        let mut state = self.state.lock().unwrap();
        state.queries.push(query.name());
        state
            .query_responses
            .get(query.name())
            .cloned()
            .ok_or_else(|| ChainError::Rpc {
                code: -1,
                message: format!("no scripted response for {}", query.name()),
            })
    }

    async fn submit(&self, operation: &Operation, _from: &Address) -> Result<PendingTx, ChainError> {
        let mut state = self.state.lock().unwrap();
        state.submissions.push(operation.name());
        match state.submit_outcomes.pop_front() {
            Some(Ok(tx_id)) => Ok(PendingTx { tx_id }),
            Some(Err(e)) => Err(e),
            None => Ok(PendingTx {
                tx_id: TxId::new("0xnull"),
            }),
        }
    }

    async fn await_finality(
        &self,
        pending: &PendingTx,
        _deadline: Duration,
    ) -> Result<TxReceipt, ChainError> {
        let outcome = self.state.lock().unwrap().finality_outcomes.pop_front();
        match outcome {
            Some(result) => result,
            None => Ok(TxReceipt {
                tx_id: pending.tx_id.clone(),
                status: TxStatus::Sealed,
                error: None,
            }),
        }
    }
}
