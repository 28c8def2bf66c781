//! Bookkeeping for function references that cannot be resolved locally and
//! must wait for another file to be visited (spec §4.C.5, §3.5).

use mtype_ir::FunctionReferenceHandle;

/// One attempt to resolve an external reference against a definition found
/// while visiting another file.
#[derive(Debug, Clone, Copy)]
pub struct ExternalCandidate {
    pub reference: FunctionReferenceHandle,
    pub def: mtype_ir::FunctionDefHandle,
}

/// References still waiting on a definition the pipeline hasn't visited yet.
/// Drained (not cleared) each pipeline pass — unresolved entries survive to
/// the next pass, resolved ones are removed (spec §4.F step 7's "external
/// function resolution" loop).
#[derive(Default)]
pub struct PendingExternalFunctions {
    pending: Vec<FunctionReferenceHandle>,
}

impl PendingExternalFunctions {
    pub fn push(&mut self, reference: FunctionReferenceHandle) {
        self.pending.push(reference);
    }

    pub fn drain_unresolved(&mut self) -> Vec<FunctionReferenceHandle> {
        std::mem::take(&mut self.pending)
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }
}
